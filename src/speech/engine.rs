use crate::speech::rate::Rate;
use serde::Deserialize;
use std::env;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Platform speech programs the reader knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum EngineKind {
    /// macOS `say`
    Say,
    /// `espeak-ng`
    EspeakNg,
    /// legacy `espeak`
    Espeak,
    /// speech-dispatcher client `spd-say`
    SpdSay,
    /// Windows SAPI through PowerShell
    #[serde(rename = "powershell")]
    #[value(name = "powershell")]
    PowerShell,
    /// User-configured program reading text on stdin
    Command,
}

impl EngineKind {
    pub fn program(self) -> Option<&'static str> {
        match self {
            EngineKind::Say => Some("say"),
            EngineKind::EspeakNg => Some("espeak-ng"),
            EngineKind::Espeak => Some("espeak"),
            EngineKind::SpdSay => Some("spd-say"),
            EngineKind::PowerShell => Some("powershell"),
            EngineKind::Command => None,
        }
    }

    pub fn name(self) -> &'static str {
        self.program().unwrap_or("command")
    }

    /// Candidate engines for a target OS, in preference order.
    pub fn candidates(os: &str) -> &'static [EngineKind] {
        match os {
            "macos" => &[EngineKind::Say, EngineKind::EspeakNg, EngineKind::Espeak],
            "windows" => &[EngineKind::PowerShell, EngineKind::EspeakNg],
            _ => &[EngineKind::EspeakNg, EngineKind::Espeak, EngineKind::SpdSay],
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A resolved engine: its kind plus, for `Command`, the argv template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Engine {
    pub kind: EngineKind,
    pub template: Vec<String>,
}

impl Engine {
    pub fn builtin(kind: EngineKind) -> Self {
        Self {
            kind,
            template: Vec::new(),
        }
    }

    /// A custom engine. `{wpm}`, `{rate}` and `{voice}` in the template are
    /// substituted; the text is always written to the program's stdin.
    pub fn custom(template: Vec<String>) -> Result<Self, String> {
        if template.first().is_none_or(|program| program.trim().is_empty()) {
            return Err("command engine requires a non-empty program".to_owned());
        }
        Ok(Self {
            kind: EngineKind::Command,
            template,
        })
    }

    /// Build the process invocation that speaks `text`.
    pub fn speak_command(&self, text: &str, rate: Rate, voice: Option<&str>) -> SpeechCommand {
        let text = text.to_owned();
        match self.kind {
            EngineKind::Say => {
                let mut args = vec!["-r".to_owned(), rate.words_per_minute().to_string()];
                if let Some(voice) = voice {
                    args.extend(["-v".to_owned(), voice.to_owned()]);
                }
                args.extend(["-f".to_owned(), "-".to_owned()]);
                SpeechCommand::new("say", args, Some(text))
            }
            EngineKind::EspeakNg | EngineKind::Espeak => {
                let mut args = vec!["-s".to_owned(), rate.words_per_minute().to_string()];
                if let Some(voice) = voice {
                    args.extend(["-v".to_owned(), voice.to_owned()]);
                }
                args.push("--stdin".to_owned());
                SpeechCommand::new(self.kind.name(), args, Some(text))
            }
            EngineKind::SpdSay => {
                let mut args = vec![
                    "-w".to_owned(),
                    "-r".to_owned(),
                    rate.speech_dispatcher().to_string(),
                ];
                if let Some(voice) = voice {
                    args.extend(["-y".to_owned(), voice.to_owned()]);
                }
                args.extend(["--".to_owned(), text]);
                let mut command = SpeechCommand::new("spd-say", args, None);
                command.cancel = Some(vec!["spd-say".to_owned(), "-C".to_owned()]);
                command
            }
            EngineKind::PowerShell => {
                let mut script = String::from(
                    "$text = [Console]::In.ReadToEnd(); \
                     Add-Type -AssemblyName System.Speech; \
                     $synth = New-Object System.Speech.Synthesis.SpeechSynthesizer; ",
                );
                script.push_str(&format!("$synth.Rate = {}; ", rate.sapi()));
                if let Some(voice) = voice {
                    script.push_str(&format!(
                        "$synth.SelectVoice('{}'); ",
                        powershell_quote(voice)
                    ));
                }
                script.push_str("$synth.Speak($text);");
                SpeechCommand::new(
                    "powershell",
                    vec!["-NoProfile".to_owned(), "-Command".to_owned(), script],
                    Some(text),
                )
            }
            EngineKind::Command => {
                let mut argv = self.template.iter().map(|arg| {
                    arg.replace("{wpm}", &rate.words_per_minute().to_string())
                        .replace("{rate}", &rate.multiplier().to_string())
                        .replace("{voice}", voice.unwrap_or(""))
                });
                let program = argv.next().unwrap_or_default();
                SpeechCommand::new(program, argv.collect(), Some(text))
            }
        }
    }

    /// Build the process invocation that lists installed voices, if the engine has one.
    pub fn voices_command(&self) -> Option<SpeechCommand> {
        let (program, args): (&str, Vec<&str>) = match self.kind {
            EngineKind::Say => ("say", vec!["-v", "?"]),
            EngineKind::EspeakNg | EngineKind::Espeak => (self.kind.name(), vec!["--voices"]),
            EngineKind::SpdSay => ("spd-say", vec!["-L"]),
            EngineKind::PowerShell => (
                "powershell",
                vec![
                    "-NoProfile",
                    "-Command",
                    "Add-Type -AssemblyName System.Speech; \
                     (New-Object System.Speech.Synthesis.SpeechSynthesizer).GetInstalledVoices() \
                     | ForEach-Object { $_.VoiceInfo.Name + '|' + $_.VoiceInfo.Culture }",
                ],
            ),
            EngineKind::Command => return None,
        };
        Some(SpeechCommand::new(
            program,
            args.into_iter().map(str::to_owned).collect(),
            None,
        ))
    }
}

/// A fully-resolved engine invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Text piped to the program's stdin.
    pub stdin: Option<String>,
    /// Extra invocation run after killing the program (e.g. to flush a speech daemon's queue).
    pub cancel: Option<Vec<String>>,
}

impl SpeechCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>, stdin: Option<String>) -> Self {
        Self {
            program: program.into(),
            args,
            stdin,
            cancel: None,
        }
    }
}

impl fmt::Display for SpeechCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                write!(f, " '{}'", arg.replace('\'', "'\\''"))?;
            } else {
                write!(f, " {arg}")?;
            }
        }
        if self.stdin.is_some() {
            f.write_str(" < (document text)")?;
        }
        Ok(())
    }
}

fn powershell_quote(value: &str) -> String {
    value.replace('\'', "''")
}

/// Pick the first engine for this platform whose program is on `PATH`.
pub fn detect_engine() -> Option<EngineKind> {
    detect_engine_with(env::consts::OS, |program| find_in_path(program).is_some())
}

fn detect_engine_with<F>(os: &str, available: F) -> Option<EngineKind>
where
    F: Fn(&str) -> bool,
{
    EngineKind::candidates(os)
        .iter()
        .copied()
        .find(|kind| kind.program().is_some_and(&available))
}

/// Locate an executable on `PATH`.
pub fn find_in_path(program: &str) -> Option<PathBuf> {
    find_in_path_list(program, env::var_os("PATH"))
}

fn find_in_path_list(program: &str, path_list: Option<OsString>) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    let path_list = path_list?;
    env::split_paths(&path_list).find_map(|dir| {
        let plain = dir.join(program);
        if plain.is_file() {
            return Some(plain);
        }
        let exe = dir.join(format!("{program}.exe"));
        exe.is_file().then_some(exe)
    })
}
