use crate::speech::engine::{Engine, EngineKind};
use serde::Serialize;
use std::process::{Command, Stdio};

/// An installed voice as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Voice {
    /// Identifier passed back to the engine when selecting this voice.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    pub language: Option<String>,
}

impl Voice {
    fn matches(&self, fragment: &str) -> bool {
        let fragment = fragment.to_lowercase();
        self.name.to_lowercase().contains(&fragment) || self.id.to_lowercase().contains(&fragment)
    }
}

/// Ask the engine for its installed voices.
pub fn list_voices(engine: &Engine) -> Result<Vec<Voice>, String> {
    let Some(command) = engine.voices_command() else {
        return Ok(Vec::new());
    };

    let output = Command::new(&command.program)
        .args(&command.args)
        .stdin(Stdio::null())
        .output()
        .map_err(|error| format!("failed to run '{}': {error}", command.program))?;
    if !output.status.success() {
        return Err(format!(
            "'{}' exited with {}: {}",
            command.program,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    let listing = String::from_utf8_lossy(&output.stdout);
    let voices = parse_voice_listing(engine.kind, &listing);
    tracing::debug!(engine = %engine.kind, voices = voices.len(), "voices listed");
    Ok(voices)
}

/// Parse an engine's voice listing output.
pub fn parse_voice_listing(kind: EngineKind, listing: &str) -> Vec<Voice> {
    match kind {
        EngineKind::Say => listing.lines().filter_map(parse_say_line).collect(),
        EngineKind::EspeakNg | EngineKind::Espeak => {
            listing.lines().skip(1).filter_map(parse_espeak_line).collect()
        }
        EngineKind::SpdSay => listing.lines().skip(1).filter_map(parse_spd_line).collect(),
        EngineKind::PowerShell => listing.lines().filter_map(parse_sapi_line).collect(),
        EngineKind::Command => Vec::new(),
    }
}

// "Kyoko               ja_JP    # こんにちは、私の名前はKyokoです。"
fn parse_say_line(line: &str) -> Option<Voice> {
    let head = line.split('#').next()?.trim_end();
    let mut columns = head.rsplitn(2, char::is_whitespace);
    let language = columns.next()?.trim();
    let name = columns.next()?.trim();
    if name.is_empty() || language.is_empty() {
        return None;
    }
    Some(Voice {
        id: name.to_owned(),
        name: name.to_owned(),
        language: Some(language.to_owned()),
    })
}

// " 5  ja              --/M      Japanese           jpx/ja"
fn parse_espeak_line(line: &str) -> Option<Voice> {
    let columns: Vec<&str> = line.split_whitespace().collect();
    if columns.len() < 4 {
        return None;
    }
    Some(Voice {
        id: columns[1].to_owned(),
        name: columns[3].replace('_', " "),
        language: Some(columns[1].to_owned()),
    })
}

// "Japanese         ja   none"
fn parse_spd_line(line: &str) -> Option<Voice> {
    let columns: Vec<&str> = line.split_whitespace().collect();
    let name = columns.first()?;
    Some(Voice {
        id: (*name).to_owned(),
        name: (*name).to_owned(),
        language: columns.get(1).map(|language| (*language).to_owned()),
    })
}

// "Microsoft Haruka Desktop|ja-JP"
fn parse_sapi_line(line: &str) -> Option<Voice> {
    let (name, culture) = line.trim().split_once('|')?;
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let culture = culture.trim();
    Some(Voice {
        id: name.to_owned(),
        name: name.to_owned(),
        language: (!culture.is_empty()).then(|| culture.to_owned()),
    })
}

/// Pick the voice to speak with.
///
/// An explicit voice is used as-is. Otherwise the first preference fragment
/// (in order) that matches an available voice's name or id selects that
/// voice. `None` leaves the engine on its default voice.
pub fn resolve_voice(
    explicit: Option<&str>,
    preferred: &[String],
    available: &[Voice],
) -> Option<String> {
    if let Some(voice) = explicit.map(str::trim).filter(|voice| !voice.is_empty()) {
        return Some(voice.to_owned());
    }

    preferred
        .iter()
        .filter(|fragment| !fragment.trim().is_empty())
        .find_map(|fragment| available.iter().find(|voice| voice.matches(fragment.trim())))
        .map(|voice| voice.id.clone())
}
