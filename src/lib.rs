#![forbid(unsafe_code)]

pub mod cli;
pub mod config;
pub mod document;
pub mod history;
pub mod logging;
pub mod output;
pub mod progress;
pub mod refusal;
pub mod speech;

use cli::{Command, HistoryAction, Outcome};
use config::{DataPaths, Settings};
use document::ExtractedDocument;
use progress::{StatusEvent, report_status, report_warning_code};
use refusal::{RefusalCode, RefusalEnvelope, build_envelope};
use speech::{Engine, EngineKind, PlaybackState, Player, Rate, SpeechRequest};
use std::io::{BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the voicereader CLI. Returns an exit code (0, 1, or 2).
pub fn run() -> u8 {
    use clap::Parser;
    use cli::Cli;

    // Parse CLI args (handles --version and --help via clap, then exits)
    let cli = Cli::parse();

    if cli.describe {
        return handle_describe();
    }
    let Some(command) = cli.command else {
        eprintln!("Error: a command is required (see --help)");
        return Outcome::Refusal.exit_code();
    };

    let paths = DataPaths::from_env();
    let _log_guard = logging::init(&paths, cli.verbose);
    let status = StatusReporter::new(cli.progress);
    tracing::debug!(data_dir = %paths.root.display(), "voicereader starting");

    let result = match command {
        Command::Read {
            file,
            from_history,
            rate,
            voice,
            engine,
            no_history,
            dry_run,
        } => handle_read(
            &paths,
            &status,
            ReadOptions {
                file,
                from_history,
                rate,
                voice,
                engine,
                record_history: !no_history,
                dry_run,
            },
        ),
        Command::Extract {
            file,
            preview,
            json,
        } => handle_extract(&paths, &file, preview, json),
        Command::History { action } => handle_history(&paths, action),
        Command::Voices { engine, json } => handle_voices(&paths, engine, json),
        Command::Log { lines } => handle_log(&paths, lines),
    };

    match result {
        Ok(outcome) => outcome.exit_code(),
        Err(refusal) => {
            tracing::error!(code = ?refusal.code(), message = %refusal.refusal.message, "refused");
            output_refusal_envelope(&refusal);
            Outcome::Refusal.exit_code()
        }
    }
}

/// Emits `--progress` status events, timed from process start.
struct StatusReporter {
    enabled: bool,
    started: Instant,
}

impl StatusReporter {
    fn new(enabled: bool) -> Self {
        Self {
            enabled,
            started: Instant::now(),
        }
    }

    fn emit(&self, status: &str, path: Option<&Path>, message: Option<&str>) {
        if !self.enabled {
            return;
        }
        let path = path.map(|path| path.display().to_string());
        report_status(&StatusEvent::new(
            status,
            path.as_deref(),
            message,
            self.started.elapsed().as_millis() as u64,
        ));
    }
}

struct ReadOptions {
    file: Option<PathBuf>,
    from_history: Option<usize>,
    rate: Option<Rate>,
    voice: Option<String>,
    engine: Option<EngineKind>,
    record_history: bool,
    dry_run: bool,
}

/// Handle the read subcommand: load, preview, record, speak.
#[allow(clippy::result_large_err)]
fn handle_read(
    paths: &DataPaths,
    status: &StatusReporter,
    options: ReadOptions,
) -> Result<Outcome, RefusalEnvelope> {
    let settings = load_settings(paths)?;
    let path = match (options.file, options.from_history) {
        (Some(file), _) => file,
        (None, Some(index)) => history_path(paths, index)?,
        (None, None) => {
            return Err(build_envelope(
                RefusalCode::BadInput,
                "No document given",
                serde_json::json!({}),
                Some("voicereader read FILE".to_owned()),
            ));
        }
    };

    let path = document::resolve_path(&path);
    status.emit("loading", Some(&path), None);
    let document = extract_document(&path)?;
    status.emit("loaded", Some(&path), None);

    println!(
        "{} ({}, {} chars)",
        path.display(),
        document.format,
        document.char_count()
    );
    println!(
        "{}",
        document::preview(&document.text, settings.preview_chars)
    );

    if options.record_history {
        record_history(paths, &document, settings.history_limit);
    }

    if document.is_blank() {
        return Err(build_envelope(
            RefusalCode::EmptyText,
            "Document has no text to read",
            serde_json::json!({ "path": path.display().to_string() }),
            None,
        ));
    }

    let engine = resolve_engine(options.engine, &settings)?;
    let rate = options.rate.unwrap_or(settings.rate);
    let voice = pick_voice(&engine, options.voice.or(settings.voice.clone()), &settings);
    let request = SpeechRequest {
        text: document.text,
        rate,
        voice,
    };
    let command = request.command_for(&engine);
    tracing::info!(
        engine = %engine.kind,
        rate = %rate,
        voice = request.voice.as_deref().unwrap_or("(default)"),
        "speech resolved"
    );

    if options.dry_run {
        println!("{command}");
        return Ok(Outcome::Success);
    }

    let mut player = Player::new();
    player.play(command).map_err(|error| {
        build_envelope(
            RefusalCode::Playback,
            "Speech engine failed to start",
            serde_json::json!({ "engine": engine.kind.name(), "error": error }),
            Some("voicereader voices".to_owned()),
        )
    })?;
    status.emit("playing", Some(&path), None);

    let stop_requested = watch_for_stop();
    while player.is_playing() {
        if stop_requested.load(Ordering::SeqCst) {
            player.stop();
        }
        std::thread::sleep(STOP_POLL_INTERVAL);
    }

    match player.wait() {
        PlaybackState::Stopped => {
            status.emit("stopped", Some(&path), None);
            eprintln!("Stopped.");
            Ok(Outcome::Partial)
        }
        PlaybackState::Failed(message) => {
            status.emit("failed", Some(&path), Some(&message));
            Err(build_envelope(
                RefusalCode::Playback,
                "Speech engine failed",
                serde_json::json!({ "engine": engine.kind.name(), "error": message }),
                None,
            ))
        }
        _ => {
            status.emit("finished", Some(&path), None);
            Ok(Outcome::Success)
        }
    }
}

/// Watch an interactive stdin and raise the returned flag on a stop command
/// or when the terminal closes stdin.
fn watch_for_stop() -> Arc<AtomicBool> {
    let flag = Arc::new(AtomicBool::new(false));
    if !std::io::stdin().is_terminal() {
        return flag;
    }

    eprintln!("Press s + Enter (or Ctrl-D) to stop.");
    let watcher_flag = Arc::clone(&flag);
    std::thread::spawn(move || {
        let signal = wait_for_stop_signal(std::io::stdin().lock());
        tracing::debug!(?signal, "stop requested from terminal");
        watcher_flag.store(true, Ordering::SeqCst);
    });
    flag
}

#[derive(Debug, PartialEq, Eq)]
enum StopSignal {
    Command,
    InputClosed,
}

/// Block until `input` yields `s`, `q`, `stop` or `quit`, or ends.
fn wait_for_stop_signal(mut input: impl BufRead) -> StopSignal {
    let mut line = String::new();
    loop {
        line.clear();
        match input.read_line(&mut line) {
            Ok(0) | Err(_) => return StopSignal::InputClosed,
            Ok(_) if matches!(line.trim(), "s" | "q" | "stop" | "quit") => {
                return StopSignal::Command;
            }
            Ok(_) => {}
        }
    }
}

/// Handle the extract subcommand.
#[allow(clippy::result_large_err)]
fn handle_extract(
    paths: &DataPaths,
    file: &Path,
    preview_only: bool,
    json: bool,
) -> Result<Outcome, RefusalEnvelope> {
    let settings = load_settings(paths)?;
    let document = extract_document(&document::resolve_path(file))?;
    let text = if preview_only {
        document::preview(&document.text, settings.preview_chars)
    } else {
        document.text.clone()
    };

    if json {
        let record = serde_json::json!({
            "path": document.path.display().to_string(),
            "format": document.format,
            "chars": document.char_count(),
            "bytes_hash": document.bytes_hash,
            "text": text,
        });
        output::write_jsonl(&mut std::io::stdout(), &[record]).map_err(output_failed)?;
    } else if text.ends_with('\n') {
        print!("{text}");
    } else {
        println!("{text}");
    }

    Ok(Outcome::Success)
}

/// Handle history subcommands.
#[allow(clippy::result_large_err)]
fn handle_history(paths: &DataPaths, action: HistoryAction) -> Result<Outcome, RefusalEnvelope> {
    use history::store;

    let store_path = paths.history_file();
    match action {
        HistoryAction::List { json } => {
            let entries = store::list(&store_path).map_err(history_failed)?;
            if json {
                output::write_jsonl(&mut std::io::stdout(), &entries).map_err(output_failed)?;
            } else {
                for (index, entry) in entries.iter().enumerate() {
                    println!(
                        "{:>3}  {}  {:<5}  {}",
                        index + 1,
                        entry.opened_at,
                        entry.format,
                        entry.path
                    );
                }
            }
            Ok(Outcome::Success)
        }
        HistoryAction::Last => match store::last(&store_path).map_err(history_failed)? {
            Some(entry) => {
                output::write_jsonl(&mut std::io::stdout(), &[entry]).map_err(output_failed)?;
                Ok(Outcome::Success)
            }
            None => {
                eprintln!("No history entries found");
                Ok(Outcome::Partial)
            }
        },
        HistoryAction::Show { index } => {
            match store::get(&store_path, index).map_err(history_failed)? {
                Some(entry) => {
                    output::write_jsonl(&mut std::io::stdout(), &[entry])
                        .map_err(output_failed)?;
                    Ok(Outcome::Success)
                }
                None => {
                    eprintln!("No history entry {index}");
                    Ok(Outcome::Partial)
                }
            }
        }
        HistoryAction::Count => {
            println!("{}", store::count(&store_path).map_err(history_failed)?);
            Ok(Outcome::Success)
        }
        HistoryAction::Clear => {
            let removed = store::clear(&store_path).map_err(history_failed)?;
            tracing::info!(removed, "history cleared");
            println!("Cleared {removed} history entries");
            Ok(Outcome::Success)
        }
    }
}

/// Handle the voices subcommand.
#[allow(clippy::result_large_err)]
fn handle_voices(
    paths: &DataPaths,
    engine: Option<EngineKind>,
    json: bool,
) -> Result<Outcome, RefusalEnvelope> {
    let settings = load_settings(paths)?;
    let engine = resolve_engine(engine, &settings)?;
    let voices = speech::list_voices(&engine).map_err(|error| {
        build_envelope(
            RefusalCode::Playback,
            "Speech engine could not list voices",
            serde_json::json!({ "engine": engine.kind.name(), "error": error }),
            None,
        )
    })?;

    if voices.is_empty() {
        eprintln!("Engine '{}' reported no voices", engine.kind);
        return Ok(Outcome::Partial);
    }

    if json {
        output::write_jsonl(&mut std::io::stdout(), &voices).map_err(output_failed)?;
    } else {
        for voice in &voices {
            println!(
                "{}\t{}\t{}",
                voice.id,
                voice.name,
                voice.language.as_deref().unwrap_or("-")
            );
        }
    }
    Ok(Outcome::Success)
}

/// Handle the log subcommand.
#[allow(clippy::result_large_err)]
fn handle_log(paths: &DataPaths, lines: usize) -> Result<Outcome, RefusalEnvelope> {
    let log_file = paths.log_file();
    let tail = logging::tail(&log_file, lines).map_err(|error| {
        build_envelope(
            RefusalCode::BadInput,
            "Failed to read application log",
            serde_json::json!({ "path": log_file.display().to_string(), "error": error }),
            None,
        )
    })?;

    if tail.is_empty() {
        eprintln!("No log entries in {}", log_file.display());
        return Ok(Outcome::Partial);
    }
    for line in tail {
        println!("{line}");
    }
    Ok(Outcome::Success)
}

/// Handle --describe flag: print operator.json and exit.
fn handle_describe() -> u8 {
    let operator = serde_json::json!({
        "name": "voicereader",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Read text, PDF and spreadsheet documents aloud",
        "input_formats": ["txt", "pdf", "xlsx"],
        "engines": ["say", "espeak-ng", "espeak", "spd-say", "powershell", "command"],
        "rate_presets": Rate::PRESETS,
        "data_dir_env": "VOICEREADER_HOME",
    });

    if let Ok(json) = serde_json::to_string_pretty(&operator) {
        println!("{}", json);
        Outcome::Success.exit_code()
    } else {
        eprintln!("Error: Failed to serialize operator metadata");
        Outcome::Refusal.exit_code()
    }
}

#[allow(clippy::result_large_err)]
fn load_settings(paths: &DataPaths) -> Result<Settings, RefusalEnvelope> {
    let config_file = paths.config_file();
    Settings::load(&config_file).map_err(|error| {
        build_envelope(
            RefusalCode::BadConfig,
            "Invalid configuration",
            serde_json::json!({ "path": config_file.display().to_string(), "error": error }),
            Some(format!("edit {}", config_file.display())),
        )
    })
}

#[allow(clippy::result_large_err)]
fn extract_document(path: &Path) -> Result<ExtractedDocument, RefusalEnvelope> {
    document::extract(path).map_err(|error| {
        let code = if document::dispatch::is_supported(path) {
            RefusalCode::ReadFailed
        } else {
            RefusalCode::UnsupportedFormat
        };
        let message = match code {
            RefusalCode::UnsupportedFormat => "Unsupported document format",
            _ => "Failed to read document",
        };
        build_envelope(
            code,
            message,
            serde_json::json!({ "path": path.display().to_string(), "error": error }),
            None,
        )
    })
}

#[allow(clippy::result_large_err)]
fn history_path(paths: &DataPaths, index: usize) -> Result<PathBuf, RefusalEnvelope> {
    let entry = history::store::get(&paths.history_file(), index).map_err(history_failed)?;
    entry.map(|entry| PathBuf::from(entry.path)).ok_or_else(|| {
        build_envelope(
            RefusalCode::History,
            "No such history entry",
            serde_json::json!({ "index": index }),
            Some("voicereader history list".to_owned()),
        )
    })
}

/// History is best-effort: a failure to record is a warning, not a refusal.
fn record_history(paths: &DataPaths, document: &ExtractedDocument, limit: usize) {
    let store_path = paths.history_file();
    let recorded = history::HistoryEntry::from_document(document, chrono::Utc::now().to_rfc3339())
        .and_then(|entry| history::store::record(&store_path, entry, limit));

    match recorded {
        Ok(stored) => tracing::debug!(stored, "history recorded"),
        Err(error) => {
            tracing::warn!(%error, "failed to record history");
            report_warning_code(
                &store_path.display().to_string(),
                Some("W_HISTORY"),
                &error,
            );
        }
    }
}

#[allow(clippy::result_large_err)]
fn resolve_engine(
    requested: Option<EngineKind>,
    settings: &Settings,
) -> Result<Engine, RefusalEnvelope> {
    match requested {
        Some(EngineKind::Command) => settings
            .engine
            .clone()
            .filter(|engine| engine.kind == EngineKind::Command)
            .ok_or_else(|| {
                build_envelope(
                    RefusalCode::BadConfig,
                    "The command engine needs a `command` entry in config.yaml",
                    serde_json::json!({ "engine": "command" }),
                    None,
                )
            }),
        Some(kind) => Ok(Engine::builtin(kind)),
        None => settings
            .engine
            .clone()
            .or_else(|| speech::detect_engine().map(Engine::builtin))
            .ok_or_else(|| {
                let searched: Vec<&str> = EngineKind::candidates(std::env::consts::OS)
                    .iter()
                    .filter_map(|kind| kind.program())
                    .collect();
                build_envelope(
                    RefusalCode::NoEngine,
                    "No speech engine available",
                    serde_json::json!({ "searched": searched }),
                    Some("install espeak-ng, or set engine/command in config.yaml".to_owned()),
                )
            }),
    }
}

/// Explicit voice, else the first installed voice matching a preference.
fn pick_voice(engine: &Engine, explicit: Option<String>, settings: &Settings) -> Option<String> {
    if explicit.is_some() || settings.preferred_voices.is_empty() {
        return speech::resolve_voice(explicit.as_deref(), &[], &[]);
    }

    let available = match speech::list_voices(engine) {
        Ok(voices) => voices,
        Err(error) => {
            tracing::warn!(engine = %engine.kind, %error, "voice listing unavailable");
            Vec::new()
        }
    };
    speech::resolve_voice(None, &settings.preferred_voices, &available)
}

fn history_failed(error: String) -> RefusalEnvelope {
    build_envelope(
        RefusalCode::History,
        "History store unavailable",
        serde_json::json!({ "error": error }),
        Some("voicereader history clear".to_owned()),
    )
}

fn output_failed(error: String) -> RefusalEnvelope {
    build_envelope(
        RefusalCode::BadInput,
        "Failed to write output",
        serde_json::json!({ "error": error }),
        None,
    )
}

/// Print a refusal envelope to stdout.
fn output_refusal_envelope(envelope: &RefusalEnvelope) {
    match serde_json::to_string(envelope) {
        Ok(json) => println!("{}", json),
        Err(error) => eprintln!("Error: failed to serialize refusal: {error}"),
    }
}
