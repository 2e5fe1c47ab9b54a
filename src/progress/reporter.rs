use serde::Serialize;
use std::io::{self, Write};

/// Playback status event emitted to stderr.
#[derive(Debug, Serialize)]
pub struct StatusEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub tool: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub elapsed_ms: u64,
}

impl StatusEvent {
    pub fn new(status: &str, path: Option<&str>, message: Option<&str>, elapsed_ms: u64) -> Self {
        Self {
            event_type: "status".to_owned(),
            tool: "voicereader".to_owned(),
            status: status.to_owned(),
            path: path.map(str::to_owned),
            message: message.map(str::to_owned),
            elapsed_ms,
        }
    }
}

/// Structured warning emitted to stderr for recoverable problems.
#[derive(Debug, Serialize)]
pub struct WarningEvent {
    #[serde(rename = "type")]
    pub event_type: String,
    pub tool: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub message: String,
}

/// Report a status change to stderr as JSONL.
pub fn report_status(event: &StatusEvent) {
    let mut stderr = io::stderr().lock();
    let _ = write_event_line(&mut stderr, event);
}

/// Report a warning to stderr as JSONL with an optional warning code.
pub fn report_warning_code(path: &str, code: Option<&str>, message: &str) {
    let warning = WarningEvent {
        event_type: "warning".to_owned(),
        tool: "voicereader".to_owned(),
        path: path.to_owned(),
        code: code.map(str::to_owned),
        message: message.to_owned(),
    };
    let mut stderr = io::stderr().lock();
    let _ = write_event_line(&mut stderr, &warning);
}

fn write_event_line<T: Serialize>(out: &mut dyn Write, event: &T) -> Result<(), String> {
    serde_json::to_writer(&mut *out, event)
        .map_err(|error| format!("failed to serialize status event: {error}"))?;
    out.write_all(b"\n")
        .map_err(|error| format!("failed to write status event newline: {error}"))?;
    out.flush()
        .map_err(|error| format!("failed to flush status event output: {error}"))?;
    Ok(())
}
