use serde::Serialize;
use serde_json::Value;

pub const ENVELOPE_VERSION: &str = "voicereader.v0";

/// Refusal codes emitted on exit 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RefusalCode {
    /// File extension is not txt, pdf or xlsx.
    #[serde(rename = "E_UNSUPPORTED_FORMAT")]
    UnsupportedFormat,
    /// File missing, unreadable, or not parseable in its format.
    #[serde(rename = "E_READ_FAILED")]
    ReadFailed,
    /// Document extracted to blank text; nothing to speak.
    #[serde(rename = "E_EMPTY_TEXT")]
    EmptyText,
    /// No speech engine configured or found on PATH.
    #[serde(rename = "E_NO_ENGINE")]
    NoEngine,
    /// Speech engine could not start or exited with an error.
    #[serde(rename = "E_PLAYBACK")]
    Playback,
    /// History store unreadable or not writable.
    #[serde(rename = "E_HISTORY")]
    History,
    /// config.yaml unreadable or invalid.
    #[serde(rename = "E_BAD_CONFIG")]
    BadConfig,
    /// Command-line input that clap cannot reject on its own.
    #[serde(rename = "E_BAD_INPUT")]
    BadInput,
}

/// Refusal envelope printed to stdout on exit 2.
#[derive(Debug, Clone, Serialize)]
pub struct RefusalEnvelope {
    pub version: String,
    pub outcome: String,
    pub refusal: RefusalBody,
}

#[derive(Debug, Clone, Serialize)]
pub struct RefusalBody {
    pub code: RefusalCode,
    pub message: String,
    pub detail: Value,
    pub next_command: Option<String>,
}

pub fn build_envelope(
    code: RefusalCode,
    message: impl Into<String>,
    detail: Value,
    next_command: Option<String>,
) -> RefusalEnvelope {
    RefusalEnvelope {
        version: ENVELOPE_VERSION.to_owned(),
        outcome: "REFUSAL".to_owned(),
        refusal: RefusalBody {
            code,
            message: message.into(),
            detail,
            next_command,
        },
    }
}

impl RefusalEnvelope {
    pub fn code(&self) -> RefusalCode {
        self.refusal.code
    }
}
