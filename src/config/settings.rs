use crate::document::DEFAULT_PREVIEW_CHARS;
use crate::history::DEFAULT_HISTORY_LIMIT;
use crate::speech::{Engine, EngineKind, Rate};
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

/// On-disk `config.yaml` shape. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct RawSettings {
    rate: Option<f64>,
    engine: Option<EngineKind>,
    command: Vec<String>,
    voice: Option<String>,
    preferred_voices: Option<Vec<String>>,
    history_limit: Option<usize>,
    preview_chars: Option<usize>,
}

/// Validated reader settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub rate: Rate,
    /// `None` means detect an engine on first use.
    pub engine: Option<Engine>,
    pub voice: Option<String>,
    pub preferred_voices: Vec<String>,
    pub history_limit: usize,
    pub preview_chars: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rate: Rate::NORMAL,
            engine: None,
            voice: None,
            preferred_voices: default_preferred_voices(),
            history_limit: DEFAULT_HISTORY_LIMIT,
            preview_chars: DEFAULT_PREVIEW_CHARS,
        }
    }
}

fn default_preferred_voices() -> Vec<String> {
    vec!["Japan".to_owned(), "Haruka".to_owned()]
}

impl Settings {
    /// Load settings from a YAML file; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Self, String> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_yaml(&content)
                .map_err(|error| format!("invalid config '{}': {error}", path.display())),
            Err(error) if error.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(error) => Err(format!(
                "failed to read config '{}': {error}",
                path.display()
            )),
        }
    }

    pub fn from_yaml(content: &str) -> Result<Self, String> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: RawSettings = serde_yaml::from_str(content).map_err(|error| error.to_string())?;
        Self::from_raw(raw)
    }

    fn from_raw(raw: RawSettings) -> Result<Self, String> {
        let defaults = Self::default();

        let rate = raw.rate.map(Rate::new).transpose()?.unwrap_or(defaults.rate);

        let engine = match raw.engine {
            Some(EngineKind::Command) => Some(Engine::custom(raw.command)?),
            Some(kind) => {
                if !raw.command.is_empty() {
                    return Err(format!("'command' is only used with engine: command, not {kind}"));
                }
                Some(Engine::builtin(kind))
            }
            None if !raw.command.is_empty() => Some(Engine::custom(raw.command)?),
            None => None,
        };

        let history_limit = raw.history_limit.unwrap_or(defaults.history_limit);
        if history_limit == 0 {
            return Err("history_limit must be at least 1".to_owned());
        }
        let preview_chars = raw.preview_chars.unwrap_or(defaults.preview_chars);
        if preview_chars == 0 {
            return Err("preview_chars must be at least 1".to_owned());
        }

        Ok(Self {
            rate,
            engine,
            voice: raw.voice.filter(|voice| !voice.trim().is_empty()),
            preferred_voices: raw.preferred_voices.unwrap_or(defaults.preferred_voices),
            history_limit,
            preview_chars,
        })
    }
}
