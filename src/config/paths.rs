use std::path::PathBuf;

/// Files the reader keeps under its data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    pub root: PathBuf,
}

impl DataPaths {
    /// Resolve from `$VOICEREADER_HOME`, then `$HOME/.voicereader`.
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = get_env("VOICEREADER_HOME")
            && !path.trim().is_empty()
        {
            return Self::at(path);
        }

        if let Some(home) = get_env("HOME").or_else(|| get_env("USERPROFILE"))
            && !home.trim().is_empty()
        {
            return Self::at(PathBuf::from(home).join(".voicereader"));
        }

        Self::at(".voicereader")
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    pub fn history_file(&self) -> PathBuf {
        self.root.join("history.jsonl")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn log_file(&self) -> PathBuf {
        self.log_dir().join(LOG_FILE_NAME)
    }
}

pub const LOG_FILE_NAME: &str = "voicereader.log";
