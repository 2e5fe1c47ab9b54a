use std::path::{Path, PathBuf};

pub struct TextDocument {
    pub path: PathBuf,
    pub content: String,
}

impl TextDocument {
    /// Decode a text file's bytes, which must be UTF-8.
    pub fn from_bytes(path: &Path, bytes: Vec<u8>) -> Result<Self, String> {
        let content = String::from_utf8(bytes)
            .map_err(|error| format!("failed to read text file '{}': {error}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            content,
        })
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn into_content(self) -> String {
        self.content
    }
}
