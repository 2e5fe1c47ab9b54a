use crate::document::{DocumentFormat, ExtractedDocument, preview};
use blake3::Hasher;
use serde::{Deserialize, Serialize};

/// Characters of document text kept in each history entry.
pub const HISTORY_PREVIEW_CHARS: usize = 80;

/// One previously opened document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub path: String,
    pub format: String,
    pub chars: u64,
    pub bytes_hash: String,
    pub preview: String,
    pub opened_at: String,
}

impl HistoryEntry {
    pub fn new(
        path: impl Into<String>,
        format: DocumentFormat,
        chars: u64,
        bytes_hash: impl Into<String>,
        preview: impl Into<String>,
        opened_at: impl Into<String>,
    ) -> Result<Self, String> {
        let path = path.into();
        let format = format.as_str().to_owned();
        let bytes_hash = bytes_hash.into();
        let preview = preview.into();
        let opened_at = opened_at.into();

        let id = compute_entry_id(&path, &format, chars, &bytes_hash, &opened_at)?;

        Ok(Self {
            id,
            path,
            format,
            chars,
            bytes_hash,
            preview,
            opened_at,
        })
    }

    /// Build an entry for a freshly extracted document.
    pub fn from_document(
        document: &ExtractedDocument,
        opened_at: impl Into<String>,
    ) -> Result<Self, String> {
        let flattened = document.text.split_whitespace().collect::<Vec<_>>().join(" ");
        Self::new(
            document.path.display().to_string(),
            document.format,
            document.char_count() as u64,
            document.bytes_hash.clone(),
            preview(&flattened, HISTORY_PREVIEW_CHARS),
            opened_at,
        )
    }

    pub fn to_jsonl(&self) -> Result<String, String> {
        let json = serde_json::to_string(self)
            .map_err(|error| format!("failed to serialize history entry: {error}"))?;
        Ok(format!("{json}\n"))
    }
}

#[derive(Debug, Serialize)]
struct HistoryEntryIdPayload<'a> {
    path: &'a str,
    format: &'a str,
    chars: u64,
    bytes_hash: &'a str,
    opened_at: &'a str,
}

fn compute_entry_id(
    path: &str,
    format: &str,
    chars: u64,
    bytes_hash: &str,
    opened_at: &str,
) -> Result<String, String> {
    let payload = HistoryEntryIdPayload {
        path,
        format,
        chars,
        bytes_hash,
        opened_at,
    };
    let encoded = serde_json::to_vec(&payload)
        .map_err(|error| format!("failed to encode history entry ID payload: {error}"))?;

    let mut hasher = Hasher::new();
    hasher.update(&encoded);
    Ok(format!("blake3:{}", hasher.finalize().to_hex()))
}
