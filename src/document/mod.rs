pub mod dispatch;
pub mod pdf;
pub mod preview;
pub mod text;
pub mod xlsx;

pub use dispatch::{extract, open_document, resolve_path};
pub use preview::{DEFAULT_PREVIEW_CHARS, preview};
pub use text::TextDocument;

use serde::Serialize;
use std::fmt;
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// Formats the reader knows how to turn into speakable text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Text,
    Pdf,
    Xlsx,
}

impl DocumentFormat {
    /// Resolve a format from a file extension (case-insensitive, without the dot).
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_lowercase().as_str() {
            "txt" | "text" => Some(DocumentFormat::Text),
            "pdf" => Some(DocumentFormat::Pdf),
            "xlsx" | "xlsm" | "xls" => Some(DocumentFormat::Xlsx),
            _ => None,
        }
    }

    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DocumentFormat::Text => "text",
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Xlsx => "xlsx",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Format-specific document access.
pub enum Document {
    Text(TextDocument),
    Pdf(PdfDocument),
    Xlsx(XlsxDocument),
}

impl Document {
    pub fn path(&self) -> &Path {
        match self {
            Document::Text(d) => &d.path,
            Document::Pdf(d) => &d.path,
            Document::Xlsx(d) => &d.path,
        }
    }

    pub fn format(&self) -> DocumentFormat {
        match self {
            Document::Text(_) => DocumentFormat::Text,
            Document::Pdf(_) => DocumentFormat::Pdf,
            Document::Xlsx(_) => DocumentFormat::Xlsx,
        }
    }

    /// Extract the speakable text of the whole document.
    pub fn into_text(self) -> Result<String, String> {
        match self {
            Document::Text(d) => Ok(d.into_content()),
            Document::Pdf(d) => d.extract_text(),
            Document::Xlsx(mut d) => d.extract_text(),
        }
    }
}

pub struct PdfDocument {
    pub path: PathBuf,
    pub document: lopdf::Document,
}

pub struct XlsxDocument {
    pub path: PathBuf,
    pub workbook: calamine::Sheets<Cursor<Vec<u8>>>,
}

/// Text pulled out of a document, ready for preview, playback and history.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractedDocument {
    pub path: PathBuf,
    pub format: DocumentFormat,
    pub text: String,
    pub bytes_hash: String,
}

impl ExtractedDocument {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
