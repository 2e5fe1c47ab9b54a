use crate::document::{
    Document, DocumentFormat, ExtractedDocument, PdfDocument, TextDocument, XlsxDocument,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Open a document using format dispatch from its extension.
pub fn open_document(path: &Path) -> Result<Document, String> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| unsupported(path))?;
    parse(path, format, read_bytes(path)?)
}

/// Read a document once, then hash and parse the same bytes.
pub fn extract(path: &Path) -> Result<ExtractedDocument, String> {
    let format = DocumentFormat::from_path(path).ok_or_else(|| unsupported(path))?;
    let bytes = read_bytes(path)?;
    let bytes_hash = format!("blake3:{}", blake3::hash(&bytes).to_hex());
    let document = parse(path, format, bytes)?;

    tracing::info!(path = %document.path().display(), format = %format, "document loaded");
    let text = document.into_text()?;
    tracing::debug!(chars = text.chars().count(), "document text extracted");

    Ok(ExtractedDocument {
        path: path.to_path_buf(),
        format,
        text,
        bytes_hash,
    })
}

/// The absolute, symlink-free form of `path`. A file that cannot be
/// canonicalized (for example because it is missing) keeps its absolute form.
pub fn resolve_path(path: &Path) -> PathBuf {
    fs::canonicalize(path)
        .or_else(|_| std::path::absolute(path))
        .unwrap_or_else(|_| path.to_path_buf())
}

/// Whether a path names a format the reader can open.
pub fn is_supported(path: &Path) -> bool {
    DocumentFormat::from_path(path).is_some()
}

fn read_bytes(path: &Path) -> Result<Vec<u8>, String> {
    fs::read(path).map_err(|error| format!("failed to read '{}': {error}", path.display()))
}

fn parse(path: &Path, format: DocumentFormat, bytes: Vec<u8>) -> Result<Document, String> {
    match format {
        DocumentFormat::Text => Ok(Document::Text(TextDocument::from_bytes(path, bytes)?)),
        DocumentFormat::Pdf => Ok(Document::Pdf(PdfDocument::from_bytes(path, &bytes)?)),
        DocumentFormat::Xlsx => Ok(Document::Xlsx(XlsxDocument::from_bytes(path, bytes)?)),
    }
}

fn unsupported(path: &Path) -> String {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| "(none)".to_owned());
    format!(
        "unsupported file format {extension} for '{}': expected .txt, .pdf or .xlsx",
        path.display()
    )
}
