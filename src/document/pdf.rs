use crate::document::PdfDocument;
use std::path::Path;

impl PdfDocument {
    /// Parse PDF bytes, failing early when they are not a readable PDF.
    pub fn from_bytes(path: &Path, bytes: &[u8]) -> Result<Self, String> {
        let document = lopdf::Document::load_mem(bytes)
            .map_err(|error| format!("failed reading pdf '{}': {error}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    /// Extract text page by page, each page terminated by a newline.
    pub fn extract_text(&self) -> Result<String, String> {
        let mut text = String::new();
        for page_number in self.document.get_pages().keys() {
            let page_text = self.document.extract_text(&[*page_number]).map_err(|error| {
                format!(
                    "failed extracting text from page {page_number} of '{}': {error}",
                    self.path.display()
                )
            })?;
            text.push_str(&page_text);
            text.push('\n');
        }
        tracing::debug!(path = %self.path.display(), chars = text.len(), "pdf text extracted");
        Ok(text)
    }
}
