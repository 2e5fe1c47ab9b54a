use crate::document::XlsxDocument;
use calamine::{Data, Range, Reader, open_workbook_auto_from_rs};
use std::io::Cursor;
use std::path::Path;

impl XlsxDocument {
    /// Parse workbook bytes via calamine, failing early when they cannot be parsed.
    pub fn from_bytes(path: &Path, bytes: Vec<u8>) -> Result<Self, String> {
        let workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
            .map_err(|error| format!("failed to open xlsx '{}': {error}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            workbook,
        })
    }

    /// Flatten every sheet to text: a `--- Sheet: name ---` header, then one
    /// line per row from row 1 with the non-empty cells joined by a space.
    pub fn extract_text(&mut self) -> Result<String, String> {
        let sheet_names = self.workbook.sheet_names().to_vec();

        let mut text = String::new();
        for sheet in &sheet_names {
            let worksheet = self
                .workbook
                .worksheet_range(sheet)
                .map_err(|error| format!("failed to read sheet '{sheet}': {error}"))?;

            text.push_str(&format!("--- Sheet: {sheet} ---\n"));
            push_sheet_rows(&mut text, &worksheet);
        }

        tracing::debug!(
            path = %self.path.display(),
            sheets = sheet_names.len(),
            "workbook text extracted"
        );
        Ok(text)
    }
}

/// calamine ranges begin at the first used cell; rows above it still count.
/// A sheet with no cells reads as a single empty row.
fn push_sheet_rows(text: &mut String, worksheet: &Range<Data>) {
    let Some((first_row, _)) = worksheet.start() else {
        text.push('\n');
        return;
    };
    for _ in 0..first_row {
        text.push('\n');
    }
    for row in worksheet.rows() {
        text.push_str(&row_text(row));
        text.push('\n');
    }
}

fn row_text(row: &[Data]) -> String {
    row.iter()
        .filter(|cell| !matches!(cell, Data::Empty))
        .map(|cell| cell.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
