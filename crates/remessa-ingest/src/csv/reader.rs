//! CSV file reading with delimiter detection.

use std::fs;
use std::path::Path;

use crate::error::{IngestError, Result};
use crate::table::{Table, TableRow, clean_cell};

/// Pick `;` when the header line has more semicolons than commas.
///
/// Spreadsheets saved with a Brazilian locale export semicolon-separated files.
#[must_use]
pub fn detect_delimiter(header_line: &str) -> u8 {
    let semicolons = header_line.matches(';').count();
    let commas = header_line.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}

/// Read a CSV file into a [`Table`].
///
/// The first record is the header. A UTF-8 BOM is stripped, every cell is
/// trimmed, and null placeholders (`nan`, `null`, ...) become empty cells.
pub fn read_csv_table(path: &Path) -> Result<Table> {
    let bytes = fs::read(path).map_err(|e| IngestError::io(path, e))?;
    let content = String::from_utf8(bytes).map_err(|e| IngestError::CsvParse {
        path: path.to_path_buf(),
        message: format!("file is not valid UTF-8: {e}"),
    })?;
    // Skip BOM if present
    let content = content.strip_prefix('\u{feff}').unwrap_or(&content);

    let header_line = content.lines().next().unwrap_or_default();
    let delimiter = detect_delimiter(header_line);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut records = reader.records();
    let headers: Vec<String> = match records.next() {
        Some(record) => record
            .map_err(|e| csv_error(path, &e))?
            .iter()
            .map(|h| h.trim().to_string())
            .collect(),
        None => {
            return Err(IngestError::EmptyTable {
                path: path.to_path_buf(),
            });
        }
    };
    if headers.iter().all(String::is_empty) {
        return Err(IngestError::EmptyTable {
            path: path.to_path_buf(),
        });
    }

    let mut rows = Vec::new();
    for (index, record) in records.enumerate() {
        let record = record.map_err(|e| csv_error(path, &e))?;
        let line = record
            .position()
            .and_then(|p| usize::try_from(p.line()).ok())
            .unwrap_or(index + 2);
        rows.push(TableRow {
            line,
            cells: record.iter().map(clean_cell).collect(),
        });
    }

    tracing::debug!(
        path = %path.display(),
        delimiter = %char::from(delimiter),
        rows = rows.len(),
        "parsed CSV"
    );
    Ok(Table::new(path, headers, rows))
}

fn csv_error(path: &Path, error: &csv::Error) -> IngestError {
    IngestError::CsvParse {
        path: path.to_path_buf(),
        message: error.to_string(),
    }
}
