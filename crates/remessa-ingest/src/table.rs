//! In-memory input table and its conversion into record rows.

use std::path::{Path, PathBuf};

use remessa_format::{CellValue, RecordRow};

use crate::columns::ColumnMap;
use crate::error::{IngestError, Result};

/// Placeholder strings that spreadsheet exports use for missing values.
const NULL_TOKENS: &[&str] = &["nan", "none", "null", "<na>", "nat"];

/// Clean a raw text cell: trim, and map null placeholders to [`CellValue::Empty`].
#[must_use]
pub fn clean_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim();
    if NULL_TOKENS
        .iter()
        .any(|token| trimmed.eq_ignore_ascii_case(token))
    {
        return CellValue::Empty;
    }
    CellValue::text(trimmed)
}

/// One data row with the 1-based line it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub line: usize,
    pub cells: Vec<CellValue>,
}

impl TableRow {
    fn is_blank(&self) -> bool {
        self.cells.iter().all(CellValue::is_blank)
    }
}

/// A header row plus data rows, as read from a CSV file or worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    source: PathBuf,
    headers: Vec<String>,
    rows: Vec<TableRow>,
}

impl Table {
    /// Build a table; rows are padded or cut to the header width.
    pub fn new(source: impl Into<PathBuf>, headers: Vec<String>, rows: Vec<TableRow>) -> Self {
        let source = source.into();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.cells.len() > width {
                    tracing::warn!(
                        path = %source.display(),
                        line = row.line,
                        cells = row.cells.len(),
                        columns = width,
                        "row has more cells than the header, extra cells ignored"
                    );
                }
                row.cells.resize(width, CellValue::Empty);
                row
            })
            .collect();
        Self {
            source,
            headers,
            rows,
        }
    }

    #[must_use]
    pub fn source(&self) -> &Path {
        &self.source
    }

    /// Header names as they appear in the file.
    #[must_use]
    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    #[must_use]
    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Turn every non-blank row into a [`RecordRow`] keyed by canonical column name.
    ///
    /// Columns the map does not resolve are absent from the rows and read as empty.
    #[must_use]
    pub fn records(&self, map: &ColumnMap) -> Vec<RecordRow> {
        self.rows
            .iter()
            .filter(|row| {
                let blank = row.is_blank();
                if blank {
                    tracing::debug!(line = row.line, "skipping blank row");
                }
                !blank
            })
            .map(|row| {
                let mut record = RecordRow::new(row.line);
                for (canonical, index) in map.iter() {
                    if let Some(cell) = row.cells.get(index) {
                        record.insert(canonical, cell.clone());
                    }
                }
                record
            })
            .collect()
    }
}

/// How an input file is parsed, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Csv,
    Workbook,
}

impl InputFormat {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match extension.as_str() {
            "csv" | "txt" => Ok(Self::Csv),
            "xlsx" | "xlsm" | "xltx" | "xltm" | "xlsb" | "xls" | "ods" => Ok(Self::Workbook),
            _ => Err(IngestError::UnsupportedFormat {
                path: path.to_path_buf(),
                extension,
            }),
        }
    }
}

/// Options for [`read_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadOptions {
    /// Zero-based worksheet index; out of range falls back to the first sheet.
    pub sheet_index: usize,
}

/// Worksheet read when none is given: the second one, where the note data usually lives.
pub const DEFAULT_SHEET_INDEX: usize = 1;

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            sheet_index: DEFAULT_SHEET_INDEX,
        }
    }
}

/// Read a CSV file or workbook into a [`Table`].
pub fn read_table(path: &Path, options: ReadOptions) -> Result<Table> {
    if !path.exists() {
        return Err(IngestError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let table = match InputFormat::from_path(path)? {
        InputFormat::Csv => crate::csv::read_csv_table(path)?,
        InputFormat::Workbook => crate::workbook::read_workbook_table(path, options.sheet_index)?,
    };
    tracing::info!(
        path = %path.display(),
        columns = table.headers().len(),
        rows = table.len(),
        "loaded input table"
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_cell_maps_placeholders() {
        for raw in ["nan", "NaN", " None ", "null", "<NA>", "NaT", "", "   "] {
            assert_eq!(clean_cell(raw), CellValue::Empty, "{raw:?}");
        }
        assert_eq!(clean_cell("  abc "), CellValue::Text("abc".to_string()));
        assert_eq!(clean_cell("nano"), CellValue::Text("nano".to_string()));
    }

    #[test]
    fn test_rows_resized_to_header_width() {
        let table = Table::new(
            "t.csv",
            vec!["A".to_string(), "B".to_string()],
            vec![
                TableRow {
                    line: 2,
                    cells: vec![CellValue::text("1")],
                },
                TableRow {
                    line: 3,
                    cells: vec![
                        CellValue::text("1"),
                        CellValue::text("2"),
                        CellValue::text("3"),
                    ],
                },
            ],
        );
        assert!(table.rows().iter().all(|r| r.cells.len() == 2));
        assert_eq!(table.rows()[0].cells[1], CellValue::Empty);
    }

    #[test]
    fn test_input_format_from_extension() {
        assert_eq!(
            InputFormat::from_path(Path::new("a.CSV")).unwrap(),
            InputFormat::Csv
        );
        assert_eq!(
            InputFormat::from_path(Path::new("a.xlsx")).unwrap(),
            InputFormat::Workbook
        );
        assert!(matches!(
            InputFormat::from_path(Path::new("a.pdf")),
            Err(IngestError::UnsupportedFormat { .. })
        ));
        assert!(InputFormat::from_path(Path::new("noext")).is_err());
    }
}
