//! Workbook (xlsx, xls, ods) reading via calamine.

use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use remessa_format::CellValue;
use remessa_format::date::from_excel_serial;

use crate::error::{IngestError, Result};
use crate::table::{Table, TableRow, clean_cell};

/// Read one worksheet into a [`Table`].
///
/// `sheet_index` is zero-based. When the workbook has fewer sheets the first
/// one is used instead. The first row of the used range is the header.
pub fn read_workbook_table(path: &Path, sheet_index: usize) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).map_err(|e| IngestError::Workbook {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = match sheet_names.get(sheet_index) {
        Some(name) => name.clone(),
        None => {
            let first = sheet_names.first().ok_or_else(|| IngestError::NoSheets {
                path: path.to_path_buf(),
            })?;
            tracing::warn!(
                path = %path.display(),
                requested = sheet_index,
                sheets = sheet_names.len(),
                sheet = %first,
                "worksheet index out of range, using the first sheet"
            );
            first.clone()
        }
    };

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| IngestError::Workbook {
            path: path.to_path_buf(),
            message: format!("sheet '{sheet_name}': {e}"),
        })?;

    // Line numbers follow the sheet, so a range starting at row 3 reports line 4 for its first data row.
    let first_row = range
        .start()
        .map_or(0, |(row, _)| usize::try_from(row).unwrap_or(0));

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(cells) => cells
            .iter()
            .map(|cell| convert_cell(cell).as_text().into_owned())
            .collect(),
        None => {
            return Err(IngestError::EmptyTable {
                path: path.to_path_buf(),
            });
        }
    };

    let rows: Vec<TableRow> = rows_iter
        .enumerate()
        .map(|(index, cells)| TableRow {
            line: first_row + index + 2,
            cells: cells.iter().map(convert_cell).collect(),
        })
        .collect();

    tracing::debug!(
        path = %path.display(),
        sheet = %sheet_name,
        rows = rows.len(),
        "parsed worksheet"
    );
    Ok(Table::new(path, headers, rows))
}

/// Map a calamine cell onto a [`CellValue`].
///
/// Date-formatted cells become structured dates; error cells become empty.
#[must_use]
pub fn convert_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => clean_cell(s),
        Data::Int(i) => int_cell(*i),
        Data::Float(f) => CellValue::Number(*f),
        Data::Bool(b) => CellValue::text(if *b { "TRUE" } else { "FALSE" }),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            from_excel_serial(serial).map_or(CellValue::Number(serial), CellValue::Date)
        }
        Data::Error(e) => {
            tracing::warn!(error = %e, "worksheet cell holds an error value, treated as empty");
            CellValue::Empty
        }
    }
}

/// Largest integer magnitude an `f64` holds exactly.
const MAX_EXACT_INT: i64 = 1 << 53;

/// Integers beyond `f64` precision keep their digits as text.
fn int_cell(value: i64) -> CellValue {
    if value.unsigned_abs() <= MAX_EXACT_INT.unsigned_abs() {
        CellValue::Number(value as f64)
    } else {
        CellValue::text(value.to_string())
    }
}
