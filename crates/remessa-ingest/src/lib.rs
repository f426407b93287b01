//! Spreadsheet ingestion for remittance batches.
//!
//! Loads CSV files and workbooks into a [`Table`], resolves the canonical
//! columns a record builder needs, and hands out [`RecordRow`]s.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use remessa_ingest::{ColumnMap, ReadOptions, deposit_fields, read_table};
//!
//! let table = read_table(Path::new("deposito.xlsx"), ReadOptions::default())?;
//! let map = ColumnMap::resolve(&table, &deposit_fields())?;
//! let rows = table.records(&map);
//! ```
//!
//! [`RecordRow`]: remessa_format::RecordRow

mod columns;
mod csv;
mod error;
mod table;
mod workbook;

// === Error Types ===
pub use error::{IngestError, Result};

// === Table Reading ===
pub use csv::{detect_delimiter, read_csv_table};
pub use table::{
    DEFAULT_SHEET_INDEX, InputFormat, ReadOptions, Table, TableRow, clean_cell, read_table,
};
pub use workbook::{convert_cell, read_workbook_table};

// === Column Resolution ===
pub use columns::{ColumnMap, FieldAliases, deposit_fields, nc_fields, normalize_column_name};
