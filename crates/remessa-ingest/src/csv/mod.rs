//! CSV reading utilities.

mod reader;

pub use reader::{detect_delimiter, read_csv_table};
