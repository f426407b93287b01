//! Loosely typed cell values and the rows built from them.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

/// A single spreadsheet cell after ingestion.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Blank cell (also used for `nan`/`null` style placeholders).
    #[default]
    Empty,
    /// Free text, already trimmed.
    Text(String),
    /// Numeric cell (may also be a spreadsheet date serial).
    Number(f64),
    /// Structured date cell.
    Date(NaiveDate),
    /// Structured timestamp cell.
    DateTime(NaiveDateTime),
}

impl CellValue {
    /// Build a text cell, mapping whitespace-only input to [`CellValue::Empty`].
    pub fn text(value: impl Into<String>) -> Self {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            Self::Empty
        } else if trimmed.len() == value.len() {
            Self::Text(value)
        } else {
            Self::Text(trimmed.to_string())
        }
    }

    /// True for empty cells and blank text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Number(n) => n.is_nan(),
            Self::Date(_) | Self::DateTime(_) => false,
        }
    }

    /// Textual view of the cell.
    ///
    /// Integral numbers render without a fractional part so that digit-only
    /// fields never pick up a trailing `0` from `1000.0`.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Empty => Cow::Borrowed(""),
            Self::Text(s) => Cow::Borrowed(s.trim()),
            Self::Number(n) => Cow::Owned(format_number(*n)),
            Self::Date(d) => Cow::Owned(d.format("%Y-%m-%d").to_string()),
            Self::DateTime(dt) => Cow::Owned(dt.format("%Y-%m-%d %H:%M:%S").to_string()),
        }
    }
}

fn format_number(n: f64) -> String {
    if n.is_nan() {
        String::new()
    } else if n.fract() == 0.0 && n.abs() < 1e18 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<NaiveDate> for CellValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

static EMPTY: CellValue = CellValue::Empty;

/// One input row keyed by canonical field name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordRow {
    line: usize,
    values: BTreeMap<String, CellValue>,
}

impl RecordRow {
    /// Create an empty row for the given spreadsheet line (header is line 1).
    #[must_use]
    pub fn new(line: usize) -> Self {
        Self {
            line,
            values: BTreeMap::new(),
        }
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, field: &str, value: impl Into<CellValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Set a field value.
    pub fn insert(&mut self, field: &str, value: impl Into<CellValue>) {
        self.values.insert(field.to_string(), value.into());
    }

    /// Value of a field, [`CellValue::Empty`] when absent.
    #[must_use]
    pub fn get(&self, field: &str) -> &CellValue {
        self.values.get(field).unwrap_or(&EMPTY)
    }

    /// Spreadsheet line this row came from.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Iterate over the populated fields.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_trims_and_blanks() {
        assert_eq!(CellValue::text("  abc "), CellValue::Text("abc".to_string()));
        assert_eq!(CellValue::text("   "), CellValue::Empty);
        assert!(CellValue::Empty.is_blank());
        assert!(CellValue::Number(f64::NAN).is_blank());
    }

    #[test]
    fn test_integral_numbers_render_without_fraction() {
        assert_eq!(CellValue::Number(1_000_000.0).as_text(), "1000000");
        assert_eq!(CellValue::Number(1.5).as_text(), "1.5");
    }

    #[test]
    fn test_row_missing_field_is_empty() {
        let row = RecordRow::new(2).with("A", "x");
        assert_eq!(row.get("A"), &CellValue::Text("x".to_string()));
        assert_eq!(row.get("B"), &CellValue::Empty);
        assert_eq!(row.line(), 2);
    }
}
