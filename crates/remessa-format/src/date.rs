//! Date normalisation to the canonical `YYYYMMDD` form.
//!
//! Input arrives as structured spreadsheet dates, spreadsheet serial numbers,
//! free text in several conventions, or bare digit strings. Strategies are
//! tried in a fixed order and the first success wins.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::error::{FormatError, Result};
use crate::field::only_digits;
use crate::value::CellValue;

/// Exclusive upper bound for spreadsheet serials (10000-01-01).
pub const MAX_EXCEL_SERIAL: f64 = 2_958_466.0;

/// Text formats tried day-first, including ISO forms.
const DAY_FIRST_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%d/%m/%y", "%d-%m-%y",
];

const DAY_FIRST_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const MONTH_FIRST_DATE_FORMATS: &[&str] = &["%m/%d/%Y", "%m-%d-%Y", "%m/%d/%y"];

const NAMED_MONTH_FORMATS: &[&str] = &["%d %b %Y", "%d-%b-%Y", "%b %d, %Y", "%d %B %Y", "%B %d, %Y"];

const EXPLICIT_FORMATS: &[&str] = &["%d/%m/%Y", "%Y/%m/%d"];

fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 30).unwrap_or_default()
}

/// Convert a spreadsheet serial to a date; the fractional part is ignored.
#[must_use]
pub fn from_excel_serial(serial: f64) -> Option<NaiveDate> {
    if !(1.0..MAX_EXCEL_SERIAL).contains(&serial) {
        return None;
    }
    // Range check above keeps this well inside i64.
    #[allow(clippy::cast_possible_truncation)]
    let days = serial.floor() as i64;
    excel_epoch().checked_add_signed(Duration::days(days))
}

fn render(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

fn in_output_range(date: NaiveDate) -> bool {
    (1..=9999).contains(&date.year())
}

/// Normalise a cell into an 8-digit `YYYYMMDD` date string.
///
/// Blank cells fail with `MissingField`; anything no strategy accepts fails
/// with `InvalidDate`. The output is always calendar-valid.
pub fn normalize_date(value: &CellValue, field: &str) -> Result<String> {
    let text = match value {
        CellValue::Empty => return Err(FormatError::missing(field)),
        CellValue::Date(date) => return checked(*date, value, field),
        CellValue::DateTime(dt) => return checked(dt.date(), value, field),
        CellValue::Number(n) if n.is_nan() => return Err(FormatError::missing(field)),
        CellValue::Number(n) => {
            if let Some(date) = from_excel_serial(*n) {
                return checked(date, value, field);
            }
            value.as_text()
        }
        CellValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return Err(FormatError::missing(field));
            }
            std::borrow::Cow::Borrowed(trimmed)
        }
    };

    if text.chars().any(|ch| !ch.is_ascii_digit())
        && let Some(date) = parse_text_date(&text)
    {
        return checked(date, value, field);
    }

    match parse_digit_date(&only_digits(&text)) {
        Some(date) => checked(date, value, field),
        None => Err(FormatError::invalid_date(
            field,
            text.as_ref(),
            "expected a date such as 20250903 or 03/09/2025",
        )),
    }
}

fn checked(date: NaiveDate, value: &CellValue, field: &str) -> Result<String> {
    if in_output_range(date) {
        Ok(render(date))
    } else {
        Err(FormatError::invalid_date(
            field,
            value.as_text(),
            "year outside 0001-9999",
        ))
    }
}

fn parse_text_date(text: &str) -> Option<NaiveDate> {
    let plausible = |date: NaiveDate| date.year() >= 1000;

    let try_dates = |formats: &[&str]| {
        formats
            .iter()
            .filter_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
            .find(|date| plausible(*date))
    };
    let try_datetimes = |formats: &[&str]| {
        formats
            .iter()
            .filter_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
            .map(|dt| dt.date())
            .find(|date| plausible(*date))
    };

    try_dates(DAY_FIRST_DATE_FORMATS)
        .or_else(|| try_datetimes(DAY_FIRST_DATETIME_FORMATS))
        .or_else(|| try_dates(MONTH_FIRST_DATE_FORMATS))
        .or_else(|| try_dates(NAMED_MONTH_FORMATS))
        .or_else(|| {
            if text.contains('/') {
                try_dates(EXPLICIT_FORMATS)
            } else {
                None
            }
        })
}

fn parse_digit_date(digits: &str) -> Option<NaiveDate> {
    let num = |range: std::ops::Range<usize>| digits.get(range)?.parse::<u32>().ok();
    match digits.len() {
        8 => {
            let ymd = num(0..4).and_then(|y| {
                NaiveDate::from_ymd_opt(i32::try_from(y).ok()?, num(4..6)?, num(6..8)?)
            });
            ymd.or_else(|| {
                let year = i32::try_from(num(4..8)?).ok()?;
                NaiveDate::from_ymd_opt(year, num(2..4)?, num(0..2)?)
            })
        }
        7 => {
            let year = i32::try_from(num(3..7)?).ok()?;
            NaiveDate::from_ymd_opt(year, num(1..3)?, num(0..1)?)
        }
        _ => None,
    }
}

/// Parse an already normalised `YYYYMMDD` string.
pub fn parse_compact(value: &str, field: &str) -> Result<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return Err(FormatError::invalid_date(field, value, "expected YYYYMMDD"));
    }
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .map_err(|e| FormatError::invalid_date(field, value, e.to_string()))
}

/// Whole days from `start` to `end`, both `YYYYMMDD`.
///
/// Fails with `InvalidDate` when `end` precedes `start`.
pub fn days_between(start: &str, end: &str, field: &str) -> Result<i64> {
    let from = parse_compact(start, field)?;
    let to = parse_compact(end, field)?;
    if to < from {
        return Err(FormatError::invalid_date(
            field,
            end,
            format!("precedes {start}"),
        ));
    }
    Ok((to - from).num_days())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(value: impl Into<CellValue>) -> Result<String> {
        normalize_date(&value.into(), "DATA")
    }

    #[test]
    fn test_structured_dates() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 3).unwrap();
        assert_eq!(norm(date).unwrap(), "20250903");
        let dt = date.and_hms_opt(10, 30, 0).unwrap();
        assert_eq!(normalize_date(&CellValue::DateTime(dt), "D").unwrap(), "20250903");
    }

    #[test]
    fn test_excel_serial() {
        assert_eq!(norm(45903.0).unwrap(), "20250903");
        assert_eq!(norm(45903.75).unwrap(), "20250903");
        assert_eq!(norm(1.0).unwrap(), "18991231");
        assert_eq!(norm(2_958_465.0).unwrap(), "99991231");
    }

    #[test]
    fn test_large_integral_number_falls_through_as_digits() {
        assert_eq!(norm(20_250_903.0).unwrap(), "20250903");
        assert_eq!(norm(31_122_025.0).unwrap(), "20251231");
    }

    #[test]
    fn test_text_formats_day_first() {
        assert_eq!(norm("03/09/2025").unwrap(), "20250903");
        assert_eq!(norm("2025-09-03").unwrap(), "20250903");
        assert_eq!(norm("2025-09-03 00:00:00").unwrap(), "20250903");
        assert_eq!(norm("03.09.2025").unwrap(), "20250903");
        assert_eq!(norm("13/12/2025").unwrap(), "20251213");
    }

    #[test]
    fn test_month_first_fallback() {
        assert_eq!(norm("12/31/2025").unwrap(), "20251231");
        assert_eq!(norm("2025/09/03").unwrap(), "20250903");
        assert_eq!(norm("3 Sep 2025").unwrap(), "20250903");
    }

    #[test]
    fn test_digit_strings() {
        assert_eq!(norm("20250903").unwrap(), "20250903");
        assert_eq!(norm("01022025").unwrap(), "20250201");
        assert_eq!(norm("3092025").unwrap(), "20250903");
    }

    #[test]
    fn test_failures() {
        assert!(matches!(norm(""), Err(FormatError::MissingField { .. })));
        assert!(matches!(norm(CellValue::Empty), Err(FormatError::MissingField { .. })));
        assert!(matches!(norm("31/02/2025"), Err(FormatError::InvalidDate { .. })));
        assert!(matches!(norm("hoje"), Err(FormatError::InvalidDate { .. })));
        assert!(matches!(norm("123"), Err(FormatError::InvalidDate { .. })));
    }

    #[test]
    fn test_days_between() {
        assert_eq!(days_between("20250903", "20260903", "PRAZO").unwrap(), 365);
        assert_eq!(days_between("20250101", "20250101", "PRAZO").unwrap(), 0);
        assert!(matches!(
            days_between("20250101", "20241231", "PRAZO"),
            Err(FormatError::InvalidDate { .. })
        ));
    }
}
