//! Fixed-width field formatters.
//!
//! These are pure functions: each one turns a loosely typed value into a
//! field of an exact byte width. Alphanumeric fields are space-padded on the
//! right, numeric fields are zero-padded on the left and carry no separators.

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use tracing::warn;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::error::{FormatError, Result};
use crate::value::CellValue;

/// Strip diacritics by decomposing (NFKD) and dropping combining marks.
#[must_use]
pub fn fold_diacritics(value: &str) -> String {
    value.nfkd().filter(|ch| !is_combining_mark(*ch)).collect()
}

/// Alphanumeric field: folded, control characters blanked, truncated, space-padded.
///
/// Never fails. Characters that are still outside ASCII after folding are
/// written as `?` so the field is always exactly `length` bytes.
#[must_use]
pub fn format_text(value: &str, length: usize) -> String {
    let mut out: String = fold_diacritics(value)
        .chars()
        .map(|ch| {
            if ch.is_control() {
                ' '
            } else if ch.is_ascii() {
                ch
            } else {
                '?'
            }
        })
        .take(length)
        .collect();
    let pad = length - out.len();
    out.extend(std::iter::repeat_n(' ', pad));
    out
}

/// Upper-case `[A-Z0-9 ]` text with collapsed whitespace, used for names.
#[must_use]
pub fn clean_text(value: &str) -> String {
    let folded = fold_diacritics(value).to_uppercase();
    let replaced: String = folded
        .chars()
        .map(|ch| {
            if ch.is_ascii_uppercase() || ch.is_ascii_digit() {
                ch
            } else {
                ' '
            }
        })
        .collect();
    replaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Keep only ASCII digits.
#[must_use]
pub fn only_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

/// Numeric field: digits only, zero-padded on the left.
///
/// When there are more digits than `length`, the rightmost `length` digits are
/// kept and a warning is logged. Use [`format_digits_checked`] where overflow
/// must be rejected.
#[must_use]
pub fn format_digits(value: &str, length: usize) -> String {
    let digits = only_digits(value);
    if digits.len() > length {
        warn!(
            digits = digits.len(),
            width = length,
            "numeric field truncated to its rightmost digits"
        );
        return digits[digits.len() - length..].to_string();
    }
    format!("{digits:0>length$}")
}

/// Strict variant of [`format_digits`]: overflow is an `InvalidValue`.
pub fn format_digits_checked(value: &str, length: usize, field: &str) -> Result<String> {
    let digits = only_digits(value);
    if digits.len() > length {
        return Err(FormatError::invalid_value(
            field,
            value,
            format!("more than {length} digits"),
        ));
    }
    Ok(format!("{digits:0>length$}"))
}

/// How a decimal field treats input it cannot use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Blank is `MissingField`; unparseable, negative or too large is `InvalidValue`.
    Mandatory,
    /// Blank, unparseable or negative renders as zero; overflow keeps the rightmost digits.
    Lenient,
}

/// Shape and policy of a scaled decimal field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecimalSpec {
    pub integer_digits: u32,
    pub fraction_digits: u32,
    pub requirement: Requirement,
}

impl DecimalSpec {
    /// Mandatory field with the given integer and fraction digits.
    #[must_use]
    pub const fn mandatory(integer_digits: u32, fraction_digits: u32) -> Self {
        Self {
            integer_digits,
            fraction_digits,
            requirement: Requirement::Mandatory,
        }
    }

    /// Lenient field with the given integer and fraction digits.
    #[must_use]
    pub const fn lenient(integer_digits: u32, fraction_digits: u32) -> Self {
        Self {
            integer_digits,
            fraction_digits,
            requirement: Requirement::Lenient,
        }
    }

    /// Rendered width in bytes.
    #[must_use]
    pub const fn width(&self) -> usize {
        (self.integer_digits + self.fraction_digits) as usize
    }
}

/// Parse a cell into an exact decimal.
///
/// Comma and dot are both accepted as decimal separator. When both appear,
/// the one occurring last is the decimal separator and the other one is
/// treated as a thousands separator (`1.234,56` and `1,234.56` are equal).
/// Returns `None` for blank or unparseable input.
#[must_use]
pub fn parse_decimal(value: &CellValue) -> Option<Decimal> {
    match value {
        CellValue::Number(n) if n.is_finite() => Decimal::from_str(&n.to_string()).ok(),
        CellValue::Text(s) => parse_decimal_text(s),
        _ => None,
    }
}

fn parse_decimal_text(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|ch| ch.is_ascii_digit() || matches!(ch, ',' | '.' | '-'))
        .collect();
    if !cleaned.chars().any(|ch| ch.is_ascii_digit()) {
        return None;
    }
    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => cleaned.replace('.', "").replace(',', "."),
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };
    Decimal::from_str(&normalized).ok()
}

/// Scaled decimal field: truncated toward zero, no separator, zero-padded.
///
/// `format_decimal("1.999", 1 integer digit, 2 fraction digits)` is `"199"`.
pub fn format_decimal(value: &CellValue, spec: DecimalSpec, field: &str) -> Result<String> {
    if value.is_blank() {
        return match spec.requirement {
            Requirement::Mandatory => Err(FormatError::missing(field)),
            Requirement::Lenient => Ok("0".repeat(spec.width())),
        };
    }
    let Some(parsed) = parse_decimal(value) else {
        return match spec.requirement {
            Requirement::Mandatory => Err(FormatError::invalid_value(
                field,
                value.as_text(),
                "not a number",
            )),
            Requirement::Lenient => {
                warn!(field, "unparseable number rendered as zero");
                Ok("0".repeat(spec.width()))
            }
        };
    };
    render_decimal(parsed, spec, field)
}

/// Render an already computed decimal under the given field spec.
pub fn render_decimal(value: Decimal, spec: DecimalSpec, field: &str) -> Result<String> {
    let width = spec.width();
    if value.is_sign_negative() && !value.is_zero() {
        return match spec.requirement {
            Requirement::Mandatory => Err(FormatError::invalid_value(
                field,
                value.to_string(),
                "negative values are not allowed",
            )),
            Requirement::Lenient => {
                warn!(field, "negative number rendered as zero");
                Ok("0".repeat(width))
            }
        };
    }

    let mut truncated =
        value.round_dp_with_strategy(spec.fraction_digits, RoundingStrategy::ToZero);
    truncated.rescale(spec.fraction_digits);
    let digits = truncated.mantissa().unsigned_abs().to_string();

    if digits.len() > width {
        return match spec.requirement {
            Requirement::Mandatory => Err(FormatError::invalid_value(
                field,
                value.to_string(),
                format!("more than {} integer digits", spec.integer_digits),
            )),
            Requirement::Lenient => {
                warn!(field, width, "decimal field truncated to its rightmost digits");
                Ok(digits[digits.len() - width..].to_string())
            }
        };
    }
    Ok(format!("{digits:0>width$}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_text_pads_and_truncates() {
        assert_eq!(format_text("abc", 5), "abc  ");
        assert_eq!(format_text("abcdef", 3), "abc");
        assert_eq!(format_text("", 4), "    ");
    }

    #[test]
    fn test_format_text_strips_diacritics_and_controls() {
        assert_eq!(format_text("Ação\tSão", 9), "Acao Sao ");
        assert_eq!(format_text("a\r\nb", 4), "a  b");
    }

    #[test]
    fn test_format_text_non_latin_is_single_byte() {
        let field = format_text("€uro", 6);
        assert_eq!(field, "?uro  ");
        assert_eq!(field.len(), 6);
    }

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Empresa  Ção-Ltda. "), "EMPRESA CAO LTDA");
        assert_eq!(clean_text("***"), "");
    }

    #[test]
    fn test_format_digits() {
        assert_eq!(format_digits("12.345.678/0001-90", 14), "12345678000190");
        assert_eq!(format_digits("42", 5), "00042");
        assert_eq!(format_digits("", 3), "000");
        assert_eq!(format_digits("123456", 4), "3456");
    }

    #[test]
    fn test_format_digits_checked_rejects_overflow() {
        assert_eq!(format_digits_checked("0042", 4, "X").unwrap(), "0042");
        let err = format_digits_checked("123456", 4, "QTD").unwrap_err();
        assert!(matches!(err, FormatError::InvalidValue { .. }));
    }

    #[test]
    fn test_decimal_truncates_never_rounds() {
        let spec = DecimalSpec::mandatory(1, 2);
        assert_eq!(format_decimal(&"1.999".into(), spec, "X").unwrap(), "199");
        assert_eq!(format_decimal(&"1,999".into(), spec, "X").unwrap(), "199");
    }

    #[test]
    fn test_decimal_separators() {
        let spec = DecimalSpec::mandatory(10, 2);
        assert_eq!(
            format_decimal(&"1.234,56".into(), spec, "X").unwrap(),
            "000000123456"
        );
        assert_eq!(
            format_decimal(&"1,234.56".into(), spec, "X").unwrap(),
            "000000123456"
        );
        assert_eq!(
            format_decimal(&"R$ 10".into(), spec, "X").unwrap(),
            "000000001000"
        );
        assert_eq!(
            format_decimal(&CellValue::Number(2.5), spec, "X").unwrap(),
            "000000000250"
        );
    }

    #[test]
    fn test_decimal_policies_are_explicit() {
        let mandatory = DecimalSpec::mandatory(3, 2);
        let lenient = DecimalSpec::lenient(3, 2);

        assert!(matches!(
            format_decimal(&CellValue::Empty, mandatory, "TAXA"),
            Err(FormatError::MissingField { .. })
        ));
        assert!(matches!(
            format_decimal(&"-?".into(), mandatory, "TAXA"),
            Err(FormatError::InvalidValue { .. })
        ));
        assert_eq!(format_decimal(&CellValue::Empty, lenient, "PU").unwrap(), "00000");
        assert_eq!(format_decimal(&"abc".into(), lenient, "PU").unwrap(), "00000");
    }

    #[test]
    fn test_decimal_negative_and_overflow() {
        assert!(matches!(
            format_decimal(&"-1".into(), DecimalSpec::mandatory(3, 2), "X"),
            Err(FormatError::InvalidValue { .. })
        ));
        assert!(matches!(
            format_decimal(&"1000".into(), DecimalSpec::mandatory(3, 2), "X"),
            Err(FormatError::InvalidValue { .. })
        ));
        assert_eq!(
            format_decimal(&"1234.5".into(), DecimalSpec::lenient(3, 2), "X").unwrap(),
            "23450"
        );
    }
}
