//! Error types for record formatting.

use thiserror::Error;

/// Errors raised while turning a row into a fixed-width record.
///
/// Every data error names the logical field it came from. The batch driver
/// adds the row number before surfacing it to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    /// A value cannot be interpreted under its formatting rule.
    #[error("{field}: invalid value '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    /// No date strategy produced a calendar-valid date, or the dates are out of order.
    #[error("{field}: invalid date '{value}' ({reason})")]
    InvalidDate {
        field: String,
        value: String,
        reason: String,
    },

    /// A mandatory field was absent or blank.
    #[error("{field} is required")]
    MissingField { field: String },

    /// A composed record does not have its declared length.
    ///
    /// This is a formatter bug, never a data problem.
    #[error(
        "internal error: {record} field {field} rendered {actual} bytes, layout declares {expected}"
    )]
    RecordLengthMismatch {
        record: &'static str,
        field: String,
        expected: usize,
        actual: usize,
    },
}

/// Result type for formatting operations.
pub type Result<T> = std::result::Result<T, FormatError>;

impl FormatError {
    /// Create an InvalidValue error.
    pub fn invalid_value(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidValue {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidDate error.
    pub fn invalid_date(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidDate {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Whether this error signals a bug in the formatter rather than bad input.
    #[must_use]
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::RecordLengthMismatch { .. })
    }

    /// The logical field this error refers to.
    #[must_use]
    pub fn field(&self) -> &str {
        match self {
            Self::InvalidValue { field, .. }
            | Self::InvalidDate { field, .. }
            | Self::MissingField { field }
            | Self::RecordLengthMismatch { field, .. } => field,
        }
    }
}
