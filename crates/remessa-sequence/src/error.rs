//! Allocator error types.

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Sequence allocator error.
#[derive(Debug, Error)]
pub enum SequenceError {
    /// The lock file was held by someone else for longer than the timeout.
    #[error("Timed out after {waited:?} waiting for sequence lock {path}")]
    LockTimeout { path: PathBuf, waited: Duration },

    /// The day's counter would pass the 10-digit limit.
    #[error("Daily sequence limit exceeded for {day}: {last} issued, {requested} requested")]
    Overflow {
        day: String,
        last: u64,
        requested: u64,
    },

    /// The day key is not a valid `YYYYMMDD` date.
    #[error("Invalid day '{day}' (expected YYYYMMDD)")]
    InvalidDay { day: String },

    /// File I/O error.
    #[error("Failed to {operation} file: {path}")]
    Io {
        operation: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Serialization error.
    #[error("Failed to serialize sequence state")]
    Serialization {
        #[source]
        source: serde_json::Error,
    },

    /// Atomic write failed (temp file couldn't be renamed).
    #[error("Failed to replace sequence state {target_path}")]
    AtomicWriteFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SequenceError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Get a suggestion for how to resolve this error.
    pub fn suggestion(&self) -> Option<String> {
        match self {
            Self::LockTimeout { path, .. } => Some(format!(
                "Another converter may be running. If none is, delete the stale lock {}",
                path.display()
            )),
            Self::Overflow { .. } => {
                Some("Reset the day's counter only if its previous files were discarded.".into())
            }
            Self::InvalidDay { .. } => Some("Use an 8-digit date such as 20250903.".into()),
            Self::Io { .. } | Self::AtomicWriteFailed { .. } => {
                Some("Check that you have permission to write to the state directory.".into())
            }
            Self::Serialization { .. } => None,
        }
    }
}

/// Result type alias for allocator operations.
pub type Result<T> = std::result::Result<T, SequenceError>;
