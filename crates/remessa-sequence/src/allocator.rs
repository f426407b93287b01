//! The daily sequence allocator.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::NaiveDate;

use crate::error::{Result, SequenceError};
use crate::lock::LockGuard;
use crate::state::{SequenceState, read_state, remove_state, write_state};

/// State file name, shared with the other converters writing to the same directory.
pub const STATE_FILENAME: &str = ".meu_numero_state.json";
/// Lock marker next to the state file.
pub const LOCK_FILENAME: &str = ".meu_numero_state.lock";
/// Largest number a day can reach (10 digits).
pub const MAX_SEQUENCE: u64 = 9_999_999_999;

/// Render a sequence number as the 10-digit field used in records.
#[must_use]
pub fn format_sequence(number: u64) -> String {
    format!("{number:010}")
}

/// Lock polling options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorOptions {
    /// Give up acquiring the lock after this long.
    pub lock_timeout: Duration,
    /// Sleep between acquisition attempts.
    pub poll_interval: Duration,
}

impl Default for AllocatorOptions {
    fn default() -> Self {
        Self {
            lock_timeout: Duration::from_secs(5),
            poll_interval: Duration::from_millis(50),
        }
    }
}

/// Hands out unique, contiguous per-day sequence numbers.
///
/// Every mutation happens under an exclusive lock file and is persisted with
/// an atomic replace, so concurrent processes sharing the directory never
/// receive overlapping numbers and a crash never leaves a half-written state.
#[derive(Debug, Clone)]
pub struct SequenceAllocator {
    dir: PathBuf,
    options: AllocatorOptions,
}

impl SequenceAllocator {
    /// Allocator over `dir` with default options; the directory is created if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::with_options(dir, AllocatorOptions::default())
    }

    pub fn with_options(dir: impl Into<PathBuf>, options: AllocatorOptions) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| SequenceError::io("create directory", &dir, e))?;
        Ok(Self { dir, options })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn state_path(&self) -> PathBuf {
        self.dir.join(STATE_FILENAME)
    }

    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.dir.join(LOCK_FILENAME)
    }

    fn lock(&self) -> Result<LockGuard> {
        LockGuard::acquire(
            &self.lock_path(),
            self.options.lock_timeout,
            self.options.poll_interval,
        )
    }

    /// Reserve `count` numbers for `day` and return them zero-padded.
    ///
    /// The numbers continue from the last one issued for that day.
    /// `count == 0` returns an empty list without touching the lock.
    pub fn allocate(&self, day: &str, count: u64) -> Result<Vec<String>> {
        validate_day(day)?;
        if count == 0 {
            return Ok(Vec::new());
        }

        let _guard = self.lock()?;
        let path = self.state_path();
        let mut state = read_state(&path)?;
        let last = state.get(day).copied().unwrap_or(0);
        let new_last = last
            .checked_add(count)
            .filter(|n| *n <= MAX_SEQUENCE)
            .ok_or_else(|| SequenceError::Overflow {
                day: day.to_string(),
                last,
                requested: count,
            })?;
        state.insert(day.to_string(), new_last);
        write_state(&path, &state)?;

        tracing::info!(day, first = last + 1, last = new_last, "allocated sequence numbers");
        Ok((last + 1..=new_last).map(format_sequence).collect())
    }

    /// Set the day's counter back to zero.
    pub fn reset(&self, day: &str) -> Result<()> {
        validate_day(day)?;
        let _guard = self.lock()?;
        let path = self.state_path();
        let mut state = read_state(&path)?;
        state.insert(day.to_string(), 0);
        write_state(&path, &state)?;
        tracing::info!(day, "sequence counter reset");
        Ok(())
    }

    /// Remove the state for every day.
    pub fn clear(&self) -> Result<()> {
        let _guard = self.lock()?;
        remove_state(&self.state_path())?;
        tracing::info!(dir = %self.dir.display(), "sequence state cleared");
        Ok(())
    }

    /// Last number issued for `day` (0 when none).
    pub fn last_issued(&self, day: &str) -> Result<u64> {
        validate_day(day)?;
        let _guard = self.lock()?;
        Ok(read_state(&self.state_path())?
            .get(day)
            .copied()
            .unwrap_or(0))
    }

    /// Copy of the full state, read under the lock.
    pub fn snapshot(&self) -> Result<SequenceState> {
        let _guard = self.lock()?;
        read_state(&self.state_path())
    }
}

/// Accept only calendar-valid `YYYYMMDD` keys.
fn validate_day(day: &str) -> Result<()> {
    let well_formed = day.len() == 8
        && day.bytes().all(|b| b.is_ascii_digit())
        && NaiveDate::parse_from_str(day, "%Y%m%d").is_ok();
    if well_formed {
        Ok(())
    } else {
        Err(SequenceError::InvalidDay {
            day: day.to_string(),
        })
    }
}
