//! Cross-process lock based on exclusive file creation.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::{Result, SequenceError};

/// Holds the lock file for as long as it lives; dropping it releases the lock.
#[derive(Debug)]
pub(crate) struct LockGuard {
    path: PathBuf,
}

impl LockGuard {
    /// Create `path` exclusively, polling every `poll` until `timeout` elapses.
    pub(crate) fn acquire(path: &Path, timeout: Duration, poll: Duration) -> Result<Self> {
        let start = Instant::now();
        loop {
            match OpenOptions::new().write(true).create_new(true).open(path) {
                Ok(mut file) => {
                    // The PID is only a hint for operators clearing stale locks.
                    if let Err(e) = writeln!(file, "{}", std::process::id()) {
                        tracing::debug!(path = %path.display(), error = %e, "could not write lock owner");
                    }
                    tracing::trace!(path = %path.display(), "sequence lock acquired");
                    return Ok(Self {
                        path: path.to_path_buf(),
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let waited = start.elapsed();
                    if waited >= timeout {
                        return Err(SequenceError::LockTimeout {
                            path: path.to_path_buf(),
                            waited,
                        });
                    }
                    thread::sleep(poll);
                }
                Err(e) => return Err(SequenceError::io("create lock", path, e)),
            }
        }
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        match fs::remove_file(&self.path) {
            Ok(()) => tracing::trace!(path = %self.path.display(), "sequence lock released"),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to release sequence lock");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_guard_removes_lock_on_drop() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.lock");
        {
            let _guard =
                LockGuard::acquire(&path, Duration::from_millis(100), Duration::from_millis(5))
                    .unwrap();
            assert!(path.exists());
        }
        assert!(!path.exists());
    }

    #[test]
    fn test_held_lock_times_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("x.lock");
        let _held =
            LockGuard::acquire(&path, Duration::from_millis(100), Duration::from_millis(5)).unwrap();
        let err = LockGuard::acquire(&path, Duration::from_millis(30), Duration::from_millis(5))
            .unwrap_err();
        assert!(matches!(err, SequenceError::LockTimeout { .. }));
    }
}
