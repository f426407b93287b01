//! On-disk sequence state: a JSON object mapping `YYYYMMDD` to the last issued number.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::Path;

use crate::error::{Result, SequenceError};

/// Highest number issued per day.
pub type SequenceState = BTreeMap<String, u64>;

/// Read the state file.
///
/// A missing file is an empty state. A file that does not parse is renamed
/// to `<name>.bak` and also treated as empty.
pub(crate) fn read_state(path: &Path) -> Result<SequenceState> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(SequenceState::new()),
        Err(e) => return Err(SequenceError::io("read", path, e)),
    };

    match serde_json::from_str(&text) {
        Ok(state) => Ok(state),
        Err(e) => {
            let mut backup = path.as_os_str().to_owned();
            backup.push(".bak");
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "sequence state is corrupt, moving it aside and starting empty"
            );
            fs::rename(path, &backup).map_err(|e| SequenceError::io("back up", path, e))?;
            Ok(SequenceState::new())
        }
    }
}

/// Replace the state file atomically (temp file, fsync, rename).
///
/// The temp file is removed when any step fails.
pub(crate) fn write_state(path: &Path, state: &SequenceState) -> Result<()> {
    let bytes =
        serde_json::to_vec(state).map_err(|e| SequenceError::Serialization { source: e })?;
    let temp_path = path.with_extension("json.tmp");

    let result = replace_with_temp(path, &temp_path, &bytes);
    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }
    result
}

fn replace_with_temp(path: &Path, temp_path: &Path, bytes: &[u8]) -> Result<()> {
    let mut file =
        File::create(temp_path).map_err(|e| SequenceError::io("create", temp_path, e))?;
    file.write_all(bytes)
        .map_err(|e| SequenceError::io("write", temp_path, e))?;
    file.sync_all()
        .map_err(|e| SequenceError::io("sync", temp_path, e))?;
    drop(file);

    fs::rename(temp_path, path).map_err(|e| SequenceError::AtomicWriteFailed {
        temp_path: temp_path.to_path_buf(),
        target_path: path.to_path_buf(),
        source: e,
    })
}

/// Delete the state file; a missing file is not an error.
pub(crate) fn remove_state(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(SequenceError::io("delete", path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let state = read_state(&dir.path().join("state.json")).unwrap();
        assert!(state.is_empty());
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        let mut state = SequenceState::new();
        state.insert("20250903".to_string(), 12);
        write_state(&path, &state).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"20250903":12}"#);
        assert_eq!(read_state(&path).unwrap(), state);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        // A non-empty directory in the way makes the rename fail.
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        let err = write_state(&path, &SequenceState::new()).unwrap_err();
        assert!(matches!(err, SequenceError::AtomicWriteFailed { .. }), "{err}");
        assert!(!path.with_extension("json.tmp").exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn test_corrupt_file_is_backed_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, "{not json").unwrap();

        assert!(read_state(&path).unwrap().is_empty());
        assert!(!path.exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("state.json.bak")).unwrap(),
            "{not json"
        );
    }
}
