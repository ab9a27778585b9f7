//! Directory creation and writability checks for the workspace tree.

use std::fs;
use std::path::Path;

use super::error::PathError;

/// Create `path` and its parents unless it already is a directory.
pub fn ensure_directory(path: &Path) -> Result<(), PathError> {
    if path.exists() {
        if !path.is_dir() {
            return Err(PathError::NotADirectory(path.to_path_buf()));
        }
        return Ok(());
    }

    fs::create_dir_all(path).map_err(|e| PathError::CreateFailed {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

const WRITE_PROBE: &str = ".xuezh_write_test";

/// Check that files can be created in `dir` by writing and removing a probe.
pub fn verify_writable(dir: &Path) -> Result<(), PathError> {
    let probe = dir.join(WRITE_PROBE);
    let not_writable = |e: std::io::Error| PathError::NotWritable {
        path: dir.to_path_buf(),
        reason: e.to_string(),
    };
    fs::write(&probe, b"ok").map_err(not_writable)?;
    fs::remove_file(&probe).map_err(not_writable)
}
