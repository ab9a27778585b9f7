//! Home expansion and lexical path cleanup.
//!
//! Private helpers; the public API is exposed through sibling modules.

use std::ffi::OsStr;
use std::path::{Component, Path, PathBuf};

use super::error::PathError;

/// Expand a leading `~` in a user-provided path.
///
/// Relative paths stay relative; the caller decides what they are relative to.
pub fn expand_home(raw: &str) -> Result<PathBuf, PathError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PathError::EmptyPath);
    }

    if trimmed == "~" {
        return dirs::home_dir().ok_or(PathError::NoHomeDir);
    }

    if let Some(rest) = trimmed
        .strip_prefix("~/")
        .or_else(|| trimmed.strip_prefix("~\\"))
    {
        let home = dirs::home_dir().ok_or(PathError::NoHomeDir)?;
        return Ok(home.join(rest));
    }

    Ok(PathBuf::from(trimmed))
}

/// Lexically normalize `.` and `..` components without touching the disk.
pub(super) fn clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match out.components().next_back() {
                Some(Component::Normal(_)) => {
                    out.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => out.push(".."),
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Canonicalize the longest existing prefix of `path` and re-append the rest.
///
/// Resolves symlinks on whatever part of the path already exists, so a file
/// that is about to be created still compares correctly against a
/// canonical workspace root.
pub(super) fn canonicalize_existing_prefix(path: &Path) -> Option<PathBuf> {
    let mut existing = path;
    let mut tail: Vec<&OsStr> = Vec::new();
    loop {
        if let Ok(canonical) = existing.canonicalize() {
            return Some(
                tail.iter()
                    .rev()
                    .fold(canonical, |acc, part| acc.join(part)),
            );
        }
        tail.push(existing.file_name()?);
        existing = existing.parent()?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_dot_segments() {
        assert_eq!(clean(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(clean(Path::new("/../x")), PathBuf::from("/x"));
        assert_eq!(clean(Path::new("../x")), PathBuf::from("../x"));
    }

    #[test]
    fn test_expand_home_rejects_empty() {
        assert!(matches!(expand_home("   "), Err(PathError::EmptyPath)));
    }

    #[test]
    fn test_expand_home_leaves_plain_paths() {
        assert_eq!(expand_home("notes/a.txt").unwrap(), PathBuf::from("notes/a.txt"));
        assert_eq!(expand_home("/abs/x").unwrap(), PathBuf::from("/abs/x"));
    }

    #[test]
    fn test_expand_home_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~").unwrap(), home);
            assert_eq!(expand_home("~/a/b").unwrap(), home.join("a/b"));
        }
    }

    #[test]
    fn test_canonicalize_existing_prefix_keeps_missing_tail() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("missing/child.wav");
        let resolved = canonicalize_existing_prefix(&target).unwrap();
        assert_eq!(
            resolved,
            dir.path().canonicalize().unwrap().join("missing/child.wav")
        );
    }
}
