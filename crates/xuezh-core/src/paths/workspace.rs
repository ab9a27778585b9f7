//! Workspace root discovery and confined path resolution.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use super::ensure::{ensure_directory, verify_writable};
use super::error::PathError;
use super::platform::{canonicalize_existing_prefix, clean, expand_home};

/// Environment variable overriding the workspace root.
pub const WORKSPACE_DIR_ENV: &str = "XUEZH_WORKSPACE_DIR";

/// Environment variable overriding the database location.
pub const DB_PATH_ENV: &str = "XUEZH_DB_PATH";

/// Subdirectories created inside every workspace.
pub const WORKSPACE_SUBDIRS: [&str; 4] = ["artifacts", "cache", "exports", "backups"];

const DEFAULT_WORKSPACE_RELATIVE: &str = ".clawdbot/workspace/xuezh";
const DEFAULT_DB_FILE: &str = "db.sqlite3";

/// Compute the workspace root without touching the filesystem.
///
/// Resolution order:
/// 1. `XUEZH_WORKSPACE_DIR` (with `~` expansion)
/// 2. `~/.clawdbot/workspace/xuezh`
pub fn workspace_dir(env: impl Fn(&str) -> Option<String>) -> Result<PathBuf, PathError> {
    if let Some(value) = env(WORKSPACE_DIR_ENV).filter(|v| !v.trim().is_empty()) {
        return expand_home(&value);
    }
    let home = dirs::home_dir().ok_or(PathError::NoHomeDir)?;
    Ok(home.join(DEFAULT_WORKSPACE_RELATIVE))
}

/// Database location computed without preparing the workspace.
///
/// Used by diagnostics. Confinement is only enforced by
/// [`Workspace::database_path`].
pub fn database_path_hint(env: impl Fn(&str) -> Option<String>) -> Result<PathBuf, PathError> {
    let root = workspace_dir(&env)?;
    match env(DB_PATH_ENV).filter(|v| !v.trim().is_empty()) {
        Some(value) => {
            let expanded = expand_home(&value)?;
            Ok(clean(&root.join(expanded)))
        }
        None => Ok(root.join(DEFAULT_DB_FILE)),
    }
}

/// A prepared workspace root. Every path handed out is confined to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Create the workspace tree at `root` and canonicalize it.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, PathError> {
        let root = root.as_ref();
        ensure_directory(root)?;
        for sub in WORKSPACE_SUBDIRS {
            ensure_directory(&root.join(sub))?;
        }
        verify_writable(&root.join("artifacts"))?;
        let root = root.canonicalize().map_err(|e| PathError::Canonicalize {
            path: root.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!(root = %root.display(), "Workspace ready");
        Ok(Self { root })
    }

    /// Discover the workspace root from the environment and prepare it.
    pub fn from_env(env: impl Fn(&str) -> Option<String>) -> Result<Self, PathError> {
        Self::open(workspace_dir(env)?)
    }

    /// Canonical workspace root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding all artifacts.
    pub fn artifacts_dir(&self) -> PathBuf {
        self.root.join("artifacts")
    }

    /// Resolve a user-supplied path inside the workspace.
    ///
    /// `~` is expanded, relative paths are joined onto the root and `.`/`..`
    /// segments are removed. Symlinks are then resolved on the existing
    /// portion, so a link inside the workspace cannot lead out of it.
    /// Anything landing outside the root is rejected.
    pub fn resolve(&self, raw: &str) -> Result<PathBuf, PathError> {
        let expanded = expand_home(raw)?;
        let cleaned = if expanded.is_absolute() {
            clean(&expanded)
        } else {
            clean(&self.root.join(expanded))
        };
        let candidate = canonicalize_existing_prefix(&cleaned).unwrap_or(cleaned);

        if candidate.starts_with(&self.root) {
            Ok(candidate)
        } else {
            Err(PathError::EscapesWorkspace {
                path: candidate,
                root: self.root.clone(),
            })
        }
    }

    /// Workspace-relative, `/`-separated form of a path under the root.
    pub fn relative(&self, path: &Path) -> Result<String, PathError> {
        let rel = path
            .strip_prefix(&self.root)
            .map_err(|_| PathError::EscapesWorkspace {
                path: path.to_path_buf(),
                root: self.root.clone(),
            })?;
        let parts: Vec<String> = rel
            .components()
            .filter_map(|c| match c {
                Component::Normal(part) => Some(part.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();
        Ok(parts.join("/"))
    }

    /// Database file location.
    ///
    /// Resolution order:
    /// 1. `XUEZH_DB_PATH`, which must stay inside the workspace
    /// 2. `<workspace>/db.sqlite3`
    pub fn database_path(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<PathBuf, PathError> {
        match env(DB_PATH_ENV).filter(|v| !v.trim().is_empty()) {
            Some(value) => self.resolve(&value),
            None => Ok(self.root.join(DEFAULT_DB_FILE)),
        }
    }
}
