//! Errors raised while locating or preparing workspace paths.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PathError {
    #[error("Cannot determine home directory")]
    NoHomeDir,

    /// Blank path argument.
    #[error("Path cannot be empty")]
    EmptyPath,

    #[error("{0} exists but is not a directory")]
    NotADirectory(PathBuf),

    #[error("Failed to create directory {path}: {reason}")]
    CreateFailed { path: PathBuf, reason: String },

    /// Probe file could not be written.
    #[error("Workspace directory {path} is not writable: {reason}")]
    NotWritable { path: PathBuf, reason: String },

    #[error("Cannot canonicalize workspace root {path}: {reason}")]
    Canonicalize { path: PathBuf, reason: String },

    /// Resolved path lies outside the workspace root.
    #[error("path escapes workspace: {path}")]
    EscapesWorkspace { path: PathBuf, root: PathBuf },
}

impl PathError {
    /// True when the input was bad, false when the environment was.
    pub const fn is_caller_error(&self) -> bool {
        matches!(self, Self::EmptyPath | Self::EscapesWorkspace { .. })
    }
}
