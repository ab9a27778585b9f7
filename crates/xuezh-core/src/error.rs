//! Closed error taxonomy shared by every component.
//!
//! Failures are constructed as [`XuezhError`] at the point they happen and
//! carry their own structured details. Adapters (CLI envelopes, logs) only
//! ever need [`XuezhError::kind`] and [`XuezhError::details`] to report them.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;

use crate::config::ConfigError;
use crate::paths::PathError;
use crate::ports::RepositoryError;

/// Maximum number of characters of captured stderr reported in error details.
pub const STDERR_EXCERPT_LIMIT: usize = 2000;

/// The closed set of error kinds reported to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    BackendFailed,
    AuthFailed,
    InvalidArgument,
    NotImplemented,
    NotFound,
    QuotaExceeded,
    ToolMissing,
}

impl ErrorKind {
    /// Wire name of the kind, e.g. `QUOTA_EXCEEDED`.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BackendFailed => "BACKEND_FAILED",
            Self::AuthFailed => "AUTH_FAILED",
            Self::InvalidArgument => "INVALID_ARGUMENT",
            Self::NotImplemented => "NOT_IMPLEMENTED",
            Self::NotFound => "NOT_FOUND",
            Self::QuotaExceeded => "QUOTA_EXCEEDED",
            Self::ToolMissing => "TOOL_MISSING",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a cloud speech service failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpeechFailure {
    /// Credentials missing or rejected.
    Auth,
    /// Rate limit or quota exhausted.
    Quota,
    /// Anything else: transport, parse, recognition status.
    Backend,
}

/// Errors produced anywhere in the voice assessment stack.
#[derive(Debug, Error)]
pub enum XuezhError {
    /// A required external tool is not installed or not on `PATH`.
    #[error("Required tool not found: {tool}")]
    ToolMissing { tool: String },

    /// An external tool ran and exited unsuccessfully.
    #[error("Command failed ({}): {}", .exit_code.map_or_else(|| "terminated".to_string(), |c| c.to_string()), .argv.join(" "))]
    ProcessFailed {
        argv: Vec<String>,
        exit_code: Option<i32>,
        stderr: String,
    },

    /// The cloud pronunciation service rejected or failed a request.
    #[error("{message}")]
    Speech {
        failure: SpeechFailure,
        message: String,
        details: Map<String, Value>,
    },

    /// Caller supplied an invalid value (unknown format, missing file, ...).
    #[error("{0}")]
    InvalidArgument(String),

    /// A requested entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The requested behavior is not available in this build.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Path resolution or workspace preparation failed.
    #[error(transparent)]
    Path(#[from] PathError),

    /// Configuration could not be read or parsed.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Filesystem operation failed.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Attempt persistence failed.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl XuezhError {
    /// Build a `map_err` adapter that attaches `path` to an I/O error.
    pub fn io(path: &Path) -> impl FnOnce(std::io::Error) -> Self + '_ {
        move |source| Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Shorthand for a cloud speech failure with details.
    pub fn speech(failure: SpeechFailure, message: impl Into<String>, details: Value) -> Self {
        let details = match details {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self::Speech {
            failure,
            message: message.into(),
            details,
        }
    }

    /// The taxonomy kind this error reports as.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ToolMissing { .. } => ErrorKind::ToolMissing,
            Self::Speech { failure, .. } => match failure {
                SpeechFailure::Auth => ErrorKind::AuthFailed,
                SpeechFailure::Quota => ErrorKind::QuotaExceeded,
                SpeechFailure::Backend => ErrorKind::BackendFailed,
            },
            Self::InvalidArgument(_) | Self::Config(_) => ErrorKind::InvalidArgument,
            Self::Path(err) => {
                if err.is_caller_error() {
                    ErrorKind::InvalidArgument
                } else {
                    ErrorKind::BackendFailed
                }
            }
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
            Self::ProcessFailed { .. } | Self::Io { .. } | Self::Json(_) | Self::Repository(_) => {
                ErrorKind::BackendFailed
            }
        }
    }

    /// Structured details describing the failure.
    pub fn details(&self) -> Map<String, Value> {
        let value = match self {
            Self::ToolMissing { tool } => json!({ "tool": tool }),
            Self::ProcessFailed {
                argv,
                exit_code,
                stderr,
            } => json!({
                "cmd": argv,
                "returncode": exit_code,
                "stderr": stderr_excerpt(stderr),
            }),
            Self::Speech { details, .. } => Value::Object(details.clone()),
            Self::Path(PathError::EscapesWorkspace { path, root }) => json!({
                "path": path.display().to_string(),
                "workspace": root.display().to_string(),
            }),
            Self::Io { path, source } => json!({
                "path": path.display().to_string(),
                "error": source.to_string(),
            }),
            _ => Value::Null,
        };
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// Trim captured stderr and cap it at [`STDERR_EXCERPT_LIMIT`] characters.
pub fn stderr_excerpt(stderr: &str) -> String {
    stderr.trim().chars().take(STDERR_EXCERPT_LIMIT).collect()
}
