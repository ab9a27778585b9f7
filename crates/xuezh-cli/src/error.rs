//! CLI error type and its mapping from core failures.
//!
//! Every failure ends up as a [`CliError`] carrying the taxonomy kind, a
//! message and structured details, ready to be placed in the envelope.

use serde_json::{Map, Value};
use thiserror::Error;

use xuezh_core::{ErrorKind, XuezhError};

/// A failure reported in the error envelope.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct CliError {
    pub kind: ErrorKind,
    pub message: String,
    pub details: Map<String, Value>,
}

impl CliError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            details: Map::new(),
        }
    }

    /// Caller error with the offending inputs attached.
    pub fn invalid_argument(message: impl Into<String>, inputs: Value) -> Self {
        Self::new(ErrorKind::InvalidArgument, message).with_details(inputs)
    }

    /// Merge `extra` into the details; existing keys are kept.
    #[must_use]
    pub fn with_details(mut self, extra: Value) -> Self {
        if let Value::Object(extra) = extra {
            for (key, value) in extra {
                self.details.entry(key).or_insert(value);
            }
        }
        self
    }

    /// Map a core failure raised while running `stage`.
    ///
    /// Tool failures get a stage message instead of the raw command line;
    /// everything else keeps its own message. The command's inputs are
    /// merged under the error's own details.
    pub fn from_core(err: &XuezhError, stage: &str, inputs: Value) -> Self {
        let message = match err {
            XuezhError::ProcessFailed { .. } => format!("audio backend failed during {stage}"),
            other => other.to_string(),
        };
        Self {
            kind: err.kind(),
            message,
            details: err.details(),
        }
        .with_details(inputs)
    }
}

impl From<XuezhError> for CliError {
    fn from(err: XuezhError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            details: err.details(),
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast::<XuezhError>() {
            Ok(core) => core.into(),
            Err(other) => Self::new(ErrorKind::BackendFailed, format!("{other:#}")),
        }
    }
}
