//! JSON response envelope.
//!
//! Every invocation prints exactly one envelope. Success:
//! `{ok, schema_version, command, data, artifacts, truncated, limits}`;
//! failure: `{ok, schema_version, command, error: {type, message, details}}`.

use serde::Serialize;
use serde_json::{Map, Value};

use xuezh_core::{Artifact, ErrorKind};

use crate::error::CliError;

/// Envelope format version.
pub const SCHEMA_VERSION: &str = "1";

/// What a successful handler produced.
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub data: Value,
    pub artifacts: Vec<Artifact>,
    pub truncated: bool,
    pub limits: Map<String, Value>,
}

impl CommandOutput {
    /// Output with data only.
    pub fn data(data: Value) -> Self {
        Self {
            data,
            artifacts: Vec::new(),
            truncated: false,
            limits: Map::new(),
        }
    }

    #[must_use]
    pub fn with_artifacts(mut self, artifacts: Vec<Artifact>) -> Self {
        self.artifacts = artifacts;
        self
    }

    /// Mark the payload as truncated under `limits`.
    #[must_use]
    pub fn truncated(mut self, limits: Map<String, Value>) -> Self {
        self.truncated = true;
        self.limits = limits;
        self
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub message: String,
    pub details: Map<String, Value>,
}

/// Top-level output document.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Ok {
        ok: bool,
        schema_version: &'static str,
        command: String,
        data: Value,
        artifacts: Vec<Artifact>,
        truncated: bool,
        limits: Map<String, Value>,
    },
    Err {
        ok: bool,
        schema_version: &'static str,
        command: String,
        error: ErrorBody,
    },
}

impl Envelope {
    pub fn success(command: &str, output: CommandOutput) -> Self {
        Self::Ok {
            ok: true,
            schema_version: SCHEMA_VERSION,
            command: command.to_string(),
            data: output.data,
            artifacts: output.artifacts,
            truncated: output.truncated,
            limits: output.limits,
        }
    }

    pub fn failure(command: &str, error: CliError) -> Self {
        Self::Err {
            ok: false,
            schema_version: SCHEMA_VERSION,
            command: command.to_string(),
            error: ErrorBody {
                kind: error.kind,
                message: error.message,
                details: error.details,
            },
        }
    }

    /// Build from a handler result.
    pub fn from_result(command: &str, result: Result<CommandOutput, CliError>) -> Self {
        match result {
            Ok(output) => Self::success(command, output),
            Err(error) => Self::failure(command, error),
        }
    }

    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok { .. })
    }

    /// Process exit code for this envelope.
    pub const fn exit_code(&self) -> i32 {
        if self.is_ok() { 0 } else { 1 }
    }

    /// Pretty JSON with a trailing newline.
    pub fn render(&self) -> serde_json::Result<String> {
        let mut text = serde_json::to_string_pretty(self)?;
        text.push('\n');
        Ok(text)
    }
}
