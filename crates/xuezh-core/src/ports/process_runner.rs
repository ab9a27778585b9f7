//! Process runner trait definition.
//!
//! This port runs external command-line tools to completion. It never
//! retries and applies no timeout.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::XuezhError;

/// Captured result of a successful command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was terminated by a signal.
    pub exit_code: Option<i32>,
}

/// Runs external tools.
///
/// # Design Rules
///
/// - A tool that cannot be found is `XuezhError::ToolMissing`
/// - A tool that ran and exited non-zero is `XuezhError::ProcessFailed`,
///   never a successful [`ProcessOutput`]
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Locate `tool` on `PATH`.
    async fn ensure_tool(&self, tool: &str) -> Result<PathBuf, XuezhError>;

    /// Run `argv` (program first) and wait for it to finish.
    async fn run(&self, argv: &[String]) -> Result<ProcessOutput, XuezhError>;
}
