//! Process runner backed by `tokio::process`.

use std::io::ErrorKind;
use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use xuezh_core::{ProcessOutput, ProcessRunner, XuezhError};

/// Runs tools found on `PATH`, capturing their output.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemProcessRunner;

impl SystemProcessRunner {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProcessRunner for SystemProcessRunner {
    async fn ensure_tool(&self, tool: &str) -> Result<PathBuf, XuezhError> {
        which::which(tool).map_err(|e| {
            debug!(tool, error = %e, "Tool lookup failed");
            XuezhError::ToolMissing {
                tool: tool.to_string(),
            }
        })
    }

    async fn run(&self, argv: &[String]) -> Result<ProcessOutput, XuezhError> {
        let Some((program, args)) = argv.split_first() else {
            return Err(XuezhError::InvalidArgument("empty command".to_string()));
        };
        debug!(cmd = %argv.join(" "), "Running external tool");

        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| {
                if e.kind() == ErrorKind::NotFound {
                    XuezhError::ToolMissing {
                        tool: program.clone(),
                    }
                } else {
                    XuezhError::ProcessFailed {
                        argv: argv.to_vec(),
                        exit_code: None,
                        stderr: e.to_string(),
                    }
                }
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let exit_code = output.status.code();

        if !output.status.success() {
            warn!(program = %program, ?exit_code, "External tool failed");
            return Err(XuezhError::ProcessFailed {
                argv: argv.to_vec(),
                exit_code,
                stderr,
            });
        }

        Ok(ProcessOutput {
            stdout,
            stderr,
            exit_code,
        })
    }
}
