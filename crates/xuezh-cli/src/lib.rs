//! The `xuezh` command-line adapter.
//!
//! Parses arguments, composes the runtime adapters and prints one JSON
//! envelope per invocation on stdout.

#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Used only by the binary target
use dotenvy as _;
use tokio as _;
use tracing_subscriber as _;

#[cfg(test)]
use async_trait as _;
#[cfg(test)]
use tempfile as _;

pub mod bootstrap;
pub mod commands;
pub mod envelope;
pub mod error;
pub mod handlers;
pub mod parser;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{AudioCommands, Commands};
pub use envelope::{CommandOutput, Envelope};
pub use error::CliError;
pub use parser::Cli;
