//! CLI entry point.
//!
//! Parses arguments, loads configuration, dispatches to a handler and prints
//! exactly one JSON envelope on stdout. Logs go to stderr.

use std::io::Write;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use xuezh_cli::{Cli, CliConfig, CliError, Envelope, handlers};

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let command = cli.command.name();
    let result = match CliConfig::from_process() {
        Ok(config) => handlers::dispatch(&cli.command, &config).await,
        Err(e) => Err(CliError::from(e)),
    };
    let envelope = Envelope::from_result(command, result);

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(envelope.render()?.as_bytes())?;
    stdout.flush()?;

    if !envelope.is_ok() {
        std::process::exit(envelope.exit_code());
    }
    Ok(())
}
