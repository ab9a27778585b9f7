//! Command handlers.
//!
//! Each handler validates its required inputs, composes what it needs from
//! the [`CliConfig`] and returns either a [`CommandOutput`] or a
//! [`CliError`] whose details already include the command's inputs.

mod convert;
mod doctor;
mod process_voice;
mod stt;
mod tts;
mod version;

use serde_json::{Map, Value};

use crate::bootstrap::CliConfig;
use crate::commands::{AudioCommands, Commands};
use crate::envelope::CommandOutput;
use crate::error::CliError;

pub use convert::handle as convert;
pub use doctor::handle as doctor;
pub use process_voice::handle as process_voice;
pub use stt::handle as stt;
pub use tts::handle as tts;
pub use version::handle as version;

/// Route a parsed command to its handler.
pub async fn dispatch(command: &Commands, config: &CliConfig) -> Result<CommandOutput, CliError> {
    match command {
        Commands::Audio { command } => match command {
            AudioCommands::Convert {
                input,
                out,
                format,
                backend,
            } => {
                convert(
                    config,
                    input.as_deref(),
                    out.as_deref(),
                    format.as_deref(),
                    backend.as_deref(),
                )
                .await
            }
            AudioCommands::Tts {
                text,
                out,
                voice,
                backend,
            } => tts(config, text.as_deref(), out.as_deref(), voice, backend.as_deref()).await,
            AudioCommands::Stt {
                input,
                backend,
                max_bytes,
            } => stt(config, input.as_deref(), backend.as_deref(), *max_bytes).await,
            AudioCommands::ProcessVoice {
                input,
                ref_text,
                backend,
                item_id,
            } => {
                process_voice(
                    config,
                    input.as_deref(),
                    ref_text.as_deref(),
                    backend.as_deref(),
                    item_id.as_deref(),
                )
                .await
            }
        },
        Commands::Doctor => doctor(config).await,
        Commands::Version => Ok(version()),
    }
}

/// A present, non-blank value.
fn required(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Command inputs as reported in error details; absent values are `""`.
fn inputs(pairs: &[(&str, Option<&str>)]) -> Value {
    let map: Map<String, Value> = pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), Value::from(value.unwrap_or_default())))
        .collect();
    Value::Object(map)
}
