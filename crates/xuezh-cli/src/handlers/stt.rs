//! `audio stt`: transcribe a recording, spilling large transcripts.

use serde_json::{Map, json};

use xuezh_core::budget::spill_if_needed;
use xuezh_core::{AudioCommand, SttBackend, Transcriber, XuezhError};
use xuezh_runtime::WhisperTranscriber;

use super::{inputs, required};
use crate::bootstrap::{CliConfig, bootstrap};
use crate::envelope::CommandOutput;
use crate::error::CliError;

pub async fn handle(
    config: &CliConfig,
    input: Option<&str>,
    backend: Option<&str>,
    max_bytes: Option<usize>,
) -> Result<CommandOutput, CliError> {
    let Some(input) = required(input) else {
        return Err(CliError::invalid_argument(
            "in is required",
            inputs(&[("in", input)]),
        ));
    };

    let backend_id = config.backend(AudioCommand::Stt, backend);
    let details = inputs(&[("in", Some(input)), ("backend", Some(backend_id.as_str()))]);
    let fail = |err: XuezhError| CliError::from_core(&err, "transcription", details.clone());

    let backend = backend_id.parse::<SttBackend>().map_err(fail)?;
    let max_bytes = max_bytes
        .filter(|b| *b > 0)
        .unwrap_or_else(|| config.inline_max_bytes());
    let ctx = bootstrap(config)
        .await
        .map_err(|e| CliError::from(e).with_details(details.clone()))?;

    let transcriber = WhisperTranscriber::new(ctx.runner().clone(), ctx.store().clone());
    let transcription = transcriber.transcribe(input).await.map_err(fail)?;

    let payload = json!({
        "in": transcription.input.display().to_string(),
        "backend": backend.descriptor(),
        "transcript": transcription.transcript,
    });
    let spilled = spill_if_needed(ctx.store(), &payload, max_bytes, "stt")
        .await
        .map_err(fail)?;

    let mut artifacts = vec![transcription.artifact];
    artifacts.extend(spilled.artifacts);
    let output = CommandOutput::data(spilled.data).with_artifacts(artifacts);
    if spilled.truncated {
        let mut limits = Map::new();
        limits.insert("inline_bytes_max".to_string(), json!(max_bytes));
        return Ok(output.truncated(limits));
    }
    Ok(output)
}
