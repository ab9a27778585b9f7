//! `audio process-voice`: the full assessment pipeline.

use std::sync::Arc;

use serde_json::Value;

use xuezh_core::{
    AudioCommand, VoiceAssessmentPipeline, VoiceBackend, VoicePorts, VoiceRequest, XuezhError,
};
use xuezh_runtime::{AzureSpeechAssessor, EdgeTtsSynthesizer, FfmpegConverter, WhisperTranscriber};

use super::{inputs, required};
use crate::bootstrap::{CliConfig, bootstrap};
use crate::envelope::CommandOutput;
use crate::error::CliError;

pub async fn handle(
    config: &CliConfig,
    input: Option<&str>,
    ref_text: Option<&str>,
    backend: Option<&str>,
    item_id: Option<&str>,
) -> Result<CommandOutput, CliError> {
    let (Some(input), Some(ref_text)) = (required(input), required(ref_text)) else {
        return Err(CliError::invalid_argument(
            "in and ref-text are required",
            inputs(&[("in", input), ("ref_text", ref_text)]),
        ));
    };

    let backend_id = config.backend(AudioCommand::ProcessVoice, backend);
    let details = inputs(&[
        ("ref_text", Some(ref_text)),
        ("in", Some(input)),
        ("backend", Some(backend_id.as_str())),
    ]);
    let fail = |err: XuezhError| CliError::from_core(&err, "voice processing", details.clone());
    let with_inputs = |err: anyhow::Error| CliError::from(err).with_details(details.clone());

    let backend = backend_id.parse::<VoiceBackend>().map_err(fail)?;
    let ctx = bootstrap(config).await.map_err(with_inputs)?;
    let attempts = ctx.attempt_repository().await.map_err(with_inputs)?;

    let runner = ctx.runner();
    let store = ctx.store();
    let assessor = AzureSpeechAssessor::new(config.azure_sources())
        .with_endpoint(config.app.azure.speech.endpoint.clone());
    let ports = VoicePorts {
        converter: Arc::new(FfmpegConverter::new(runner.clone(), store.clone())),
        synthesizer: Arc::new(EdgeTtsSynthesizer::new(runner.clone(), store.clone())),
        transcriber: Arc::new(WhisperTranscriber::new(runner.clone(), store.clone())),
        assessor: Arc::new(assessor),
        attempts,
    };
    let pipeline = VoiceAssessmentPipeline::new(ports, store.clone())
        .with_inline_max_bytes(config.inline_max_bytes());

    let request = VoiceRequest {
        input: input.to_string(),
        reference_text: ref_text.to_string(),
        backend,
        item_id: item_id.map(str::to_string),
    };
    let result = pipeline.run(&request).await.map_err(fail)?;

    let data = serde_json::to_value(&result.data)
        .map_err(|e| fail(XuezhError::from(e)))?;
    let output = CommandOutput::data(data).with_artifacts(result.artifacts);
    match result.limits {
        Some(limits) if result.truncated => {
            let limits = match serde_json::to_value(limits) {
                Ok(Value::Object(map)) => map,
                _ => Default::default(),
            };
            Ok(output.truncated(limits))
        }
        _ => Ok(output),
    }
}
