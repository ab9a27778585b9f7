//! `audio tts`: synthesize speech into the workspace.

use serde_json::json;

use xuezh_core::{AudioCommand, SpeechSynthesizer, TtsBackend, XuezhError, purpose};
use xuezh_runtime::EdgeTtsSynthesizer;

use super::{inputs, required};
use crate::bootstrap::{CliConfig, bootstrap};
use crate::envelope::CommandOutput;
use crate::error::CliError;

pub async fn handle(
    config: &CliConfig,
    text: Option<&str>,
    out: Option<&str>,
    voice: &str,
    backend: Option<&str>,
) -> Result<CommandOutput, CliError> {
    let (Some(text), Some(out)) = (required(text), required(out)) else {
        return Err(CliError::invalid_argument(
            "text and out are required",
            inputs(&[("text", text), ("out", out)]),
        ));
    };

    let backend_id = config.backend(AudioCommand::Tts, backend);
    let details = inputs(&[
        ("text", Some(text)),
        ("voice", Some(voice)),
        ("out", Some(out)),
        ("backend", Some(backend_id.as_str())),
    ]);
    let fail = |err: XuezhError| CliError::from_core(&err, "tts", details.clone());

    let backend = backend_id.parse::<TtsBackend>().map_err(fail)?;
    let ctx = bootstrap(config)
        .await
        .map_err(|e| CliError::from(e).with_details(details.clone()))?;

    let synthesizer = EdgeTtsSynthesizer::new(ctx.runner().clone(), ctx.store().clone());
    let speech = synthesizer
        .synthesize(text, voice, out, purpose::TTS_AUDIO)
        .await
        .map_err(fail)?;

    let data = json!({
        "text": speech.text,
        "voice": speech.voice,
        "out": speech.artifact.path,
        "backend": backend.descriptor(),
    });
    Ok(CommandOutput::data(data).with_artifacts(vec![speech.artifact]))
}
