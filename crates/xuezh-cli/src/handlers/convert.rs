//! `audio convert`: re-encode a file into the workspace.

use serde_json::json;

use xuezh_core::{AudioCommand, AudioConverter, AudioFormat, ConvertBackend, XuezhError, purpose};
use xuezh_runtime::FfmpegConverter;

use super::{inputs, required};
use crate::bootstrap::{CliConfig, bootstrap};
use crate::envelope::CommandOutput;
use crate::error::CliError;

pub async fn handle(
    config: &CliConfig,
    input: Option<&str>,
    out: Option<&str>,
    format: Option<&str>,
    backend: Option<&str>,
) -> Result<CommandOutput, CliError> {
    let (Some(input), Some(out), Some(format)) =
        (required(input), required(out), required(format))
    else {
        return Err(CliError::invalid_argument(
            "in, out, and format are required",
            inputs(&[("in", input), ("out", out), ("format", format)]),
        ));
    };

    let backend_id = config.backend(AudioCommand::Convert, backend);
    let details = inputs(&[
        ("in", Some(input)),
        ("out", Some(out)),
        ("format", Some(format)),
        ("backend", Some(backend_id.as_str())),
    ]);
    let fail = |err: XuezhError| CliError::from_core(&err, "conversion", details.clone());

    let backend = backend_id.parse::<ConvertBackend>().map_err(fail)?;
    let audio_format = format.parse::<AudioFormat>().map_err(fail)?;
    let ctx = bootstrap(config)
        .await
        .map_err(|e| CliError::from(e).with_details(details.clone()))?;

    let converter = FfmpegConverter::new(ctx.runner().clone(), ctx.store().clone());
    let converted = converter
        .convert(input, out, audio_format, purpose::CONVERTED_AUDIO)
        .await
        .map_err(fail)?;

    let data = json!({
        "in": converted.input.display().to_string(),
        "out": converted.artifact.path,
        "format": audio_format.to_string(),
        "backend": backend.descriptor(),
    });
    Ok(CommandOutput::data(data).with_artifacts(vec![converted.artifact]))
}
