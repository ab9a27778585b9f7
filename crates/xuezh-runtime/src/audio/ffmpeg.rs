//! Format conversion with `ffmpeg`.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use xuezh_core::paths::ensure_directory;
use xuezh_core::{ArtifactStore, AudioConverter, AudioFormat, ConvertedAudio, ProcessRunner, XuezhError};

use super::{convert_argv, existing_input};

/// Converts recordings with `ffmpeg`.
pub struct FfmpegConverter {
    runner: Arc<dyn ProcessRunner>,
    store: Arc<ArtifactStore>,
}

impl FfmpegConverter {
    pub fn new(runner: Arc<dyn ProcessRunner>, store: Arc<ArtifactStore>) -> Self {
        Self { runner, store }
    }
}

#[async_trait]
impl AudioConverter for FfmpegConverter {
    async fn convert(
        &self,
        input: &str,
        output: &str,
        format: AudioFormat,
        purpose: &str,
    ) -> Result<ConvertedAudio, XuezhError> {
        let input = existing_input(input)?;
        let output = self.store.workspace().resolve(output)?;
        if let Some(parent) = output.parent() {
            ensure_directory(parent)?;
        }
        self.runner.ensure_tool("ffmpeg").await?;

        self.runner
            .run(&convert_argv(&input, &output, format))
            .await?;
        info!(output = %output.display(), %format, "Converted audio");

        let artifact = self.store.describe_audio(&output, format, purpose)?;
        Ok(ConvertedAudio {
            input,
            format,
            artifact,
        })
    }
}
