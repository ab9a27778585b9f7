//! Speech synthesis with `edge-tts`.
//!
//! `edge-tts` always writes MP3, so the result is re-encoded with `ffmpeg`
//! into the format implied by the output extension (OGG when the extension
//! is missing or unsupported). The intermediate MP3 lives next to the output
//! and is removed on every exit path.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tempfile::TempPath;
use tracing::{debug, info};
use uuid::Uuid;

use xuezh_core::paths::ensure_directory;
use xuezh_core::{
    ArtifactStore, AudioFormat, ProcessRunner, SpeechSynthesizer, SynthesizedAudio, XuezhError,
};

use super::{convert_argv, resolve_voice};

/// Synthesizes speech with `edge-tts`.
pub struct EdgeTtsSynthesizer {
    runner: Arc<dyn ProcessRunner>,
    store: Arc<ArtifactStore>,
}

impl EdgeTtsSynthesizer {
    pub fn new(runner: Arc<dyn ProcessRunner>, store: Arc<ArtifactStore>) -> Self {
        Self { runner, store }
    }
}

fn output_format(path: &Path) -> AudioFormat {
    path.extension()
        .and_then(|e| e.to_str())
        .and_then(AudioFormat::from_extension)
        .unwrap_or(AudioFormat::Ogg)
}

#[async_trait]
impl SpeechSynthesizer for EdgeTtsSynthesizer {
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        output: &str,
        purpose: &str,
    ) -> Result<SynthesizedAudio, XuezhError> {
        let voice = resolve_voice(voice);
        let output = self.store.workspace().resolve(output)?;
        let parent = output
            .parent()
            .unwrap_or_else(|| self.store.workspace().root())
            .to_path_buf();
        ensure_directory(&parent)?;
        self.runner.ensure_tool("edge-tts").await?;
        self.runner.ensure_tool("ffmpeg").await?;

        let speech = TempPath::from_path(parent.join(format!(".tts-{}.mp3", Uuid::new_v4())));
        let argv: Vec<String> = vec![
            "edge-tts".into(),
            "--text".into(),
            text.into(),
            "--voice".into(),
            voice.into(),
            "--write-media".into(),
            speech.to_string_lossy().into_owned(),
        ];
        self.runner.run(&argv).await?;
        debug!(voice, tmp = %speech.display(), "Speech synthesized");

        let format = output_format(&output);
        self.runner
            .run(&convert_argv(&speech, &output, format))
            .await?;
        drop(speech);
        info!(output = %output.display(), voice, "Wrote synthesized speech");

        Ok(SynthesizedAudio {
            text: text.to_string(),
            voice: voice.to_string(),
            artifact: self.store.describe_audio(&output, format, purpose)?,
        })
    }
}
