//! Local transcription with the `whisper` CLI.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, info};

use xuezh_core::{
    ArtifactStore, ProcessRunner, Transcriber, Transcript, Transcription, XuezhError, purpose,
};

use super::existing_input;

/// Model size passed to `whisper`.
const WHISPER_MODEL: &str = "tiny";

/// Transcribes Mandarin recordings with `whisper`.
pub struct WhisperTranscriber {
    runner: Arc<dyn ProcessRunner>,
    store: Arc<ArtifactStore>,
}

impl WhisperTranscriber {
    pub fn new(runner: Arc<dyn ProcessRunner>, store: Arc<ArtifactStore>) -> Self {
        Self { runner, store }
    }
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(&self, input: &str) -> Result<Transcription, XuezhError> {
        let input = existing_input(input)?;
        self.runner.ensure_tool("whisper").await?;

        let artifacts_dir = self.store.workspace().artifacts_dir();
        let scratch = tempfile::Builder::new()
            .prefix(".stt-")
            .tempdir_in(&artifacts_dir)
            .map_err(XuezhError::io(&artifacts_dir))?;

        let argv: Vec<String> = vec![
            "whisper".into(),
            input.to_string_lossy().into_owned(),
            "--model".into(),
            WHISPER_MODEL.into(),
            "--output_format".into(),
            "json".into(),
            "--output_dir".into(),
            scratch.path().to_string_lossy().into_owned(),
            "--language".into(),
            "zh".into(),
            "--task".into(),
            "transcribe".into(),
        ];
        self.runner.run(&argv).await?;

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let produced = scratch.path().join(format!("{stem}.json"));
        let bytes = tokio::fs::read(&produced)
            .await
            .map_err(XuezhError::io(&produced))?;
        let raw: Value = serde_json::from_slice(&bytes)?;
        let transcript = Transcript::from_whisper_json(&raw);
        debug!(chars = transcript.text.chars().count(), "Whisper output parsed");

        let artifact = self
            .store
            .write_json(&format!("stt-{stem}"), &transcript, purpose::TRANSCRIPT)
            .await?;
        info!(path = %artifact.path, "Transcript written");

        Ok(Transcription {
            input,
            transcript,
            artifact,
        })
    }
}
