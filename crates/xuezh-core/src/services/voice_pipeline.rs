//! Voice assessment pipeline.
//!
//! Normalizes a learner recording, scores it with the selected backend,
//! synthesizes a feedback voice note, budgets the inline payload and records
//! the attempt. Stages run strictly in order; any failure aborts the run and
//! leaves already-written artifacts in place.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::artifacts::ArtifactStore;
use crate::budget::{AssessmentView, DegradeLevel, TranscriptView, degrade};
use crate::clock::format_iso;
use crate::config::DEFAULT_INLINE_MAX_BYTES;
use crate::domain::{
    Artifact, ArtifactIndex, Assessment, AttemptRecord, AttemptSummary, AudioFormat,
    BackendDescriptor, VoiceBackend, index_by_purpose, purpose,
};
use crate::error::XuezhError;
use crate::ids::AttemptIdGenerator;
use crate::paths::expand_home;
use crate::ports::{
    AttemptRepository, AudioConverter, PronunciationAssessor, SpeechSynthesizer, Transcriber,
};

/// Voice used to read the reference text back to the learner.
pub const FEEDBACK_VOICE: &str = "XiaoxiaoNeural";

/// One request to assess a recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceRequest {
    /// Recording path; `~` is expanded, it need not live in the workspace.
    pub input: String,
    pub reference_text: String,
    pub backend: VoiceBackend,
    /// Study item this attempt belongs to, if any.
    pub item_id: Option<String>,
}

/// Limits reported when the inline payload was degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VoiceLimits {
    pub inline_bytes_max: usize,
}

/// Inline data returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceAssessmentData {
    pub ref_text: String,
    pub backend: BackendDescriptor,
    pub attempt_id: String,
    pub artifacts_index: ArtifactIndex,
    pub assessment: AssessmentView,
    pub transcript: TranscriptView,
}

/// Everything a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceAssessmentResult {
    pub data: VoiceAssessmentData,
    /// Artifacts in creation order.
    pub artifacts: Vec<Artifact>,
    pub truncated: bool,
    /// Present only when `truncated` is set.
    pub limits: Option<VoiceLimits>,
    pub level: DegradeLevel,
}

/// Backends the pipeline drives.
#[derive(Clone)]
pub struct VoicePorts {
    pub converter: Arc<dyn AudioConverter>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub transcriber: Arc<dyn Transcriber>,
    pub assessor: Arc<dyn PronunciationAssessor>,
    pub attempts: Arc<dyn AttemptRepository>,
}

/// Orchestrates a single voice assessment end to end.
pub struct VoiceAssessmentPipeline {
    ports: VoicePorts,
    store: Arc<ArtifactStore>,
    ids: AttemptIdGenerator,
    inline_max_bytes: usize,
}

impl VoiceAssessmentPipeline {
    pub fn new(ports: VoicePorts, store: Arc<ArtifactStore>) -> Self {
        Self {
            ports,
            store,
            ids: AttemptIdGenerator::new(),
            inline_max_bytes: DEFAULT_INLINE_MAX_BYTES,
        }
    }

    /// Set the inline payload budget in bytes.
    #[must_use]
    pub const fn with_inline_max_bytes(mut self, bytes: usize) -> Self {
        self.inline_max_bytes = bytes;
        self
    }

    /// Run every stage for `request`.
    pub async fn run(&self, request: &VoiceRequest) -> Result<VoiceAssessmentResult, XuezhError> {
        if request.reference_text.trim().is_empty() {
            return Err(XuezhError::InvalidArgument(
                "reference text is required".to_string(),
            ));
        }
        let input = expand_home(&request.input)?;
        if !input.exists() {
            return Err(XuezhError::InvalidArgument(format!(
                "Input file not found: {}",
                input.display()
            )));
        }
        info!(backend = request.backend.id(), input = %input.display(), "Assessing recording");

        let normalized_out = self.store.artifact_path("normalized-input", "wav")?;
        let normalized = self
            .ports
            .converter
            .convert(
                &request.input,
                &normalized_out.to_string_lossy(),
                AudioFormat::Wav,
                purpose::NORMALIZED_INPUT,
            )
            .await?;
        let normalized_path = self.store.workspace().resolve(&normalized.artifact.path)?;
        let mut artifacts = vec![normalized.artifact];

        let (assessment, transcript) = match request.backend {
            VoiceBackend::Local => {
                let transcription = self
                    .ports
                    .transcriber
                    .transcribe(&normalized_path.to_string_lossy())
                    .await?;
                artifacts.push(transcription.artifact);
                let assessment = Assessment::local_placeholder(
                    &request.reference_text,
                    &transcription.transcript.text,
                );
                (assessment, transcription.transcript)
            }
            VoiceBackend::AzureSpeech => {
                let cloud = self
                    .ports
                    .assessor
                    .assess(&request.reference_text, &normalized_path)
                    .await?;
                artifacts.push(
                    self.store
                        .write_json("transcript", &cloud.transcript, purpose::TRANSCRIPT)
                        .await?,
                );
                artifacts.push(
                    self.store
                        .write_json("azure-response", &cloud.raw, purpose::AZURE_RESPONSE)
                        .await?,
                );
                (cloud.assessment, cloud.transcript)
            }
        };
        artifacts.push(
            self.store
                .write_json("assessment", &assessment, purpose::ASSESSMENT)
                .await?,
        );

        let feedback_out = self.store.artifact_path("feedback-voice", "ogg")?;
        let feedback = self
            .ports
            .synthesizer
            .synthesize(
                &request.reference_text,
                FEEDBACK_VOICE,
                &feedback_out.to_string_lossy(),
                purpose::FEEDBACK_VOICE_NOTE,
            )
            .await?;
        artifacts.push(feedback.artifact);

        let artifacts_index = index_by_purpose(&artifacts);
        let budgeted = degrade(
            &assessment,
            &transcript,
            &artifacts_index,
            self.inline_max_bytes,
        );
        debug!(level = ?budgeted.level, truncated = budgeted.truncated, "Payload budgeted");

        let attempt_id = self
            .record_attempt(request, &artifacts, assessment, &artifacts_index)
            .await?;

        Ok(VoiceAssessmentResult {
            data: VoiceAssessmentData {
                ref_text: request.reference_text.clone(),
                backend: request.backend.descriptor(),
                attempt_id,
                artifacts_index,
                assessment: budgeted.assessment,
                transcript: budgeted.transcript,
            },
            artifacts,
            truncated: budgeted.truncated,
            limits: budgeted.truncated.then_some(VoiceLimits {
                inline_bytes_max: self.inline_max_bytes,
            }),
            level: budgeted.level,
        })
    }

    async fn record_attempt(
        &self,
        request: &VoiceRequest,
        artifacts: &[Artifact],
        assessment: Assessment,
        artifacts_index: &ArtifactIndex,
    ) -> Result<String, XuezhError> {
        let record = AttemptRecord {
            id: self.ids.next_id(),
            item_id: request.item_id.clone(),
            ts: format_iso(self.store.clock().now()),
            backend_id: request.backend.id().to_string(),
            artifacts: artifacts.to_vec(),
            summary: AttemptSummary {
                assessment,
                artifacts_index: artifacts_index.clone(),
            },
        };
        self.ports.attempts.insert(&record).await?;
        info!(attempt_id = %record.id, "Attempt recorded");
        Ok(record.id)
    }
}
