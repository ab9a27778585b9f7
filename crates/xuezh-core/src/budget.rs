//! Bounded-size rendering of assessment payloads.
//!
//! Results returned inline must stay under a byte budget. When they do not,
//! they are degraded step by step, and full detail is reached through spill
//! artifacts written earlier in the run.
//!
//! # Design
//!
//! Levels are strictly ordered and each is attempted only when the previous
//! one is still over budget:
//!
//! 1. **Deduped**: drop the transcript's `words` when the assessment also
//!    has them (always applied)
//! 2. **Summarized**: drop `words` and `segments` from both
//! 3. **Minimal**: scores and flags, a bounded text preview, spill pointers
//! 4. **`PointerOnly`**: the minimal form without any text preview

use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::artifacts::ArtifactStore;
use crate::domain::{Artifact, ArtifactIndex, Assessment, OverallScores, Transcript, purpose};
use crate::error::XuezhError;

/// Upper bound on the transcript preview kept at the minimal level, in characters.
pub const TEXT_PREVIEW_MAX_CHARS: usize = 2000;

/// How far a payload had to be degraded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradeLevel {
    Deduped,
    Summarized,
    Minimal,
    PointerOnly,
}

/// Assessment reduced to scores, flags and a pointer to the full artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MinimalAssessment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall: Option<OverallScores>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exact_match: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spill_artifact: Option<String>,
}

/// Transcript reduced to a text preview and a pointer to the full artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MinimalTranscript {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_preview: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_truncated: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spill_artifact: Option<String>,
}

/// Inline form of an assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AssessmentView {
    Full(Assessment),
    Minimal(MinimalAssessment),
}

/// Inline form of a transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TranscriptView {
    Full(Transcript),
    Minimal(MinimalTranscript),
}

/// Output of [`degrade`].
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetedPayload {
    pub assessment: AssessmentView,
    pub transcript: TranscriptView,
    pub truncated: bool,
    pub level: DegradeLevel,
}

/// Serialized size of `{assessment, transcript}` in pretty JSON.
pub fn payload_bytes<A: Serialize, T: Serialize>(assessment: &A, transcript: &T) -> usize {
    let payload = json!({ "assessment": assessment, "transcript": transcript });
    serde_json::to_vec_pretty(&payload).map_or(0, |bytes| bytes.len())
}

fn minimal_assessment(assessment: &Assessment, index: &ArtifactIndex) -> MinimalAssessment {
    MinimalAssessment {
        overall: assessment.overall.clone(),
        exact_match: assessment.exact_match,
        note: assessment.note.clone(),
        spill_artifact: index.get(purpose::ASSESSMENT).cloned(),
    }
}

fn minimal_transcript(
    transcript: &Transcript,
    index: &ArtifactIndex,
    preview_chars: usize,
) -> MinimalTranscript {
    let total = transcript.text.chars().count();
    let keep = preview_chars.min(total);
    let (text_preview, text_truncated) = if keep > 0 {
        (
            Some(transcript.text.chars().take(keep).collect()),
            Some(total > keep),
        )
    } else {
        (None, None)
    };
    MinimalTranscript {
        text_preview,
        text_truncated,
        spill_artifact: index.get(purpose::TRANSCRIPT).cloned(),
    }
}

/// Fit an assessment/transcript pair into `max_bytes`.
pub fn degrade(
    assessment: &Assessment,
    transcript: &Transcript,
    index: &ArtifactIndex,
    max_bytes: usize,
) -> BudgetedPayload {
    let assessment = assessment.clone();
    let mut transcript = transcript.clone();
    if assessment.words.is_some() && transcript.words.is_some() {
        transcript.words = None;
    }

    let size = payload_bytes(&assessment, &transcript);
    if size <= max_bytes {
        return BudgetedPayload {
            assessment: AssessmentView::Full(assessment),
            transcript: TranscriptView::Full(transcript),
            truncated: false,
            level: DegradeLevel::Deduped,
        };
    }
    debug!(size, max_bytes, "Payload over budget, summarizing");

    let summary_assessment = Assessment {
        words: None,
        ..assessment.clone()
    };
    let summary_transcript = Transcript {
        words: None,
        segments: None,
        ..transcript.clone()
    };
    if payload_bytes(&summary_assessment, &summary_transcript) <= max_bytes {
        return BudgetedPayload {
            assessment: AssessmentView::Full(summary_assessment),
            transcript: TranscriptView::Full(summary_transcript),
            truncated: true,
            level: DegradeLevel::Summarized,
        };
    }

    let minimal_a = minimal_assessment(&assessment, index);
    let minimal_t = minimal_transcript(&transcript, index, TEXT_PREVIEW_MAX_CHARS);
    if payload_bytes(&minimal_a, &minimal_t) <= max_bytes {
        return BudgetedPayload {
            assessment: AssessmentView::Minimal(minimal_a),
            transcript: TranscriptView::Minimal(minimal_t),
            truncated: true,
            level: DegradeLevel::Minimal,
        };
    }

    debug!(max_bytes, "Minimal payload still over budget, dropping preview");
    BudgetedPayload {
        assessment: AssessmentView::Minimal(minimal_a),
        transcript: TranscriptView::Minimal(minimal_transcript(&transcript, index, 0)),
        truncated: true,
        level: DegradeLevel::PointerOnly,
    }
}

/// Output of [`spill_if_needed`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpillOutcome {
    pub data: Value,
    pub artifacts: Vec<Artifact>,
    pub truncated: bool,
}

/// Two-level budget for arbitrary payloads: inline, or spill everything.
///
/// Over-budget payloads are written whole to an artifact with purpose
/// `<prefix>_spill`, and the returned data only points at it.
pub async fn spill_if_needed(
    store: &ArtifactStore,
    payload: &Value,
    max_bytes: usize,
    prefix: &str,
) -> Result<SpillOutcome, XuezhError> {
    let size = serde_json::to_vec_pretty(payload)?.len();
    if size <= max_bytes {
        return Ok(SpillOutcome {
            data: payload.clone(),
            artifacts: Vec::new(),
            truncated: false,
        });
    }
    let artifact = store
        .write_json(&format!("{prefix}-spill"), payload, &format!("{prefix}_spill"))
        .await?;
    debug!(size, max_bytes, path = %artifact.path, "Payload spilled");
    Ok(SpillOutcome {
        data: json!({ "spill_artifact": artifact.path }),
        artifacts: vec![artifact],
        truncated: true,
    })
}
