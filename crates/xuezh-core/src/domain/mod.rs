//! Domain types shared by the pipeline, adapters and persistence.
//!
//! These types are pure data: no I/O, no adapter concerns.

mod artifact;
mod assessment;
mod attempt;
mod audio;
mod transcript;

pub use artifact::{Artifact, ArtifactIndex, index_by_purpose, purpose};
pub use assessment::{Assessment, LOCAL_PLACEHOLDER_NOTE, OverallScores, WordAssessment};
pub use attempt::{AttemptRecord, AttemptSummary};
pub use audio::{
    AudioFormat, BackendDescriptor, ConvertBackend, SttBackend, TtsBackend, VoiceBackend,
};
pub use transcript::{Segment, Transcript};
