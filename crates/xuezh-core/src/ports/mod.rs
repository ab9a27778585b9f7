//! Traits the pipeline drives: audio tools, cloud assessment, persistence.
//!
//! Implementations live in `xuezh-runtime` and `xuezh-db`; signatures use
//! only domain types.
//!
//! # Design Rules
//!
//! - No `sqlx`, `reqwest` or `tokio::process` types in any signature
//! - One trait per external capability so each backend can be swapped or mocked
//! - Failures are reported as [`XuezhError`](crate::XuezhError) with the
//!   correct kind already attached

pub mod attempt_repository;
pub mod audio;
pub mod process_runner;

use thiserror::Error;

pub use attempt_repository::AttemptRepository;
pub use audio::{
    AudioConverter, CloudAssessment, ConvertedAudio, PronunciationAssessor, SpeechSynthesizer,
    SynthesizedAudio, Transcriber, Transcription,
};
pub use process_runner::{ProcessOutput, ProcessRunner};

/// Failures reported by [`AttemptRepository`] implementations.
///
/// Storage engines translate their own errors into these variants so the
/// pipeline never depends on a database crate.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Attempt not found: {0}")]
    NotFound(String),

    /// The attempt id is already taken.
    #[error("Attempt already exists: {0}")]
    AlreadyExists(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// A stored JSON column could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}
