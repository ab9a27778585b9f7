//! Core of the xuezh voice toolkit.
//!
//! Domain types, the error taxonomy, workspace and artifact handling, the
//! payload budget and the voice assessment pipeline. Everything that touches
//! external tools, HTTP or SQLite lives behind the traits in [`ports`].

#![deny(unused_crate_dependencies)]

pub mod artifacts;
pub mod budget;
pub mod clock;
pub mod config;
pub mod domain;
pub mod error;
pub mod ids;
pub mod paths;
pub mod ports;
pub mod services;

pub use artifacts::{ArtifactStore, guess_mime};
pub use budget::{
    AssessmentView, BudgetedPayload, DegradeLevel, SpillOutcome, TranscriptView, degrade,
    spill_if_needed,
};
pub use clock::Clock;
pub use config::{AppConfig, AudioCommand, AzureCredentialSources, AzureCredentials, ConfigError};
pub use domain::{
    Artifact, ArtifactIndex, Assessment, AttemptRecord, AttemptSummary, AudioFormat,
    BackendDescriptor, ConvertBackend, SttBackend, Transcript, TtsBackend, VoiceBackend, purpose,
};
pub use error::{ErrorKind, SpeechFailure, XuezhError};
pub use ids::AttemptIdGenerator;
pub use paths::{PathError, Workspace};
pub use ports::{
    AttemptRepository, AudioConverter, CloudAssessment, ConvertedAudio, ProcessOutput,
    ProcessRunner, PronunciationAssessor, RepositoryError, SpeechSynthesizer, SynthesizedAudio,
    Transcriber, Transcription,
};
pub use services::{
    VoiceAssessmentPipeline, VoiceAssessmentResult, VoicePorts, VoiceRequest,
};
