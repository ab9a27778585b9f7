//! Audio backend ports: conversion, synthesis, transcription, assessment.
//!
//! Each adapter validates its own inputs, resolves output paths inside the
//! workspace and returns the artifact it wrote.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::{Artifact, Assessment, AudioFormat, Transcript};
use crate::error::XuezhError;

/// Result of converting one audio file.
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedAudio {
    /// Input path after home expansion.
    pub input: PathBuf,
    pub format: AudioFormat,
    pub artifact: Artifact,
}

/// Result of synthesizing speech.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedAudio {
    pub text: String,
    /// Full voice name after alias expansion.
    pub voice: String,
    pub artifact: Artifact,
}

/// Result of local transcription.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcription {
    pub input: PathBuf,
    pub transcript: Transcript,
    /// The transcript JSON artifact.
    pub artifact: Artifact,
}

/// Result of a cloud pronunciation assessment.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudAssessment {
    pub assessment: Assessment,
    pub transcript: Transcript,
    /// Service response exactly as received.
    pub raw: Value,
}

/// Converts audio between formats.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AudioConverter: Send + Sync {
    /// Convert `input` to `format`, writing to `output` inside the workspace.
    async fn convert(
        &self,
        input: &str,
        output: &str,
        format: AudioFormat,
        purpose: &str,
    ) -> Result<ConvertedAudio, XuezhError>;
}

/// Synthesizes speech from text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Speak `text` with `voice`; the output extension picks the format.
    async fn synthesize(
        &self,
        text: &str,
        voice: &str,
        output: &str,
        purpose: &str,
    ) -> Result<SynthesizedAudio, XuezhError>;
}

/// Transcribes speech locally.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transcriber: Send + Sync {
    async fn transcribe(&self, input: &str) -> Result<Transcription, XuezhError>;
}

/// Scores pronunciation against a reference text.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PronunciationAssessor: Send + Sync {
    /// Assess a mono 16 kHz WAV recording.
    async fn assess(
        &self,
        reference_text: &str,
        wav: &Path,
    ) -> Result<CloudAssessment, XuezhError>;
}
