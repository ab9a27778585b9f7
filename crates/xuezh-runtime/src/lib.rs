//! OS-level adapters for xuezh.
//!
//! Implements the core ports against real processes (`ffmpeg`, `edge-tts`,
//! `whisper`) and the Azure Speech REST API.

#![deny(unsafe_code)]

pub mod audio;
pub mod process;

pub use audio::{
    AzureSpeechAssessor, EdgeTtsSynthesizer, FfmpegConverter, WhisperTranscriber, resolve_voice,
};
pub use process::SystemProcessRunner;
