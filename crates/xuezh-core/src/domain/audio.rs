//! Audio formats and backend identifiers, parsed once at the boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::XuezhError;

/// Supported audio container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Wav,
    Ogg,
    Mp3,
}

impl AudioFormat {
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Ogg => "ogg",
            Self::Mp3 => "mp3",
        }
    }

    pub const fn mime(self) -> &'static str {
        match self {
            Self::Wav => "audio/wav",
            Self::Ogg => "audio/ogg",
            Self::Mp3 => "audio/mpeg",
        }
    }

    /// Encoder flags placed between the input and output paths.
    pub const fn encoder_args(self) -> &'static [&'static str] {
        match self {
            Self::Wav => &["-ac", "1", "-ar", "16000", "-c:a", "pcm_s16le"],
            Self::Ogg => &["-ac", "1", "-ar", "48000", "-c:a", "libopus", "-b:a", "24k"],
            Self::Mp3 => &["-ac", "1", "-ar", "44100", "-c:a", "libmp3lame", "-b:a", "64k"],
        }
    }

    /// Format implied by a file extension, if supported.
    pub fn from_extension(ext: &str) -> Option<Self> {
        ext.parse().ok()
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for AudioFormat {
    type Err = XuezhError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wav" => Ok(Self::Wav),
            "ogg" => Ok(Self::Ogg),
            "mp3" => Ok(Self::Mp3),
            _ => Err(XuezhError::InvalidArgument(format!(
                "Unsupported audio format: {s}"
            ))),
        }
    }
}

/// Identity and capabilities of the backend that produced a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackendDescriptor {
    pub id: String,
    pub features: Vec<String>,
}

impl BackendDescriptor {
    pub fn new(id: &str, features: &[&str]) -> Self {
        Self {
            id: id.to_string(),
            features: features.iter().map(|f| (*f).to_string()).collect(),
        }
    }
}

fn unsupported_backend(value: &str) -> XuezhError {
    XuezhError::InvalidArgument(format!("Unsupported backend: {value}"))
}

/// Backends able to convert audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertBackend {
    Ffmpeg,
}

impl ConvertBackend {
    pub const fn id(self) -> &'static str {
        match self {
            Self::Ffmpeg => "ffmpeg",
        }
    }

    pub fn descriptor(self) -> BackendDescriptor {
        BackendDescriptor::new(self.id(), &["convert"])
    }
}

impl FromStr for ConvertBackend {
    type Err = XuezhError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "ffmpeg" => Ok(Self::Ffmpeg),
            other => Err(unsupported_backend(other)),
        }
    }
}

/// Backends able to synthesize speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TtsBackend {
    EdgeTts,
}

impl TtsBackend {
    pub const fn id(self) -> &'static str {
        match self {
            Self::EdgeTts => "edge-tts",
        }
    }

    pub fn descriptor(self) -> BackendDescriptor {
        BackendDescriptor::new(self.id(), &["tts"])
    }
}

impl FromStr for TtsBackend {
    type Err = XuezhError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "edge-tts" => Ok(Self::EdgeTts),
            other => Err(unsupported_backend(other)),
        }
    }
}

/// Backends able to transcribe speech locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SttBackend {
    Whisper,
}

impl SttBackend {
    pub const fn id(self) -> &'static str {
        match self {
            Self::Whisper => "whisper",
        }
    }

    pub fn descriptor(self) -> BackendDescriptor {
        BackendDescriptor::new(self.id(), &["stt"])
    }
}

impl FromStr for SttBackend {
    type Err = XuezhError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "whisper" => Ok(Self::Whisper),
            other => Err(unsupported_backend(other)),
        }
    }
}

/// Backends for the full voice assessment pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceBackend {
    /// Local transcription with placeholder scoring.
    Local,
    /// Azure Speech pronunciation assessment.
    AzureSpeech,
}

impl VoiceBackend {
    pub const fn id(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::AzureSpeech => "azure.speech",
        }
    }

    pub fn descriptor(self) -> BackendDescriptor {
        match self {
            Self::Local => BackendDescriptor::new(self.id(), &["assessment", "tts", "stt", "convert"]),
            Self::AzureSpeech => {
                BackendDescriptor::new(self.id(), &["assessment", "tts", "convert", "azure.speech"])
            }
        }
    }
}

impl FromStr for VoiceBackend {
    type Err = XuezhError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "local" => Ok(Self::Local),
            "azure.speech" => Ok(Self::AzureSpeech),
            other => Err(unsupported_backend(other)),
        }
    }
}
