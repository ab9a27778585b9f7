//! User configuration loaded from `config.toml` plus environment fallbacks.
//!
//! The file lives at `$XDG_CONFIG_HOME/xuezh/config.toml` (or
//! `~/.config/xuezh/config.toml`). A missing file is not an error: every
//! setting has an environment variable or a built-in default behind it.
//!
//! # Design
//!
//! - Loaded once at process start and passed around by reference
//! - Environment access goes through an injected lookup so tests never
//!   mutate process state

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::debug;

use crate::error::{SpeechFailure, XuezhError};
use crate::paths::expand_home;

/// Default inline budget for pronunciation payloads, in bytes.
pub const DEFAULT_INLINE_MAX_BYTES: usize = 200_000;

/// Environment variable overriding the inline budget.
pub const INLINE_MAX_BYTES_ENV: &str = "XUEZH_AUDIO_INLINE_MAX_BYTES";

/// Environment variable selecting a backend for every audio command.
pub const GLOBAL_BACKEND_ENV: &str = "XUEZH_AUDIO_BACKEND";

/// Azure Speech key environment variable.
pub const AZURE_KEY_ENV: &str = "AZURE_SPEECH_KEY";

/// Azure Speech region environment variable.
pub const AZURE_REGION_ENV: &str = "AZURE_SPEECH_REGION";

/// Read a variable from the process environment.
pub fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Could not determine where the config file lives.
    #[error("Cannot determine config directory")]
    NoConfigDir,

    /// The config file exists but could not be read.
    #[error("Failed to read config {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// The config file is not valid TOML for this schema.
    #[error("Failed to parse config {path}: {reason}")]
    Parse { path: PathBuf, reason: String },
}

/// Root of `config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub audio: AudioConfig,
    pub azure: AzureConfig,
}

/// `[audio]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AudioConfig {
    /// Backend applied to every audio command unless a specific one is set.
    pub backend_global: Option<String>,
    pub convert_backend: Option<String>,
    pub tts_backend: Option<String>,
    pub stt_backend: Option<String>,
    pub process_voice_backend: Option<String>,
    /// Inline payload budget in bytes.
    pub inline_max_bytes: Option<u64>,
}

/// `[azure]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AzureConfig {
    pub speech: AzureSpeechConfig,
}

/// `[azure.speech]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AzureSpeechConfig {
    pub key: Option<String>,
    /// File holding the key; read and trimmed, overrides `key`.
    pub key_file: Option<String>,
    pub region: Option<String>,
    /// Override for the service base URL, e.g. a local test server.
    pub endpoint: Option<String>,
}

/// Audio commands whose backend can be configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioCommand {
    Convert,
    Tts,
    Stt,
    ProcessVoice,
}

impl AudioCommand {
    /// Per-command environment override.
    pub const fn env_key(self) -> &'static str {
        match self {
            Self::Convert => "XUEZH_AUDIO_CONVERT_BACKEND",
            Self::Tts => "XUEZH_AUDIO_TTS_BACKEND",
            Self::Stt => "XUEZH_AUDIO_STT_BACKEND",
            Self::ProcessVoice => "XUEZH_AUDIO_PROCESS_VOICE_BACKEND",
        }
    }

    /// Backend used when nothing else is configured.
    pub const fn default_backend(self) -> &'static str {
        match self {
            Self::Convert => "ffmpeg",
            Self::Tts => "edge-tts",
            Self::Stt => "whisper",
            Self::ProcessVoice => "azure.speech",
        }
    }
}

/// Location of the config file.
pub fn config_path(env: impl Fn(&str) -> Option<String>) -> Result<PathBuf, ConfigError> {
    let base = match env("XDG_CONFIG_HOME").filter(|v| !v.trim().is_empty()) {
        Some(value) => PathBuf::from(value),
        None => dirs::home_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join(".config"),
    };
    Ok(base.join("xuezh").join("config.toml"))
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl AppConfig {
    /// Load the config file, returning defaults when it does not exist.
    pub fn load(env: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let path = config_path(env)?;
        Self::from_file(&path)
    }

    /// Load a specific file, returning defaults when it does not exist.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };
        toml::from_str(&text).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Pick the backend identifier for `command`.
    ///
    /// Resolution order:
    /// 1. Explicit CLI value
    /// 2. `audio.<command>_backend` in config
    /// 3. `audio.backend_global` in config
    /// 4. `XUEZH_AUDIO_<COMMAND>_BACKEND`
    /// 5. `XUEZH_AUDIO_BACKEND`
    /// 6. The command's default
    pub fn resolve_backend(
        &self,
        command: AudioCommand,
        cli_value: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> String {
        let specific = match command {
            AudioCommand::Convert => self.audio.convert_backend.as_deref(),
            AudioCommand::Tts => self.audio.tts_backend.as_deref(),
            AudioCommand::Stt => self.audio.stt_backend.as_deref(),
            AudioCommand::ProcessVoice => self.audio.process_voice_backend.as_deref(),
        };
        non_blank(cli_value)
            .or_else(|| non_blank(specific))
            .or_else(|| non_blank(self.audio.backend_global.as_deref()))
            .or_else(|| non_blank(env(command.env_key()).as_deref()))
            .or_else(|| non_blank(env(GLOBAL_BACKEND_ENV).as_deref()))
            .unwrap_or_else(|| command.default_backend().to_string())
    }

    /// Inline byte budget: config, then environment, then the default.
    ///
    /// Zero, negative and unparsable values are ignored.
    pub fn inline_max_bytes(&self, env: impl Fn(&str) -> Option<String>) -> usize {
        if let Some(bytes) = self
            .audio
            .inline_max_bytes
            .filter(|b| *b > 0)
            .and_then(|b| usize::try_from(b).ok())
        {
            return bytes;
        }
        env(INLINE_MAX_BYTES_ENV)
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|b| *b > 0)
            .unwrap_or(DEFAULT_INLINE_MAX_BYTES)
    }
}

/// Resolved Azure Speech credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct AzureCredentials {
    pub key: String,
    pub region: String,
}

impl std::fmt::Debug for AzureCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AzureCredentials")
            .field("key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

/// Which credential pieces were found, and where.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AzureCredentialSources {
    pub config_key: Option<String>,
    pub config_region: Option<String>,
    pub env_key: Option<String>,
    pub env_region: Option<String>,
}

impl AzureCredentialSources {
    /// Collect credential pieces from config and environment.
    ///
    /// A readable `key_file` overrides an inline `key`.
    pub fn collect(config: &AzureSpeechConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let mut config_key = non_blank(config.key.as_deref());
        if let Some(file) = non_blank(config.key_file.as_deref()) {
            match expand_home(&file).map(fs::read_to_string) {
                Ok(Ok(contents)) => {
                    if let Some(key) = non_blank(Some(&contents)) {
                        config_key = Some(key);
                    }
                }
                _ => debug!(key_file = %file, "Azure key file unreadable"),
            }
        }
        Self {
            config_key,
            config_region: non_blank(config.region.as_deref()),
            env_key: non_blank(env(AZURE_KEY_ENV).as_deref()),
            env_region: non_blank(env(AZURE_REGION_ENV).as_deref()),
        }
    }

    /// Combine the pieces, config first, or report exactly what is missing.
    pub fn resolve(self) -> Result<AzureCredentials, XuezhError> {
        let key = self.config_key.or(self.env_key);
        let region = self.config_region.or(self.env_region);
        match (key, region) {
            (Some(key), Some(region)) => Ok(AzureCredentials { key, region }),
            (key, region) => {
                let mut missing = Vec::new();
                if key.is_none() {
                    missing.push("AZURE_SPEECH_KEY or config.azure.speech.key/key_file");
                }
                if region.is_none() {
                    missing.push("AZURE_SPEECH_REGION or config.azure.speech.region");
                }
                Err(XuezhError::speech(
                    SpeechFailure::Auth,
                    format!("Azure Speech credentials missing ({})", missing.join(", ")),
                    json!({ "missing": missing }),
                ))
            }
        }
    }
}
