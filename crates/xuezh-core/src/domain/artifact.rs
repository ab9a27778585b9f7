//! Artifact descriptors and the purpose index.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Purpose tags used by the audio commands and the voice pipeline.
pub mod purpose {
    pub const CONVERTED_AUDIO: &str = "converted_audio";
    pub const TTS_AUDIO: &str = "tts_audio";
    pub const NORMALIZED_INPUT: &str = "normalized_input";
    pub const TRANSCRIPT: &str = "transcript";
    pub const ASSESSMENT: &str = "assessment";
    pub const AZURE_RESPONSE: &str = "azure_response";
    pub const FEEDBACK_VOICE_NOTE: &str = "feedback_voice_note";
}

/// A file written into the workspace, described relative to the root.
///
/// Immutable once created; identity is the path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    /// Workspace-relative, `/`-separated path.
    pub path: String,
    pub mime: String,
    /// Free-form tag such as `transcript` or `feedback_voice_note`.
    pub purpose: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
}

/// Purpose → path map. When two artifacts share a purpose the later one wins.
pub type ArtifactIndex = BTreeMap<String, String>;

/// Build the purpose index for an ordered artifact list.
pub fn index_by_purpose(artifacts: &[Artifact]) -> ArtifactIndex {
    artifacts
        .iter()
        .map(|a| (a.purpose.clone(), a.path.clone()))
        .collect()
}
