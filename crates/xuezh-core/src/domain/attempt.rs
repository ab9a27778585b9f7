//! Persisted pronunciation attempts.

use serde::{Deserialize, Serialize};

use super::{Artifact, ArtifactIndex, Assessment};

/// Summary stored alongside each attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub assessment: Assessment,
    pub artifacts_index: ArtifactIndex,
}

/// One completed run of the voice pipeline. Inserted once, never updated.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    /// Time-ordered identifier.
    pub id: String,
    pub item_id: Option<String>,
    /// ISO-8601 UTC timestamp.
    pub ts: String,
    pub backend_id: String,
    pub artifacts: Vec<Artifact>,
    pub summary: AttemptSummary,
}
