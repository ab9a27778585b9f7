//! Date-bucketed artifact storage inside the workspace.
//!
//! Every artifact lands at
//! `artifacts/<YYYY>/<MM>/<DD>/<prefix>-<YYYYMMDDTHHMMSSZ>.<ext>` (UTC) and
//! is described by a workspace-relative [`Artifact`].

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use crate::clock::{Clock, artifact_stamp};
use crate::domain::{Artifact, AudioFormat};
use crate::error::XuezhError;
use crate::paths::{Workspace, ensure_directory};

/// Guess a MIME type from a file extension. Unknown extensions are `text/plain`.
pub fn guess_mime(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if let Some(format) = AudioFormat::from_extension(&ext) {
        return format.mime();
    }
    match ext.as_str() {
        "json" => "application/json",
        "md" => "text/markdown",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "pdf" => "application/pdf",
        "flac" => "audio/flac",
        "m4a" => "audio/mp4",
        _ => "text/plain",
    }
}

/// Writes and describes artifacts for one workspace.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    workspace: Workspace,
    clock: Clock,
}

impl ArtifactStore {
    pub const fn new(workspace: Workspace, clock: Clock) -> Self {
        Self { workspace, clock }
    }

    pub const fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub const fn clock(&self) -> Clock {
        self.clock
    }

    /// Absolute path for a new artifact; the day directory is created.
    pub fn artifact_path(&self, prefix: &str, ext: &str) -> Result<PathBuf, XuezhError> {
        let now = self.clock.now();
        let day = self
            .workspace
            .artifacts_dir()
            .join(now.format("%Y").to_string())
            .join(now.format("%m").to_string())
            .join(now.format("%d").to_string());
        ensure_directory(&day)?;
        Ok(day.join(format!("{prefix}-{}.{ext}", artifact_stamp(now))))
    }

    /// Write raw bytes as a new artifact.
    pub async fn write_bytes(
        &self,
        prefix: &str,
        ext: &str,
        bytes: &[u8],
        purpose: &str,
    ) -> Result<Artifact, XuezhError> {
        let path = self.artifact_path(prefix, ext)?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(XuezhError::io(&path))?;
        debug!(path = %path.display(), purpose, bytes = bytes.len(), "Artifact written");
        self.describe(&path, purpose)
    }

    /// Write a pretty-printed JSON artifact.
    pub async fn write_json<T>(
        &self,
        prefix: &str,
        payload: &T,
        purpose: &str,
    ) -> Result<Artifact, XuezhError>
    where
        T: Serialize + Sync + ?Sized,
    {
        let bytes = serde_json::to_vec_pretty(payload)?;
        self.write_bytes(prefix, "json", &bytes, purpose).await
    }

    /// Copy an existing file into the artifact tree, keeping its extension.
    pub async fn import_file(
        &self,
        source: &Path,
        prefix: &str,
        purpose: &str,
    ) -> Result<Artifact, XuezhError> {
        let bytes = tokio::fs::read(source)
            .await
            .map_err(XuezhError::io(source))?;
        let ext = source
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("bin");
        self.write_bytes(prefix, ext, &bytes, purpose).await
    }

    /// Describe a file already inside the workspace, guessing its MIME type.
    pub fn describe(&self, path: &Path, purpose: &str) -> Result<Artifact, XuezhError> {
        self.describe_with_mime(path, guess_mime(path), purpose)
    }

    /// Describe an audio file produced by an external tool.
    pub fn describe_audio(
        &self,
        path: &Path,
        format: AudioFormat,
        purpose: &str,
    ) -> Result<Artifact, XuezhError> {
        self.describe_with_mime(path, format.mime(), purpose)
    }

    fn describe_with_mime(
        &self,
        path: &Path,
        mime: &str,
        purpose: &str,
    ) -> Result<Artifact, XuezhError> {
        let rel = self.workspace.relative(path)?;
        let meta = std::fs::metadata(path).map_err(XuezhError::io(path))?;
        Ok(Artifact {
            path: rel,
            mime: mime.to_string(),
            purpose: purpose.to_string(),
            bytes: Some(meta.len()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn store(dir: &Path) -> ArtifactStore {
        let ws = Workspace::open(dir).unwrap();
        let clock = Clock::fixed(Utc.with_ymd_and_hms(2025, 3, 7, 9, 8, 7).unwrap());
        ArtifactStore::new(ws, clock)
    }

    #[test]
    fn test_artifact_path_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let path = store.artifact_path("assessment", "json").unwrap();
        assert_eq!(
            store.workspace().relative(&path).unwrap(),
            "artifacts/2025/03/07/assessment-20250307T090807Z.json"
        );
        assert!(path.parent().unwrap().is_dir());
    }

    #[tokio::test]
    async fn test_write_bytes_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let artifact = store
            .write_bytes("note", "txt", "听力练习".as_bytes(), "notes")
            .await
            .unwrap();

        assert_eq!(artifact.mime, "text/plain");
        assert_eq!(artifact.purpose, "notes");
        assert_eq!(artifact.bytes, Some("听力练习".len() as u64));

        let resolved = store.workspace().resolve(&artifact.path).unwrap();
        assert_eq!(std::fs::read(resolved).unwrap(), "听力练习".as_bytes());
    }

    #[tokio::test]
    async fn test_write_json_is_pretty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let artifact = store
            .write_json("transcript", &json!({"text": "你好"}), "transcript")
            .await
            .unwrap();
        assert_eq!(artifact.mime, "application/json");
        let text =
            std::fs::read_to_string(store.workspace().resolve(&artifact.path).unwrap()).unwrap();
        assert!(text.contains('\n'));
    }

    #[tokio::test]
    async fn test_import_file_keeps_extension() {
        let dir = tempfile::tempdir().unwrap();
        let outside = tempfile::tempdir().unwrap();
        let source = outside.path().join("take.ogg");
        std::fs::write(&source, b"OggS").unwrap();

        let store = store(dir.path());
        let artifact = store.import_file(&source, "upload", "raw_input").await.unwrap();
        assert!(artifact.path.ends_with(".ogg"));
        assert_eq!(artifact.mime, "audio/ogg");
    }

    #[test]
    fn test_import_missing_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        let err = tokio_test::block_on(store.import_file(
            Path::new("/definitely/not/here.wav"),
            "x",
            "y",
        ))
        .unwrap_err();
        assert!(matches!(err, XuezhError::Io { .. }));
    }

    #[test]
    fn test_guess_mime() {
        assert_eq!(guess_mime(Path::new("a.WAV")), "audio/wav");
        assert_eq!(guess_mime(Path::new("a.mp3")), "audio/mpeg");
        assert_eq!(guess_mime(Path::new("a.json")), "application/json");
        assert_eq!(guess_mime(Path::new("noext")), "text/plain");
    }
}
