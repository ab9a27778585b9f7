//! Audio backend adapters.
//!
//! Each adapter implements one core port. Local tools are driven through a
//! [`ProcessRunner`] so tests can substitute a fake; outputs are described
//! as artifacts through the shared [`ArtifactStore`](xuezh_core::ArtifactStore).

mod azure;
mod edge_tts;
mod ffmpeg;
mod whisper;

use std::path::{Path, PathBuf};

use xuezh_core::paths::expand_home;
use xuezh_core::{AudioFormat, XuezhError};

pub use azure::{AzureSpeechAssessor, DEFAULT_TIMEOUT, classify_failure, parse_response};
pub use edge_tts::EdgeTtsSynthesizer;
pub use ffmpeg::FfmpegConverter;
pub use whisper::WhisperTranscriber;

/// Short voice names accepted in place of full `edge-tts` voice ids.
pub const VOICE_ALIASES: &[(&str, &str)] = &[("XiaoxiaoNeural", "zh-CN-XiaoxiaoNeural")];

/// Expand a voice alias; unknown names pass through unchanged.
pub fn resolve_voice(voice: &str) -> &str {
    VOICE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == voice)
        .map_or(voice, |(_, full)| full)
}

/// `ffmpeg` invocation converting `input` to `format` at `output`.
pub fn convert_argv(input: &Path, output: &Path, format: AudioFormat) -> Vec<String> {
    let mut argv: Vec<String> = ["ffmpeg", "-y", "-hide_banner", "-loglevel", "error", "-i"]
        .iter()
        .map(ToString::to_string)
        .collect();
    argv.push(input.to_string_lossy().into_owned());
    argv.extend(format.encoder_args().iter().map(ToString::to_string));
    argv.push(output.to_string_lossy().into_owned());
    argv
}

/// Home-expand an input path and require that it exists.
fn existing_input(raw: &str) -> Result<PathBuf, XuezhError> {
    let path = expand_home(raw)?;
    if path.exists() {
        Ok(path)
    } else {
        Err(XuezhError::InvalidArgument(format!(
            "Input file not found: {}",
            path.display()
        )))
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! In-process stand-in for external tools.

    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;
    use xuezh_core::{ProcessOutput, ProcessRunner, XuezhError};

    /// Records every command and fakes the files each tool would write.
    #[derive(Default)]
    pub struct FakeRunner {
        calls: Mutex<Vec<Vec<String>>>,
        missing: Vec<String>,
        failing: Option<String>,
    }

    impl FakeRunner {
        pub fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub fn with_missing(mut self, tool: &str) -> Self {
            self.missing.push(tool.to_string());
            self
        }

        #[must_use]
        pub fn with_failing(mut self, tool: &str) -> Self {
            self.failing = Some(tool.to_string());
            self
        }

        pub fn calls(&self) -> Vec<Vec<String>> {
            self.calls.lock().unwrap().clone()
        }
    }

    fn arg_after<'a>(argv: &'a [String], flag: &str) -> &'a str {
        let pos = argv.iter().position(|a| a == flag).unwrap();
        &argv[pos + 1]
    }

    #[async_trait]
    impl ProcessRunner for FakeRunner {
        async fn ensure_tool(&self, tool: &str) -> Result<PathBuf, XuezhError> {
            if self.missing.iter().any(|t| t == tool) {
                return Err(XuezhError::ToolMissing {
                    tool: tool.to_string(),
                });
            }
            Ok(Path::new("/usr/bin").join(tool))
        }

        async fn run(&self, argv: &[String]) -> Result<ProcessOutput, XuezhError> {
            self.calls.lock().unwrap().push(argv.to_vec());
            let program = argv[0].as_str();
            if self.failing.as_deref() == Some(program) {
                return Err(XuezhError::ProcessFailed {
                    argv: argv.to_vec(),
                    exit_code: Some(1),
                    stderr: format!("{program}: boom"),
                });
            }
            match program {
                "ffmpeg" => std::fs::write(argv.last().unwrap(), b"RIFFfake").unwrap(),
                "edge-tts" => std::fs::write(arg_after(argv, "--write-media"), b"ID3fake").unwrap(),
                "whisper" => {
                    let stem = Path::new(&argv[1]).file_stem().unwrap().to_string_lossy();
                    let out = Path::new(arg_after(argv, "--output_dir")).join(format!("{stem}.json"));
                    let doc = json!({
                        "text": " 你好 ",
                        "segments": [{"start": 0.0, "end": 1.2, "text": " 你好 "}],
                        "language": "zh"
                    });
                    std::fs::write(out, doc.to_string()).unwrap();
                }
                _ => {}
            }
            Ok(ProcessOutput::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_voice_alias() {
        assert_eq!(resolve_voice("XiaoxiaoNeural"), "zh-CN-XiaoxiaoNeural");
        assert_eq!(resolve_voice("zh-CN-YunxiNeural"), "zh-CN-YunxiNeural");
    }

    #[test]
    fn test_convert_argv_wav() {
        let argv = convert_argv(Path::new("in.m4a"), Path::new("out.wav"), AudioFormat::Wav);
        assert_eq!(
            argv,
            [
                "ffmpeg", "-y", "-hide_banner", "-loglevel", "error", "-i", "in.m4a", "-ac", "1",
                "-ar", "16000", "-c:a", "pcm_s16le", "out.wav"
            ]
        );
    }

    #[test]
    fn test_convert_argv_ogg_uses_opus() {
        let argv = convert_argv(Path::new("a.wav"), Path::new("b.ogg"), AudioFormat::Ogg);
        assert!(argv.windows(2).any(|w| w == ["-c:a", "libopus"]));
        assert_eq!(argv.last().map(String::as_str), Some("b.ogg"));
    }

    #[test]
    fn test_existing_input_reports_missing_file() {
        let err = existing_input("/no/such/recording.m4a").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Input file not found: /no/such/recording.m4a"
        );
    }
}
