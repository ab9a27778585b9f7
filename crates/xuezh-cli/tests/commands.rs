//! End-to-end handler tests with in-process tool runners.
//!
//! Nothing here spawns real tools. `ScriptedRunner` reports tools as missing
//! or fails every command; `ToolRunner` writes the files each tool would.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};

use xuezh_cli::handlers::dispatch;
use xuezh_cli::{AudioCommands, CliConfig, Commands, Envelope};
use xuezh_core::{ErrorKind, ProcessOutput, ProcessRunner, XuezhError};

#[derive(Default)]
struct ScriptedRunner {
    missing: Vec<&'static str>,
}

impl ScriptedRunner {
    fn missing(tools: &[&'static str]) -> Self {
        Self {
            missing: tools.to_vec(),
        }
    }
}

#[async_trait]
impl ProcessRunner for ScriptedRunner {
    async fn ensure_tool(&self, tool: &str) -> Result<PathBuf, XuezhError> {
        if self.missing.iter().any(|m| *m == tool) {
            return Err(XuezhError::ToolMissing {
                tool: tool.to_string(),
            });
        }
        Ok(PathBuf::from("/usr/bin").join(tool))
    }

    async fn run(&self, argv: &[String]) -> Result<ProcessOutput, XuezhError> {
        Err(XuezhError::ProcessFailed {
            argv: argv.to_vec(),
            exit_code: Some(1),
            stderr: "boom\n".to_string(),
        })
    }
}

/// Succeeds for every tool and writes the files it would have produced.
struct ToolRunner;

fn arg_after<'a>(argv: &'a [String], flag: &str) -> &'a str {
    let pos = argv.iter().position(|a| a == flag).unwrap();
    &argv[pos + 1]
}

#[async_trait]
impl ProcessRunner for ToolRunner {
    async fn ensure_tool(&self, tool: &str) -> Result<PathBuf, XuezhError> {
        Ok(PathBuf::from("/usr/bin").join(tool))
    }

    async fn run(&self, argv: &[String]) -> Result<ProcessOutput, XuezhError> {
        match argv[0].as_str() {
            "ffmpeg" => std::fs::write(argv.last().unwrap(), b"OggSfake").unwrap(),
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

fn recording(dir: &Path) -> String {
    let path = dir.join("take.m4a");
    std::fs::write(&path, b"m4a").unwrap();
    path.to_string_lossy().into_owned()
}

fn process_voice(input: &str) -> Commands {
    Commands::Audio {
        command: AudioCommands::ProcessVoice {
            input: Some(input.to_string()),
            ref_text: Some("你好".into()),
            backend: Some("local".into()),
            item_id: None,
        },
    }
}

fn config(dir: &Path, extra: &[(&str, &str)]) -> CliConfig {
    let mut vars = vec![
        (
            "XUEZH_WORKSPACE_DIR".to_string(),
            dir.join("ws").to_string_lossy().into_owned(),
        ),
        (
            "XDG_CONFIG_HOME".to_string(),
            dir.join("config").to_string_lossy().into_owned(),
        ),
    ];
    vars.extend(extra.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())));
    CliConfig::from_vars(vars)
        .unwrap()
        .with_runner(Arc::new(ScriptedRunner::default()))
}

async fn run(command: Commands, config: &CliConfig) -> Value {
    let name = command.name();
    let envelope = Envelope::from_result(name, dispatch(&command, config).await);
    serde_json::from_str(&envelope.render().unwrap()).unwrap()
}

fn convert(input: Option<&str>, out: Option<&str>, format: Option<&str>) -> Commands {
    Commands::Audio {
        command: AudioCommands::Convert {
            input: input.map(str::to_string),
            out: out.map(str::to_string),
            format: format.map(str::to_string),
            backend: None,
        },
    }
}

#[tokio::test]
async fn version_reports_package_version() {
    let dir = tempfile::tempdir().unwrap();
    let value = run(Commands::Version, &config(dir.path(), &[])).await;

    assert_eq!(value["ok"], true);
    assert_eq!(value["schema_version"], "1");
    assert_eq!(value["command"], "version");
    assert_eq!(value["data"]["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(value["artifacts"], json!([]));
    assert_eq!(value["limits"], json!({}));
}

#[tokio::test]
async fn convert_requires_all_arguments() {
    let dir = tempfile::tempdir().unwrap();
    let value = run(
        convert(None, Some("out.ogg"), None),
        &config(dir.path(), &[]),
    )
    .await;

    assert_eq!(value["ok"], false);
    assert_eq!(value["command"], "audio.convert");
    assert_eq!(value["error"]["type"], "INVALID_ARGUMENT");
    assert_eq!(value["error"]["message"], "in, out, and format are required");
    assert_eq!(
        value["error"]["details"],
        json!({"in": "", "out": "out.ogg", "format": ""})
    );
    assert!(!dir.path().join("ws").exists());
}

#[tokio::test]
async fn convert_missing_input_is_invalid_argument() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.m4a");
    let value = run(
        convert(Some(&missing.to_string_lossy()), Some("out/clip.ogg"), Some("ogg")),
        &config(dir.path(), &[]),
    )
    .await;

    let error = &value["error"];
    assert_eq!(error["type"], "INVALID_ARGUMENT");
    assert!(
        error["message"]
            .as_str()
            .unwrap()
            .starts_with("Input file not found")
    );
    assert_eq!(error["details"]["backend"], "ffmpeg");
    assert_eq!(error["details"]["format"], "ogg");
}

#[tokio::test]
async fn convert_unknown_format_fails_before_touching_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let value = run(
        convert(Some("in.wav"), Some("out.flac"), Some("flac")),
        &config(dir.path(), &[]),
    )
    .await;

    assert_eq!(value["error"]["type"], "INVALID_ARGUMENT");
    assert_eq!(value["error"]["message"], "Unsupported audio format: flac");
    assert!(!dir.path().join("ws").exists());
}

#[tokio::test]
async fn convert_backend_comes_from_environment() {
    let dir = tempfile::tempdir().unwrap();
    let value = run(
        convert(Some("in.wav"), Some("out.ogg"), Some("ogg")),
        &config(dir.path(), &[("XUEZH_AUDIO_CONVERT_BACKEND", "sox")]),
    )
    .await;

    assert_eq!(value["error"]["message"], "Unsupported backend: sox");
    assert_eq!(value["error"]["details"]["backend"], "sox");
}

#[tokio::test]
async fn convert_process_failure_reports_stage() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("take.m4a");
    std::fs::write(&input, b"not really audio").unwrap();

    let value = run(
        convert(Some(&input.to_string_lossy()), Some("out/clip.wav"), Some("wav")),
        &config(dir.path(), &[]),
    )
    .await;

    let error = &value["error"];
    assert_eq!(error["type"], "BACKEND_FAILED");
    assert_eq!(error["message"], "audio backend failed during conversion");
    assert_eq!(error["details"]["returncode"], 1);
    assert_eq!(error["details"]["stderr"], "boom");
    assert_eq!(error["details"]["cmd"][0], "ffmpeg");
    assert_eq!(error["details"]["out"], "out/clip.wav");
}

#[tokio::test]
async fn convert_success_reports_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let input = recording(dir.path());
    let config = config(dir.path(), &[]).with_runner(Arc::new(ToolRunner));

    let value = run(convert(Some(&input), Some("out/clip.ogg"), Some("ogg")), &config).await;

    assert_eq!(value["ok"], true);
    assert_eq!(value["command"], "audio.convert");
    assert_eq!(value["data"]["out"], "out/clip.ogg");
    assert_eq!(value["data"]["format"], "ogg");
    assert_eq!(value["data"]["backend"]["id"], "ffmpeg");
    assert_eq!(value["truncated"], false);
    assert_eq!(value["limits"], json!({}));

    let artifact = &value["artifacts"][0];
    assert_eq!(artifact["path"], "out/clip.ogg");
    assert_eq!(artifact["mime"], "audio/ogg");
    assert_eq!(artifact["purpose"], "converted_audio");
    assert!(dir.path().join("ws/out/clip.ogg").is_file());
}

#[tokio::test]
async fn process_voice_local_reports_exact_match() {
    let dir = tempfile::tempdir().unwrap();
    let input = recording(dir.path());
    let config = config(dir.path(), &[]).with_runner(Arc::new(ToolRunner));

    let value = run(process_voice(&input), &config).await;

    assert_eq!(value["ok"], true);
    assert_eq!(value["command"], "audio.process-voice");
    assert_eq!(value["truncated"], false);
    assert_eq!(value["limits"], json!({}));

    let data = &value["data"];
    assert_eq!(data["ref_text"], "你好");
    assert_eq!(data["backend"]["id"], "local");
    assert_eq!(data["assessment"]["exact_match"], true);
    assert_eq!(data["assessment"]["note"], "local_v0_placeholder");
    assert_eq!(data["transcript"]["text"], "你好");

    let purposes: Vec<&str> = value["artifacts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["purpose"].as_str().unwrap())
        .collect();
    assert_eq!(
        purposes,
        [
            "normalized_input",
            "transcript",
            "assessment",
            "feedback_voice_note"
        ]
    );
    let assessment_path = data["artifacts_index"]["assessment"].as_str().unwrap();
    assert!(dir.path().join("ws").join(assessment_path).is_file());
}

#[tokio::test]
async fn process_voice_small_inline_budget_truncates() {
    let dir = tempfile::tempdir().unwrap();
    let input = recording(dir.path());
    let config = config(dir.path(), &[("XUEZH_AUDIO_INLINE_MAX_BYTES", "10")])
        .with_runner(Arc::new(ToolRunner));

    let value = run(process_voice(&input), &config).await;

    assert_eq!(value["ok"], true);
    assert_eq!(value["truncated"], true);
    assert_eq!(value["limits"], json!({"inline_bytes_max": 10}));

    let data = &value["data"];
    assert_eq!(data["assessment"]["exact_match"], true);
    assert_eq!(
        data["assessment"]["spill_artifact"],
        data["artifacts_index"]["assessment"]
    );
    assert_eq!(
        data["transcript"]["spill_artifact"],
        data["artifacts_index"]["transcript"]
    );
    assert!(data["transcript"].get("text").is_none());
}

#[tokio::test]
async fn process_voice_missing_recording_leaves_no_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("gone.m4a");
    let config = config(dir.path(), &[]).with_runner(Arc::new(ToolRunner));

    let value = run(process_voice(&missing.to_string_lossy()), &config).await;

    assert_eq!(value["error"]["type"], "INVALID_ARGUMENT");
    assert_eq!(value["error"]["details"]["backend"], "local");
    let artifacts = dir.path().join("ws/artifacts");
    assert_eq!(std::fs::read_dir(artifacts).unwrap().count(), 0);
}

#[tokio::test]
async fn stt_spills_when_over_max_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("take.wav");
    std::fs::write(&input, b"RIFF").unwrap();
    let config = config(dir.path(), &[]).with_runner(Arc::new(ToolRunner));
    let command = Commands::Audio {
        command: AudioCommands::Stt {
            input: Some(input.to_string_lossy().into_owned()),
            backend: None,
            max_bytes: Some(1),
        },
    };

    let value = run(command, &config).await;

    assert_eq!(value["ok"], true);
    assert_eq!(value["truncated"], true);
    assert_eq!(value["limits"], json!({"inline_bytes_max": 1}));
    let artifacts = value["artifacts"].as_array().unwrap();
    assert_eq!(artifacts.len(), 2);
    assert_eq!(artifacts[0]["purpose"], "transcript");
    assert_eq!(artifacts[1]["purpose"], "stt_spill");
    assert_eq!(value["data"]["spill_artifact"], artifacts[1]["path"]);
}

#[tokio::test]
async fn tts_reports_missing_tool_with_inputs() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), &[])
        .with_runner(Arc::new(ScriptedRunner::missing(&["edge-tts"])));
    let command = Commands::Audio {
        command: AudioCommands::Tts {
            text: Some("你好".into()),
            out: Some("tts/hello.ogg".into()),
            voice: "XiaoxiaoNeural".into(),
            backend: None,
        },
    };
    let value = run(command, &config).await;

    let error = &value["error"];
    assert_eq!(value["command"], "audio.tts");
    assert_eq!(error["type"], "TOOL_MISSING");
    assert_eq!(error["message"], "Required tool not found: edge-tts");
    assert_eq!(
        error["details"],
        json!({
            "tool": "edge-tts",
            "text": "你好",
            "voice": "XiaoxiaoNeural",
            "out": "tts/hello.ogg",
            "backend": "edge-tts"
        })
    );
}

#[tokio::test]
async fn tts_requires_text_and_out() {
    let dir = tempfile::tempdir().unwrap();
    let command = Commands::Audio {
        command: AudioCommands::Tts {
            text: Some("  ".into()),
            out: None,
            voice: "XiaoxiaoNeural".into(),
            backend: None,
        },
    };
    let value = run(command, &config(dir.path(), &[])).await;
    assert_eq!(value["error"]["message"], "text and out are required");
}

#[tokio::test]
async fn process_voice_requires_input_and_reference() {
    let dir = tempfile::tempdir().unwrap();
    let command = Commands::Audio {
        command: AudioCommands::ProcessVoice {
            input: Some("take.m4a".into()),
            ref_text: None,
            backend: None,
            item_id: None,
        },
    };
    let value = run(command, &config(dir.path(), &[])).await;

    assert_eq!(value["command"], "audio.process-voice");
    assert_eq!(value["error"]["message"], "in and ref-text are required");
    assert_eq!(
        value["error"]["details"],
        json!({"in": "take.m4a", "ref_text": ""})
    );
}

#[tokio::test]
async fn process_voice_unknown_backend_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let command = Commands::Audio {
        command: AudioCommands::ProcessVoice {
            input: Some("take.m4a".into()),
            ref_text: Some("你好".into()),
            backend: Some("google".into()),
            item_id: None,
        },
    };
    let value = run(command, &config(dir.path(), &[])).await;

    assert_eq!(value["error"]["type"], "INVALID_ARGUMENT");
    assert_eq!(value["error"]["details"]["backend"], "google");
    assert_eq!(value["error"]["details"]["ref_text"], "你好");
}

#[tokio::test]
async fn stt_missing_tool() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("take.wav");
    std::fs::write(&input, b"RIFF").unwrap();
    let config = config(dir.path(), &[])
        .with_runner(Arc::new(ScriptedRunner::missing(&["whisper"])));
    let command = Commands::Audio {
        command: AudioCommands::Stt {
            input: Some(input.to_string_lossy().into_owned()),
            backend: None,
            max_bytes: None,
        },
    };
    let value = run(command, &config).await;

    assert_eq!(value["command"], "audio.stt");
    assert_eq!(value["error"]["type"], "TOOL_MISSING");
    assert_eq!(value["error"]["details"]["backend"], "whisper");
}

#[tokio::test]
async fn doctor_does_not_create_workspace() {
    let dir = tempfile::tempdir().unwrap();
    let config = config(dir.path(), &[("AZURE_SPEECH_KEY", "k")])
        .with_runner(Arc::new(ScriptedRunner::missing(&["whisper"])));
    let value = run(Commands::Doctor, &config).await;

    assert_eq!(value["ok"], true);
    assert!(!dir.path().join("ws").exists());

    let checks = value["data"]["checks"].as_array().unwrap();
    let names: Vec<&str> = checks.iter().map(|c| c["name"].as_str().unwrap()).collect();
    assert_eq!(
        names,
        [
            "workspace.path",
            "db.status",
            "tool.ffmpeg",
            "tool.edge-tts",
            "tool.whisper",
            "tool.azure-speech-sdk",
            "azure.speech.env",
        ]
    );

    assert_eq!(checks[0]["ok"], true);
    assert_eq!(checks[0]["details"]["exists"], false);
    assert_eq!(
        checks[0]["details"]["override"],
        dir.path().join("ws").to_string_lossy().as_ref()
    );
    assert_eq!(checks[1]["ok"], false);
    assert_eq!(checks[1]["details"]["override"], Value::Null);
    assert_eq!(checks[2]["details"]["path"], "/usr/bin/ffmpeg");
    assert_eq!(checks[4]["ok"], false);
    assert_eq!(checks[4]["details"]["path"], "");
    assert_eq!(checks[5]["details"]["version"], "rest");

    let azure = &checks[6];
    assert_eq!(azure["ok"], false);
    assert_eq!(azure["details"]["AZURE_SPEECH_KEY"], true);
    assert_eq!(azure["details"]["AZURE_SPEECH_REGION"], false);
}

#[tokio::test]
async fn doctor_counts_applied_migrations() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ws").join("db.sqlite3");
    let pool = xuezh_db::setup_database(&db_path).await.unwrap();
    pool.close().await;

    let value = run(Commands::Doctor, &config(dir.path(), &[])).await;
    let db = &value["data"]["checks"][1];
    assert_eq!(db["ok"], true);
    assert_eq!(db["details"]["exists"], true);
    assert_eq!(db["details"]["schema_migrations"], 1);
}

#[test]
fn failed_envelope_exits_nonzero() {
    let err = xuezh_cli::CliError::new(ErrorKind::NotFound, "gone");
    let envelope = Envelope::failure("doctor", err);
    assert_eq!(envelope.exit_code(), 1);
}
