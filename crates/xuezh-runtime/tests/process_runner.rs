//! Tests for `SystemProcessRunner` against real processes.

#![cfg(unix)]

use xuezh_core::{ErrorKind, ProcessRunner, XuezhError};
use xuezh_runtime::SystemProcessRunner;

fn argv(parts: &[&str]) -> Vec<String> {
    parts.iter().map(ToString::to_string).collect()
}

#[tokio::test]
async fn test_successful_command_captures_stdout() {
    let output = SystemProcessRunner::new()
        .run(&argv(&["sh", "-c", "echo 你好"]))
        .await
        .unwrap();
    assert_eq!(output.stdout.trim(), "你好");
    assert_eq!(output.exit_code, Some(0));
}

#[tokio::test]
async fn test_non_zero_exit_is_process_failed() {
    let err = SystemProcessRunner::new()
        .run(&argv(&["sh", "-c", "echo broken >&2; exit 3"]))
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::BackendFailed);
    match err {
        XuezhError::ProcessFailed {
            exit_code, stderr, ..
        } => {
            assert_eq!(exit_code, Some(3));
            assert_eq!(stderr.trim(), "broken");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_unknown_program_is_tool_missing() {
    let err = SystemProcessRunner::new()
        .run(&argv(&["xuezh-no-such-tool-42"]))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ToolMissing);
    assert_eq!(err.details()["tool"], "xuezh-no-such-tool-42");
}

#[tokio::test]
async fn test_ensure_tool() {
    let runner = SystemProcessRunner::new();
    assert!(runner.ensure_tool("sh").await.unwrap().is_absolute());
    let err = runner.ensure_tool("xuezh-no-such-tool-42").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ToolMissing);
}

#[tokio::test]
async fn test_empty_command_is_rejected() {
    let err = SystemProcessRunner::new().run(&[]).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidArgument);
}
