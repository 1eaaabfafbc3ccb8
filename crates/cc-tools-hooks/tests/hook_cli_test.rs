//! End-to-end integration test: spawn the real `cc-tools-hook` binary with
//! `CC_TOOLS_NO_SERVER=1` (no daemon involved) and feed it hook envelopes
//! on stdin, asserting on its exit code and stderr.

use std::io::Write;
use std::process::{Command, Stdio};

fn run_hook(subcommand: &str, stdin: &str, extra_env: &[(&str, &str)]) -> (i32, String) {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_cc-tools-hook"));
    cmd.arg(subcommand)
        .env("CC_TOOLS_NO_SERVER", "1")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());
    for (k, v) in extra_env {
        cmd.env(k, v);
    }

    let mut child = cmd.spawn().expect("spawn cc-tools-hook");
    child
        .stdin
        .take()
        .unwrap()
        .write_all(stdin.as_bytes())
        .unwrap();
    let output = child.wait_with_output().expect("wait for cc-tools-hook");

    (
        output.status.code().unwrap_or(-1),
        String::from_utf8_lossy(&output.stderr).into_owned(),
    )
}

fn envelope(event: &str, tool: &str, input: serde_json::Value) -> String {
    serde_json::json!({
        "hook_event_name": event,
        "tool_name": tool,
        "tool_input": input,
    })
    .to_string()
}

#[test]
fn non_edit_tool_exits_zero_silently() {
    let input = envelope("PostToolUse", "Bash", serde_json::json!({}));
    let (code, stderr) = run_hook("lint", &input, &[]);
    assert_eq!(code, 0);
    assert!(stderr.contains("Server disabled"));
}

#[test]
fn empty_stdin_exits_zero() {
    let (code, _) = run_hook("lint", "", &[]);
    assert_eq!(code, 0);
}

#[test]
fn edit_in_empty_project_with_no_discoverable_command_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    let file = dir.path().join("notes.txt");
    std::fs::write(&file, "hello").unwrap();

    let input = envelope(
        "PostToolUse",
        "Edit",
        serde_json::json!({"file_path": file.to_string_lossy()}),
    );
    let (code, _) = run_hook("lint", &input, &[]);
    assert_eq!(code, 0);
}

#[test]
fn skipped_vendored_path_exits_zero() {
    let input = envelope(
        "PostToolUse",
        "Edit",
        serde_json::json!({"file_path": "/repo/node_modules/pkg/index.js"}),
    );
    let (code, _) = run_hook("lint", &input, &[]);
    assert_eq!(code, 0);
}

#[test]
fn server_disabled_status_line_is_written_to_stderr() {
    let input = envelope("PostToolUse", "Bash", serde_json::json!({}));
    let (_, stderr) = run_hook("lint", &input, &[]);
    assert!(stderr.contains("[CC-TOOLS]"));
    assert!(stderr.contains("direct mode for lint"));
}

#[test]
fn statusline_subcommand_never_blocks() {
    let input = envelope(
        "PostToolUse",
        "Edit",
        serde_json::json!({"file_path": "/tmp/x.rs"}),
    );
    let (code, _) = run_hook("statusline", &input, &[]);
    assert_eq!(code, 0);
}
