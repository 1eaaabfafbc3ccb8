//! End-to-end integration test: spawn the real `cc-tools-daemon` binary
//! bound to a scratch socket and drive it with raw JSON-RPC lines over a
//! blocking `UnixStream`, the same way a hook client would.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};

struct Daemon {
    child: Child,
    socket: PathBuf,
}

impl Daemon {
    fn spawn() -> Self {
        let dir = tempfile::tempdir().expect("tempdir");
        let socket = dir.path().join("cc-tools-test.sock");
        // Leak the tempdir so it outlives the daemon process; cleaned up
        // by the OS's tmp reaper, same as a real stale socket would be.
        std::mem::forget(dir);

        let child = Command::new(env!("CARGO_BIN_EXE_cc-tools-daemon"))
            .arg("--socket")
            .arg(&socket)
            .arg("--log-level")
            .arg("error")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .expect("spawn cc-tools-daemon");

        let deadline = Instant::now() + Duration::from_secs(5);
        while !socket.exists() {
            if Instant::now() > deadline {
                panic!("daemon did not create its socket in time");
            }
            std::thread::sleep(Duration::from_millis(20));
        }

        Self { child, socket }
    }

    fn connect(&self) -> UnixStream {
        let deadline = Instant::now() + Duration::from_secs(2);
        loop {
            match UnixStream::connect(&self.socket) {
                Ok(s) => return s,
                Err(_) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(e) => panic!("failed to connect to daemon socket: {e}"),
            }
        }
    }

    fn request_line(&self, line: &str) -> String {
        let mut stream = self.connect();
        stream.write_all(line.as_bytes()).unwrap();
        if !line.ends_with('\n') {
            stream.write_all(b"\n").unwrap();
        }
        let mut reader = BufReader::new(stream);
        let mut response = String::new();
        reader.read_line(&mut response).unwrap();
        response
    }
}

impl Drop for Daemon {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

#[test]
fn stats_method_returns_plain_text_block() {
    let daemon = Daemon::spawn();
    let resp = daemon.request_line(r#"{"jsonrpc":"2.0","id":1,"method":"stats"}"#);
    let value: serde_json::Value = serde_json::from_str(&resp).unwrap();

    assert_eq!(value["jsonrpc"], "2.0");
    assert_eq!(value["id"], "1");
    let output = value["result"]["output"].as_str().unwrap();
    assert!(output.contains("uptime:"));
    assert!(output.contains("requests:"));
    assert!(output.contains("socket:"));
}

#[test]
fn invalid_jsonrpc_version_yields_invalid_request_error() {
    let daemon = Daemon::spawn();
    let resp = daemon.request_line(r#"{"jsonrpc":"1.0","id":"1","method":"lint"}"#);
    let value: serde_json::Value = serde_json::from_str(&resp).unwrap();

    assert_eq!(value["error"]["code"], -32600);
}

#[test]
fn lint_with_no_input_edit_tool_is_a_silent_success() {
    let daemon = Daemon::spawn();
    let envelope = serde_json::json!({
        "hook_event_name": "PostToolUse",
        "tool_name": "Bash",
        "tool_input": {},
    })
    .to_string();
    let req = serde_json::json!({
        "jsonrpc": "2.0",
        "id": 42,
        "method": "lint",
        "params": { "input": envelope },
    });
    let resp = daemon.request_line(&req.to_string());
    let value: serde_json::Value = serde_json::from_str(&resp).unwrap();

    assert_eq!(value["id"], "42");
    assert_eq!(value["result"]["meta"]["via"], "server");
    assert_eq!(value["result"]["exit_code"], 0);
}

#[test]
fn unknown_method_yields_method_not_found() {
    let daemon = Daemon::spawn();
    let resp = daemon.request_line(r#"{"jsonrpc":"2.0","id":"x","method":"bogus"}"#);
    let value: serde_json::Value = serde_json::from_str(&resp).unwrap();

    assert_eq!(value["error"]["code"], -32601);
}

#[test]
fn request_id_round_trips_as_canonical_string() {
    let daemon = Daemon::spawn();
    let resp = daemon.request_line(r#"{"jsonrpc":"2.0","id":7,"method":"stats"}"#);
    let value: serde_json::Value = serde_json::from_str(&resp).unwrap();
    assert_eq!(value["id"], "7");
}
