//! Daemon client with fallback: try the server first, fall back to the
//! in-process orchestrator if the socket is absent, dialing fails, the
//! server errors, or the server is disabled.
//!
//! Emits a single `[CC-TOOLS] ✓/✗ ...` status line to stderr so a
//! developer watching hook output can see which path ran. Colors degrade
//! gracefully when stderr is not a terminal.

use std::sync::Arc;
use std::time::Duration;

use cc_tools_core::capabilities::Capabilities;
use cc_tools_core::discovery::DefaultRootFinder;
use cc_tools_core::hook::HookKind;
use cc_tools_core::rpc::codec;
use cc_tools_core::rpc::{Request, RequestId, Response, RunParams};
use cc_tools_core::EffectiveConfig;
use colored::Colorize;
use tokio::io::{AsyncBufRead, AsyncWriteExt, BufReader};
use tokio::net::UnixStream;

use crate::orchestrator::Orchestrator;
use crate::skip::DefaultSkipPredicate;

/// Dial timeout for the daemon socket. Short because falling back to
/// direct mode is always a safe, correct alternative.
const DIAL_TIMEOUT: Duration = Duration::from_secs(5);

/// Runs a hook request against the daemon when available, falling back
/// to direct in-process execution otherwise.
pub struct Client {
    caps: Capabilities,
    config: EffectiveConfig,
}

impl Client {
    /// Build a client over the production capabilities and environment.
    #[must_use]
    pub fn new(caps: Capabilities, config: EffectiveConfig) -> Self {
        Self { caps, config }
    }

    /// Run one hook invocation for `kind` given the already-read envelope
    /// JSON, preferring the daemon.
    ///
    /// Returns the exit code and the message to print to standard error.
    pub async fn run(&self, kind: HookKind, input: &str) -> (i32, String) {
        if self.config.server_disabled() {
            status_line(false, kind.as_str(), "server disabled, using direct mode");
            return self.run_direct(kind, input).await;
        }

        match self.try_server(kind, input).await {
            Ok(result) => {
                status_line(true, kind.as_str(), "");
                result
            }
            Err(e) => {
                status_line(false, kind.as_str(), &e.to_string());
                self.run_direct(kind, input).await
            }
        }
    }

    async fn run_direct(&self, kind: HookKind, input: &str) -> (i32, String) {
        let orchestrator = Orchestrator::new(
            self.caps.clone(),
            self.config.clone(),
            Arc::new(DefaultRootFinder),
            Arc::new(DefaultSkipPredicate),
        );
        orchestrator.run(input, kind).await
    }

    async fn try_server(&self, kind: HookKind, stdin_input: &str) -> anyhow::Result<(i32, String)> {
        let socket_path = self.config.socket_path();
        if !socket_path.exists() {
            anyhow::bail!("socket not found at {}", socket_path.display());
        }

        let stream = tokio::time::timeout(DIAL_TIMEOUT, UnixStream::connect(&socket_path))
            .await
            .map_err(|_| anyhow::anyhow!("dial timed out"))??;

        let (read_half, mut write_half) = stream.into_split();

        let req = Request {
            jsonrpc: "2.0".into(),
            id: RequestId::from(std::process::id() as u64),
            method: kind.as_str().into(),
            params: Some(serde_json::to_value(RunParams {
                input: stdin_input.to_string(),
                project: String::new(),
                timeout: 0,
            })?),
        };
        let encoded = codec::encode_request(&req)?;
        write_half.write_all(encoded.as_bytes()).await?;
        write_half.flush().await?;

        let mut reader = BufReader::new(read_half);
        let response = tokio::time::timeout(DIAL_TIMEOUT, read_response(&mut reader))
            .await
            .map_err(|_| anyhow::anyhow!("read timed out"))??;

        response_to_outcome(response)
    }
}

async fn read_response<R: AsyncBufRead + Unpin>(reader: &mut R) -> anyhow::Result<Response> {
    use tokio::io::AsyncBufReadExt;
    let mut line = String::new();
    loop {
        line.clear();
        let n = reader.read_line(&mut line).await?;
        if n == 0 {
            anyhow::bail!("connection closed before a response arrived");
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        return Ok(codec::decode_response(trimmed)?);
    }
}

fn response_to_outcome(response: Response) -> anyhow::Result<(i32, String)> {
    if let Some(err) = response.error {
        anyhow::bail!("server error {}: {}", err.code, err.message);
    }
    let result = response
        .result
        .ok_or_else(|| anyhow::anyhow!("response carried neither result nor error"))?;
    let via_server = result
        .meta
        .as_ref()
        .and_then(|m| m.get("via"))
        .is_some_and(|v| v == "server");
    if !via_server {
        anyhow::bail!("response missing meta.via = \"server\"");
    }
    Ok((result.exit_code.unwrap_or(0), result.output))
}

/// Print `[CC-TOOLS] ✓ Using server for <method>` or
/// `[CC-TOOLS] ✗ Server unavailable for <method> (error: <detail>)`.
fn status_line(used_server: bool, method: &str, detail: &str) {
    let line = if used_server {
        format!("[CC-TOOLS] {} Using server for {method}", "✓".green())
    } else if detail == "server disabled, using direct mode" {
        format!(
            "[CC-TOOLS] {} Server disabled, using direct mode for {method}",
            "✗".red()
        )
    } else {
        format!(
            "[CC-TOOLS] {} Server unavailable for {method} (error: {detail})",
            "✗".red()
        )
    };
    eprintln!("{line}");
}
