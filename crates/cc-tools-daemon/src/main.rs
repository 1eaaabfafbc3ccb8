//! `cc-tools-daemon` -- long-lived Unix-socket JSON-RPC server.
//!
//! Runs as a local background process on a developer workstation, serving
//! `lint`/`test`/`statusline`/`stats` requests from short-lived hook
//! clients so those clients return within interactive latency budgets and
//! concurrent edits to the same project never spawn overlapping lint/test
//! runs (spec.md §1).

mod dispatch;
mod server;

use anyhow::Result;
use cc_tools_core::capabilities::Capabilities;
use cc_tools_core::config::EffectiveConfig;
use clap::Parser;

/// cc-tools daemon -- persistent background lint/test runner.
#[derive(Parser, Debug)]
#[command(
    name = "cc-tools-daemon",
    version,
    about = "Unix-socket JSON-RPC server for cc-tools lint/test hooks"
)]
struct Args {
    /// Socket path override (defaults to `$XDG_RUNTIME_DIR/cc-tools/server.sock`
    /// or `$TMPDIR/cc-tools-<uid>.sock`; `CC_TOOLS_SOCKET` takes precedence
    /// over both).
    #[arg(long)]
    socket: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(&args.log_level)
        .with_writer(std::io::stderr)
        .init();

    let config = EffectiveConfig::from_env();
    let socket_path = args
        .socket
        .map(std::path::PathBuf::from)
        .or_else(|| config.socket_path_override().cloned())
        .unwrap_or_else(|| config.socket_path());

    tracing::info!(socket = %socket_path.display(), "starting cc-tools-daemon");

    server::run(socket_path, Capabilities::production()).await?;

    tracing::info!("daemon shut down");
    Ok(())
}
