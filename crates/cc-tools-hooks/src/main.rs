//! `cc-tools-hook` -- the hook binary the external AI coding assistant
//! invokes after each tool call.
//!
//! Reads the hook envelope from standard input, tries the daemon first,
//! and falls back to running lint/test/validate directly in-process when
//! the daemon is unavailable or disabled. Exits 0 (silent) or 2 (message
//! on stderr) per the hook exit-code vocabulary; any other code would
//! signal an infrastructure failure to the assistant host and is never
//! emitted intentionally.

mod client;
mod orchestrator;
mod skip;

use std::io::{IsTerminal, Read};

use anyhow::Result;
use cc_tools_core::capabilities::Capabilities;
use cc_tools_core::hook::HookKind;
use cc_tools_core::EffectiveConfig;
use clap::{Parser, Subcommand};

use client::Client;

/// cc-tools hook client -- lint/test/validate/statusline for one tool edit.
#[derive(Parser, Debug)]
#[command(name = "cc-tools-hook", version, about = "Hook client for cc-tools lint/test/validate")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Commands {
    /// Run the project's lint command for the edited file.
    Lint,
    /// Run the project's test command for the edited file.
    Test,
    /// Run lint and test concurrently and report a combined verdict.
    Validate,
    /// Render a status line from the hook envelope.
    Statusline,
}

impl Commands {
    fn kind(self) -> HookKind {
        match self {
            Commands::Lint => HookKind::Lint,
            Commands::Test => HookKind::Test,
            Commands::Validate => HookKind::Validate,
            Commands::Statusline => HookKind::Statusline,
        }
    }
}

/// Read standard input to completion, or report "not piped" for a
/// terminal so the caller can return 0 without dialing anything.
fn read_stdin() -> Option<String> {
    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return None;
    }
    let mut buf = String::new();
    if stdin.lock().read_to_string(&mut buf).is_err() {
        return None;
    }
    Some(buf)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(&cli.log_level)
        .with_writer(std::io::stderr)
        .init();

    let Some(input) = read_stdin() else {
        std::process::exit(0);
    };

    let config = EffectiveConfig::from_env();
    let client = Client::new(Capabilities::production(), config);
    let (exit_code, message) = client.run(cli.command.kind(), &input).await;

    if !message.is_empty() {
        eprintln!("{message}");
    }

    std::process::exit(exit_code);
}
