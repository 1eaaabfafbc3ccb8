//! Command execution: run a discovered command under a deadline and
//! classify its outcome, then frame that outcome as the 0/2 exit-code
//! vocabulary the external assistant host understands.

use std::time::Duration;

use crate::capabilities::CommandRunner;
use crate::discovery::{DiscoveredCommand, Kind};
use crate::error::ExecError;

/// The outcome of one [`execute`] call. Lifecycle is exactly one call  --
/// never reused across runs.
#[derive(Debug, Clone)]
pub struct ExecutorResult {
    /// True only for a normal exit with status 0.
    pub success: bool,
    /// Process exit status, or -1 for signal kills, spawn failures, and
    /// deadline expiry.
    pub exit_code: i32,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
    /// True if the deadline was exceeded and the child was killed.
    pub timed_out: bool,
    /// Set for every non-success outcome except a plain non-zero exit,
    /// which is self-describing via `exit_code`.
    pub error: Option<ExecError>,
}

impl ExecutorResult {
    fn no_command() -> Self {
        Self {
            success: false,
            exit_code: 0,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: false,
            error: Some(ExecError::NoCommand),
        }
    }
}

/// Run `cmd` under `deadline` through `runner`. `cmd = None` is the
/// nil-command case: fails immediately without spawning anything.
pub async fn execute(
    runner: &dyn CommandRunner,
    cmd: Option<&DiscoveredCommand>,
    deadline: Duration,
) -> ExecutorResult {
    let Some(cmd) = cmd else {
        return ExecutorResult::no_command();
    };

    let outcome = runner
        .run(&cmd.program, &cmd.args, &cmd.dir, deadline)
        .await;

    if let Some(source) = outcome.spawn_error {
        return ExecutorResult {
            success: false,
            exit_code: -1,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: false,
            error: Some(ExecError::Spawn(std::io::Error::other(source))),
        };
    }

    if outcome.timed_out {
        return ExecutorResult {
            success: false,
            exit_code: -1,
            stdout: String::new(),
            stderr: String::new(),
            timed_out: true,
            error: Some(ExecError::TimedOut(deadline)),
        };
    }

    let exit_code = outcome.exit_code.unwrap_or(-1);
    let success = exit_code == 0;

    ExecutorResult {
        success,
        exit_code,
        stdout: String::from_utf8_lossy(&outcome.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&outcome.stderr).into_owned(),
        timed_out: false,
        error: if success {
            None
        } else {
            Some(ExecError::Spawn(std::io::Error::other(format!(
                "exited with status {exit_code}"
            ))))
        },
    }
}

/// Map an [`ExecutorResult`] onto the hook exit-code vocabulary: `0` is
/// always silent, `2` means "show this stderr message". A message
/// beginning with `⛔ BLOCKING:` halts the assistant; anything else is
/// advisory.
#[must_use]
pub fn execute_for_hook(
    cmd: Option<&DiscoveredCommand>,
    kind: Kind,
    result: &ExecutorResult,
) -> (i32, String) {
    if result.timed_out {
        return (
            2,
            format!(
                "⛔ BLOCKING: Command timed out after {}s",
                result
                    .error
                    .as_ref()
                    .and_then(|e| match e {
                        ExecError::TimedOut(d) => Some(d.as_secs()),
                        _ => None,
                    })
                    .unwrap_or_default()
            ),
        );
    }

    if result.success {
        let message = match kind {
            Kind::Lint => "👉 Lints pass. Continue with your task.".to_string(),
            Kind::Test => "👉 Tests pass. Continue with your task.".to_string(),
        };
        return (2, message);
    }

    let display = cmd.map(DiscoveredCommand::display_command).unwrap_or_default();
    let dir = cmd
        .map(|c| c.dir.display().to_string())
        .unwrap_or_default();
    (
        2,
        format!(
            "⛔ BLOCKING: Run 'cd {dir} && {display}' to fix {} failures",
            kind.as_str()
        ),
    )
}
