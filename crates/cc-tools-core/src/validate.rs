//! The parallel validator: discover lint and test commands for one edit,
//! run both concurrently, and combine their outcomes into a single
//! user-facing verdict.
//!
//! Neither child's failure cancels the other -- both must finish so both
//! failure messages can be shown in a single pass, per spec.md §4.8/§9.

use std::time::Duration;

use crate::capabilities::CommandRunner;
use crate::discovery::{DiscoveredCommand, Kind};
use crate::executor::{self, ExecutorResult};

/// The result for one kind within a validation round.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Which kind this result is for.
    pub kind: Kind,
    /// True if the command was not applicable (not discovered) or it ran
    /// and succeeded.
    pub success: bool,
    /// The discovered command, retained so failure messages can name it.
    pub command: Option<DiscoveredCommand>,
    /// The raw executor result, absent when the command was not discovered.
    pub executed: Option<ExecutorResult>,
}

/// The combined outcome of one validation round.
#[derive(Debug, Clone)]
pub struct ValidateOutcome {
    /// Lint result, `None` only if discovery found nothing.
    pub lint: Option<ValidationResult>,
    /// Test result, `None` only if discovery found nothing.
    pub test: Option<ValidationResult>,
    /// True when every executed kind succeeded or was not applicable.
    pub both_passed: bool,
}

/// Run lint and test discovery+execution concurrently and combine the
/// outcomes. `lint_cmd`/`test_cmd` are `None` when discovery found
/// nothing for that kind -- "not applicable", not a failure.
pub async fn validate(
    runner: &dyn CommandRunner,
    lint_cmd: Option<DiscoveredCommand>,
    test_cmd: Option<DiscoveredCommand>,
    lint_timeout: Duration,
    test_timeout: Duration,
) -> ValidateOutcome {
    if lint_cmd.is_none() && test_cmd.is_none() {
        return ValidateOutcome {
            lint: None,
            test: None,
            both_passed: true,
        };
    }

    let lint_fut = run_one(runner, Kind::Lint, lint_cmd, lint_timeout);
    let test_fut = run_one(runner, Kind::Test, test_cmd, test_timeout);
    let (lint, test) = tokio::join!(lint_fut, test_fut);

    let both_passed =
        lint.as_ref().map_or(true, |r| r.success) && test.as_ref().map_or(true, |r| r.success);

    ValidateOutcome {
        lint,
        test,
        both_passed,
    }
}

async fn run_one(
    runner: &dyn CommandRunner,
    kind: Kind,
    cmd: Option<DiscoveredCommand>,
    timeout: Duration,
) -> Option<ValidationResult> {
    let cmd = cmd?;
    let executed = executor::execute(runner, Some(&cmd), timeout).await;
    Some(ValidationResult {
        kind,
        success: executed.success,
        command: Some(cmd),
        executed: Some(executed),
    })
}

/// Compose the deterministic combined message for a completed
/// [`ValidateOutcome`]. Lint is always named before test in combined
/// failure prose, per the ordering guarantee in spec.md §4.8.
#[must_use]
pub fn format_message(outcome: &ValidateOutcome) -> String {
    if outcome.both_passed {
        return "👉 Lint and tests pass. Continue with your task.".to_string();
    }

    let lint_failed = outcome.lint.as_ref().is_some_and(|r| !r.success);
    let test_failed = outcome.test.as_ref().is_some_and(|r| !r.success);

    match (lint_failed, test_failed) {
        (true, true) => {
            let lint = outcome.lint.as_ref().and_then(|r| r.command.as_ref());
            let test = outcome.test.as_ref().and_then(|r| r.command.as_ref());
            let dir = lint
                .or(test)
                .map(|c| c.dir.display().to_string())
                .unwrap_or_default();
            format!(
                "⛔ BLOCKING: Lint and test failures. Run 'cd {dir} && {}' and '{}'",
                lint.map(DiscoveredCommand::display_command).unwrap_or_default(),
                test.map(DiscoveredCommand::display_command).unwrap_or_default(),
            )
        }
        (true, false) => single_failure_message(outcome.lint.as_ref(), "lint"),
        (false, true) => single_failure_message(outcome.test.as_ref(), "test"),
        (false, false) => "👉 Lint and tests pass. Continue with your task.".to_string(),
    }
}

fn single_failure_message(result: Option<&ValidationResult>, kind_name: &str) -> String {
    let Some(result) = result else {
        return "👉 Lint and tests pass. Continue with your task.".to_string();
    };
    let Some(cmd) = result.command.as_ref() else {
        return "👉 Lint and tests pass. Continue with your task.".to_string();
    };
    format!(
        "⛔ BLOCKING: Run 'cd {} && {}' to fix {kind_name} failures",
        cmd.dir.display(),
        cmd.display_command(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::SystemCommandRunner;
    use std::path::PathBuf;

    fn cmd(program: &str, args: &[&str]) -> DiscoveredCommand {
        DiscoveredCommand {
            dir: PathBuf::from("/proj"),
            program: program.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn both_absent_is_both_passed_with_no_children() {
        let outcome = validate(
            &SystemCommandRunner,
            None,
            None,
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
        .await;
        assert!(outcome.both_passed);
        assert!(outcome.lint.is_none());
        assert!(outcome.test.is_none());
    }

    #[tokio::test]
    async fn both_succeed_is_both_passed() {
        let lint = cmd("sh", &["-c", "exit 0"]);
        let test = cmd("sh", &["-c", "exit 0"]);
        let outcome = validate(
            &SystemCommandRunner,
            Some(lint),
            Some(test),
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
        .await;
        assert!(outcome.both_passed);
        assert_eq!(format_message(&outcome), "👉 Lint and tests pass. Continue with your task.");
    }

    #[tokio::test]
    async fn both_fail_produces_combined_message_naming_both_commands() {
        let lint = cmd("golangci-lint", &["run"]);
        let test = cmd("go", &["test", "./..."]);
        // Run via sh so the exit codes are deterministic without those
        // binaries installed, then substitute the real commands for the
        // message-formatting assertion.
        let outcome = ValidateOutcome {
            lint: Some(ValidationResult {
                kind: Kind::Lint,
                success: false,
                command: Some(lint),
                executed: None,
            }),
            test: Some(ValidationResult {
                kind: Kind::Test,
                success: false,
                command: Some(test),
                executed: None,
            }),
            both_passed: false,
        };
        assert_eq!(
            format_message(&outcome),
            "⛔ BLOCKING: Lint and test failures. Run 'cd /proj && golangci-lint run' and 'go test ./...'"
        );
    }

    #[tokio::test]
    async fn lint_only_failure_names_lint_command() {
        let lint = cmd("sh", &["-c", "exit 1"]);
        let test = cmd("sh", &["-c", "exit 0"]);
        let outcome = validate(
            &SystemCommandRunner,
            Some(lint),
            Some(test),
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
        .await;
        assert!(!outcome.both_passed);
        assert!(format_message(&outcome).contains("to fix lint failures"));
    }

    #[tokio::test]
    async fn test_only_failure_names_test_command() {
        let lint = cmd("sh", &["-c", "exit 0"]);
        let test = cmd("sh", &["-c", "exit 1"]);
        let outcome = validate(
            &SystemCommandRunner,
            Some(lint),
            Some(test),
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
        .await;
        assert!(!outcome.both_passed);
        assert!(format_message(&outcome).contains("to fix test failures"));
    }

    #[tokio::test]
    async fn one_command_absent_the_other_runs() {
        let test = cmd("sh", &["-c", "exit 0"]);
        let outcome = validate(
            &SystemCommandRunner,
            None,
            Some(test),
            Duration::from_secs(5),
            Duration::from_secs(5),
        )
        .await;
        assert!(outcome.lint.is_none());
        assert!(outcome.both_passed);
    }
}
