//! The assistant's tool-event envelope.
//!
//! Parses the JSON the external AI coding assistant emits on every tool
//! invocation, and classifies whether that invocation is one the daemon
//! should act on.

use serde::{Deserialize, Serialize};

/// The set of tool names that represent a file edit.
const EDIT_TOOLS: &[&str] = &["Edit", "MultiEdit", "Write", "NotebookEdit"];

/// One of the four kinds of hook invocation named in the glossary.
///
/// `Lint` and `Test` map directly onto [`crate::discovery::Kind`]; `Validate`
/// runs both concurrently via [`crate::validate`] and owns its own
/// file-system lock and environment-variable namespace; `Statusline` never
/// locks and has no discovery/executor involvement at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HookKind {
    /// Lint/static-analysis hook.
    Lint,
    /// Test-suite hook.
    Test,
    /// Combined lint+test hook run by the parallel validator.
    Validate,
    /// Status-line rendering hook. Never locks.
    Statusline,
}

impl HookKind {
    /// Lowercase name used in lock-file names, JSON-RPC methods, and the
    /// `CLAUDE_HOOKS_<KIND>_*` / `CC_TOOLS_HOOKS_VALIDATE_*_SECONDS`
    /// environment variable namespaces.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            HookKind::Lint => "lint",
            HookKind::Test => "test",
            HookKind::Validate => "validate",
            HookKind::Statusline => "statusline",
        }
    }

    /// The uppercase form used in `CLAUDE_HOOKS_<KIND>_TIMEOUT`-style
    /// environment variable names.
    #[must_use]
    pub fn env_name(self) -> &'static str {
        match self {
            HookKind::Lint => "LINT",
            HookKind::Test => "TEST",
            HookKind::Validate => "VALIDATE",
            HookKind::Statusline => "STATUSLINE",
        }
    }
}

/// The event envelope the assistant emits on each tool invocation.
///
/// Unknown fields are ignored (the assistant host may add fields this
/// daemon never looks at).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HookEnvelope {
    /// Event name, e.g. `"PostToolUse"`.
    pub hook_event_name: String,
    /// Session id for the assistant conversation.
    #[serde(default)]
    pub session_id: String,
    /// Path to the session transcript.
    #[serde(default)]
    pub transcript_path: String,
    /// Working directory the tool ran in.
    #[serde(default)]
    pub cwd: String,
    /// Name of the invoked tool, e.g. `"Edit"`.
    pub tool_name: String,
    /// Opaque tool-specific input.
    #[serde(default)]
    pub tool_input: serde_json::Value,
}

impl HookEnvelope {
    /// True only for `PostToolUse` events whose tool is in the edit set.
    #[must_use]
    pub fn is_edit_tool(&self) -> bool {
        self.hook_event_name == "PostToolUse" && EDIT_TOOLS.contains(&self.tool_name.as_str())
    }

    /// The edited file's path, or the empty string if absent/null/non-string.
    ///
    /// `NotebookEdit` reads `tool_input.notebook_path`; every other edit
    /// tool reads `tool_input.file_path`.
    #[must_use]
    pub fn file_path(&self) -> String {
        let key = if self.tool_name == "NotebookEdit" {
            "notebook_path"
        } else {
            "file_path"
        };
        self.tool_input
            .get(key)
            .and_then(serde_json::Value::as_str)
            .unwrap_or_default()
            .to_string()
    }
}

/// The result of attempting to read a hook envelope from stdin.
pub enum StdinEnvelope {
    /// A well-formed envelope was read.
    Parsed(HookEnvelope),
    /// Stdin was not piped (a terminal) -- distinguished from a parse
    /// failure so the orchestrator can treat it as a silent success
    /// rather than a blocking error.
    NotPiped,
    /// Stdin was piped but did not contain valid JSON.
    Invalid(serde_json::Error),
}

/// Read and parse the hook envelope from standard input.
///
/// A terminal stdin (nothing piped) yields [`StdinEnvelope::NotPiped`],
/// distinguished from a JSON parse failure per spec.md §4.4/§8.
#[must_use]
pub fn read_stdin_envelope() -> StdinEnvelope {
    use std::io::{IsTerminal, Read};

    let stdin = std::io::stdin();
    if stdin.is_terminal() {
        return StdinEnvelope::NotPiped;
    }

    let mut buf = String::new();
    if stdin.lock().read_to_string(&mut buf).is_err() {
        return StdinEnvelope::NotPiped;
    }

    match serde_json::from_str::<HookEnvelope>(&buf) {
        Ok(envelope) => StdinEnvelope::Parsed(envelope),
        Err(e) => StdinEnvelope::Invalid(e),
    }
}
