//! The hook orchestrator: the end-to-end flow run by every direct-mode
//! hook invocation.
//!
//! parse envelope -> validate event/tool -> extract path -> skip check ->
//! find root -> acquire file-system lock -> discover -> execute -> emit.
//! Every early return is a silent, non-blocking success (exit 0); only the
//! final execute step may return exit 2. Errors in the earlier phases
//! collapse to silent success rather than surfacing infrastructure noise
//! to the assistant -- the file-system lock and the command itself are the
//! only things allowed to block.
//!
//! Takes the envelope as an already-read string rather than reading
//! standard input itself: the "no input" (terminal) case is decided once,
//! by the caller, before either this orchestrator or the daemon client is
//! invoked, so the two share identical input.

use std::path::Path;
use std::sync::Arc;

use cc_tools_core::capabilities::Capabilities;
use cc_tools_core::discovery::{RootFinder, WhichLookPath};
use cc_tools_core::executor;
use cc_tools_core::hook::{HookEnvelope, HookKind};
use cc_tools_core::lock::file::{lock_path, AcquireOutcome, FileLock};
use cc_tools_core::{discovery, validate, EffectiveConfig};

use crate::skip::SkipPredicate;

/// Everything the orchestrator needs to run one hook invocation outside
/// the daemon.
pub struct Orchestrator {
    caps: Capabilities,
    config: EffectiveConfig,
    root_finder: Arc<dyn RootFinder>,
    skip: Arc<dyn SkipPredicate>,
}

impl Orchestrator {
    /// Build an orchestrator over the production collaborators.
    #[must_use]
    pub fn new(
        caps: Capabilities,
        config: EffectiveConfig,
        root_finder: Arc<dyn RootFinder>,
        skip: Arc<dyn SkipPredicate>,
    ) -> Self {
        Self {
            caps,
            config,
            root_finder,
            skip,
        }
    }

    /// Run the `lint`/`test`/`validate` flow for one hook invocation.
    /// `input` is the raw hook envelope JSON; an empty string or invalid
    /// JSON both collapse to silent success, matching the "no input"
    /// and "validate-event" early returns.
    ///
    /// Returns the exit code and the message to print to stderr (an empty
    /// message means nothing to print).
    #[must_use]
    pub async fn run(&self, input: &str, kind: HookKind) -> (i32, String) {
        if input.is_empty() {
            return (0, String::new());
        }

        let envelope: HookEnvelope = match serde_json::from_str(input) {
            Ok(e) => e,
            Err(_) => return (0, String::new()),
        };

        if !envelope.is_edit_tool() {
            return (0, String::new());
        }

        let file_path = envelope.file_path();
        if file_path.is_empty() {
            return (0, String::new());
        }

        if self.skip.should_skip(Path::new(&file_path)) {
            return (0, String::new());
        }

        let file_dir = Path::new(&file_path)
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let root = self.root_finder.find_project_root(&file_dir);
        let root_str = root.display().to_string();

        let lock = FileLock::new(lock_path(&self.caps, &root_str, kind.as_str()));
        let our_pid = std::process::id();
        let cooldown = self.config.cooldown_for(kind);
        match lock.try_acquire(&self.caps, our_pid, cooldown) {
            Ok(AcquireOutcome::Acquired) => {}
            Ok(_) | Err(_) => return (0, String::new()),
        }
        let _release = ReleaseGuard {
            lock: &lock,
            caps: &self.caps,
        };

        match kind {
            HookKind::Lint | HookKind::Test => {
                let Some(disc_kind) = to_discovery_kind(kind) else {
                    return (0, String::new());
                };
                let look_path = WhichLookPath;
                let resolver = discovery::Resolver::new(&look_path);
                let cmd = resolver.discover(&root, disc_kind);
                if cmd.is_none() {
                    return (0, String::new());
                }
                let deadline = self.config.timeout_for(kind);
                let result = executor::execute(&*self.caps.runner, cmd.as_ref(), deadline).await;
                executor::execute_for_hook(cmd.as_ref(), disc_kind, &result)
            }
            HookKind::Validate => {
                let look_path = WhichLookPath;
                let resolver = discovery::Resolver::new(&look_path);
                let lint_cmd = resolver.discover(&root, discovery::Kind::Lint);
                let test_cmd = resolver.discover(&root, discovery::Kind::Test);
                if lint_cmd.is_none() && test_cmd.is_none() {
                    return (0, String::new());
                }
                let outcome = validate::validate(
                    &*self.caps.runner,
                    lint_cmd,
                    test_cmd,
                    self.config.timeout_for(HookKind::Lint),
                    self.config.timeout_for(HookKind::Test),
                )
                .await;
                (2, validate::format_message(&outcome))
            }
            HookKind::Statusline => (0, String::new()),
        }
    }
}

fn to_discovery_kind(kind: HookKind) -> Option<discovery::Kind> {
    match kind {
        HookKind::Lint => Some(discovery::Kind::Lint),
        HookKind::Test => Some(discovery::Kind::Test),
        HookKind::Validate | HookKind::Statusline => None,
    }
}

/// Releases the file-system lock on every exit path, success or not.
struct ReleaseGuard<'a> {
    lock: &'a FileLock,
    caps: &'a Capabilities,
}

impl Drop for ReleaseGuard<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.lock.release(self.caps) {
            tracing::debug!(error = %e, "failed to release file-system lock");
        }
    }
}
