//! Environment-derived effective configuration.
//!
//! This is deliberately *not* the general configuration loader named as an
//! external collaborator in spec.md §6 (`config.Load`) -- that collaborator
//! is responsible for project-level `.toml`/`.json` config files the hook
//! binaries consume for unrelated settings. This module reads only the
//! handful of environment variables the core itself is contractually
//! obligated to understand, once, at process start, so the rest of the
//! crate never calls `std::env::var` directly.

use std::path::PathBuf;
use std::time::Duration;

use crate::hook::HookKind;

fn env_flag(name: &str) -> bool {
    std::env::var(name).is_ok_and(|v| v == "1")
}

fn env_u64(name: &str) -> Option<u64> {
    std::env::var(name).ok().and_then(|v| v.parse::<u64>().ok())
}

/// Default executor deadline for a hook kind, per spec.md §4.2.1
/// (lint 30s, test 60s, statusline 30s). `Validate` has no single
/// executor deadline of its own -- it runs lint and test concurrently
/// under their own deadlines -- but still needs a default here for the
/// file-system lock's cooldown bookkeeping, so it takes the slower of the
/// two (60s, test's default).
fn default_timeout(kind: HookKind) -> Duration {
    match kind {
        HookKind::Lint | HookKind::Statusline => Duration::from_secs(30),
        HookKind::Test | HookKind::Validate => Duration::from_secs(60),
    }
}

/// Default cooldown window for a hook kind's file-system lock.
///
/// The spec names no numeric default; 5 seconds matches the worked
/// example in spec.md §8 scenario 2 and is small enough not to feel
/// sticky to a developer re-saving a file.
const DEFAULT_COOLDOWN_SECS: u64 = 5;

/// Configuration resolved once from the environment at process start.
///
/// Carries no project-config-file knowledge (that remains
/// `config.Load`'s job) -- only the wire-level env vars spec.md §6 names.
#[derive(Debug, Clone)]
pub struct EffectiveConfig {
    debug: bool,
    server_disabled: bool,
    socket_path_override: Option<PathBuf>,
}

impl EffectiveConfig {
    /// Read the environment once.
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            debug: env_flag("CLAUDE_HOOKS_DEBUG"),
            server_disabled: env_flag("CC_TOOLS_NO_SERVER"),
            socket_path_override: std::env::var("CC_TOOLS_SOCKET").ok().map(PathBuf::from),
        }
    }

    /// `CLAUDE_HOOKS_DEBUG=1` enables verbose stderr logging in direct-mode
    /// clients.
    #[must_use]
    pub fn debug_enabled(&self) -> bool {
        self.debug
    }

    /// `CC_TOOLS_NO_SERVER=1` forces direct-mode execution, bypassing the
    /// daemon entirely.
    #[must_use]
    pub fn server_disabled(&self) -> bool {
        self.server_disabled
    }

    /// `CC_TOOLS_SOCKET`, if set, overrides the computed default socket
    /// path.
    #[must_use]
    pub fn socket_path_override(&self) -> Option<&PathBuf> {
        self.socket_path_override.as_ref()
    }

    /// The socket path to dial or listen on: the override if present,
    /// otherwise the computed default (§6).
    #[must_use]
    pub fn socket_path(&self) -> PathBuf {
        self.socket_path_override
            .clone()
            .unwrap_or_else(default_socket_path)
    }

    /// Executor deadline for `kind`, honoring `CLAUDE_HOOKS_<KIND>_TIMEOUT`
    /// (seconds) if set and positive, else the §4.2.1 default.
    #[must_use]
    pub fn timeout_for(&self, kind: HookKind) -> Duration {
        env_u64(&format!("CLAUDE_HOOKS_{}_TIMEOUT", kind.env_name()))
            .filter(|&v| v > 0)
            .map_or_else(|| default_timeout(kind), Duration::from_secs)
    }

    /// File-system lock cooldown for `kind`.
    ///
    /// Honors `CLAUDE_HOOKS_<KIND>_COOLDOWN` first, then -- for `Validate`
    /// only -- the `CC_TOOLS_HOOKS_VALIDATE_COOLDOWN_SECONDS` alias spec.md
    /// §6 names as its "counterpart". Both are documented in the source as
    /// accepting `>= 0`; see the deviation note in DESIGN.md.
    #[must_use]
    pub fn cooldown_for(&self, kind: HookKind) -> Duration {
        let primary = env_u64(&format!("CLAUDE_HOOKS_{}_COOLDOWN", kind.env_name()));
        let alias = if kind == HookKind::Validate {
            env_u64("CC_TOOLS_HOOKS_VALIDATE_COOLDOWN_SECONDS")
        } else {
            None
        };
        primary
            .or(alias)
            .map_or(Duration::from_secs(DEFAULT_COOLDOWN_SECS), Duration::from_secs)
    }
}

impl Default for EffectiveConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// `$XDG_RUNTIME_DIR/cc-tools/server.sock`, or `$TMPDIR/cc-tools-<uid>.sock`
/// if `XDG_RUNTIME_DIR` is unset, per spec.md §6.
#[must_use]
pub fn default_socket_path() -> PathBuf {
    if let Ok(runtime_dir) = std::env::var("XDG_RUNTIME_DIR") {
        return PathBuf::from(runtime_dir).join("cc-tools").join("server.sock");
    }
    let tmp_dir = std::env::var("TMPDIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir());
    tmp_dir.join(format!("cc-tools-{}.sock", current_uid()))
}

#[cfg(unix)]
#[allow(unsafe_code)]
fn current_uid() -> u32 {
    // SAFETY: `getuid` takes no arguments and cannot fail.
    unsafe { libc::getuid() }
}

#[cfg(not(unix))]
fn current_uid() -> u32 {
    0
}
