//! Cross-process file-system locking with PID liveness and a cooldown
//! window.
//!
//! Used by direct-mode hook clients (and, transitively, by anything that
//! bypasses the daemon) to keep two concurrent hook invocations for the
//! same `(project, kind)` pair from running lint/test simultaneously.
//! Paths are part of the public wire contract: the daemon and the
//! standalone hook binaries must derive the identical path for the same
//! inputs, which is why the hashing scheme lives here rather than being
//! left to each caller.

use std::path::PathBuf;
use std::time::Duration;

use sha2::{Digest, Sha256};

use crate::capabilities::Capabilities;
use crate::error::LockError;

/// Derive the deterministic lock-file path for a `(project root, kind)`
/// pair: `claude-hook-<kind>-<first 8 hex bytes of sha256(project root)>.lock`
/// inside the system temp directory.
#[must_use]
pub fn lock_path(caps: &Capabilities, project_root: &str, kind: &str) -> PathBuf {
    let mut hasher = Sha256::new();
    hasher.update(project_root.as_bytes());
    let digest = hasher.finalize();
    let short_hex = hex::encode(&digest[..8]);
    caps.fs
        .temp_dir()
        .join(format!("claude-hook-{kind}-{short_hex}.lock"))
}

/// A cross-process lock file keyed by a deterministic path.
pub struct FileLock {
    path: PathBuf,
}

/// Outcome of [`FileLock::try_acquire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The lock was acquired; the caller now owns it until `release`.
    Acquired,
    /// Another live process holds the lock.
    HeldByLiveProcess,
    /// The lock was released recently and the cooldown has not elapsed.
    Cooldown,
}

impl FileLock {
    /// Build a lock handle for an already-derived path.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Attempt to acquire the lock on behalf of `our_pid`.
    ///
    /// Malformed PID or timestamp lines in an existing lock file are
    /// treated as absent rather than as errors, per spec.
    pub fn try_acquire(
        &self,
        caps: &Capabilities,
        our_pid: u32,
        cooldown: Duration,
    ) -> Result<AcquireOutcome, LockError> {
        // An absent file and an unreadable one (e.g. stale permissions)
        // both fall through to the write/acquire step below -- spec.md
        // §4.9 step 1 treats "unreadable" the same as "absent", and §3's
        // lock-file invariant says stale files are tolerated and
        // overwritten, not treated as a hard failure.
        if let Some(contents) = caps.fs.read_to_string(&self.path).unwrap_or(None) {
            let mut lines = contents.lines();
            let pid_line = lines.next().unwrap_or("").trim();
            let ts_line = lines.next().unwrap_or("").trim();

            if let Ok(pid) = pid_line.parse::<u32>() {
                if caps.process.is_alive(pid) {
                    return Ok(AcquireOutcome::HeldByLiveProcess);
                }
            }

            if let Ok(ts) = ts_line.parse::<u64>() {
                let now = caps.clock.now_unix();
                if now.saturating_sub(ts) < cooldown.as_secs() {
                    return Ok(AcquireOutcome::Cooldown);
                }
            }
        }

        caps.fs
            .write(&self.path, &format!("{our_pid}\n"), 0o600)
            .map_err(|source| LockError::Write {
                path: self.path.clone(),
                source,
            })?;

        Ok(AcquireOutcome::Acquired)
    }

    /// Release the lock: write an empty PID line and the current
    /// timestamp, so the next `try_acquire` sees no live holder and can
    /// apply the cooldown window.
    ///
    /// Idempotent -- safe to call from every exit path, held or not.
    pub fn release(&self, caps: &Capabilities) -> Result<(), LockError> {
        let now = caps.clock.now_unix();
        caps.fs
            .write(&self.path, &format!("\n{now}\n"), 0o600)
            .map_err(|source| LockError::Write {
                path: self.path.clone(),
                source,
            })
    }
}
