//! In-memory keyed mutual exclusion, scoped to this process.
//!
//! Used by the daemon to serialize `lint`/`test` runs for the same
//! project so concurrent connections don't spawn overlapping child
//! processes. Unaware of the file-system lock manager used by direct-mode
//! hook clients (`lock::file`) -- the two are composed, never merged, per
//! spec.

use std::collections::HashMap;

use parking_lot::Mutex;

/// One held lock: who holds it and when they acquired it.
#[derive(Debug, Clone)]
struct LockRecord {
    holder: String,
    acquired_at_unix: u64,
}

/// A process-local lock table keyed by arbitrary strings.
///
/// Convention: keys look like `"<project-identifier>:<kind>"`. There is no
/// queueing, no fairness, and no reentrancy -- a contended `acquire` simply
/// fails immediately, and `release` trusts the caller to be the acquirer.
#[derive(Debug, Default)]
pub struct MemoryLockManager {
    locks: Mutex<HashMap<String, LockRecord>>,
}

impl MemoryLockManager {
    /// Create an empty lock table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically insert a lock record iff `key` is unused.
    ///
    /// Returns `true` on success, `false` if another holder already owns
    /// `key` (no blocking, no queueing).
    pub fn acquire(&self, key: &str, holder: &str, now_unix: u64) -> bool {
        let mut locks = self.locks.lock();
        if locks.contains_key(key) {
            return false;
        }
        locks.insert(
            key.to_string(),
            LockRecord {
                holder: holder.to_string(),
                acquired_at_unix: now_unix,
            },
        );
        true
    }

    /// Remove the record for `key` unconditionally. A no-op if unheld.
    pub fn release(&self, key: &str) {
        self.locks.lock().remove(key);
    }

    /// The current holder of `key`, if any (for diagnostics/tests).
    #[must_use]
    pub fn holder_of(&self, key: &str) -> Option<String> {
        self.locks.lock().get(key).map(|r| r.holder.clone())
    }
}

/// RAII guard that releases a `MemoryLockManager` key on drop, so every
/// exit path (including early `?` returns) releases the lock.
pub struct MemoryLockGuard<'a> {
    manager: &'a MemoryLockManager,
    key: String,
}

impl MemoryLockManager {
    /// Acquire `key`, returning a guard that releases it on drop.
    #[must_use]
    pub fn try_guard(&self, key: &str, holder: &str, now_unix: u64) -> Option<MemoryLockGuard<'_>> {
        if self.acquire(key, holder, now_unix) {
            Some(MemoryLockGuard {
                manager: self,
                key: key.to_string(),
            })
        } else {
            None
        }
    }
}

impl Drop for MemoryLockGuard<'_> {
    fn drop(&mut self) {
        self.manager.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_acquire_of_same_key_fails() {
        let mgr = MemoryLockManager::new();
        assert!(mgr.acquire("proj:lint", "server", 0));
        assert!(!mgr.acquire("proj:lint", "server", 0));
    }

    #[test]
    fn release_then_reacquire_succeeds() {
        let mgr = MemoryLockManager::new();
        assert!(mgr.acquire("proj:lint", "a", 0));
        mgr.release("proj:lint");
        assert!(mgr.acquire("proj:lint", "b", 0));
    }

    #[test]
    fn releasing_an_unheld_key_is_a_no_op() {
        let mgr = MemoryLockManager::new();
        mgr.release("never-held");
        assert!(mgr.acquire("never-held", "a", 0));
    }

    #[test]
    fn distinct_keys_never_contend() {
        let mgr = MemoryLockManager::new();
        assert!(mgr.acquire("proj:lint", "a", 0));
        assert!(mgr.acquire("proj:test", "a", 0));
    }

    #[test]
    fn guard_releases_on_drop() {
        let mgr = MemoryLockManager::new();
        {
            let _guard = mgr.try_guard("proj:lint", "a", 0).unwrap();
            assert!(mgr.try_guard("proj:lint", "b", 0).is_none());
        }
        assert!(mgr.try_guard("proj:lint", "b", 0).is_some());
    }
}
