//! The two-tier locking system: an in-memory lock manager for the daemon's
//! own connections, and a cross-process file-system lock manager for
//! direct-mode hook clients that bypass the daemon entirely.

pub mod file;
pub mod memory;

pub use file::{AcquireOutcome, FileLock};
pub use memory::{MemoryLockGuard, MemoryLockManager};
