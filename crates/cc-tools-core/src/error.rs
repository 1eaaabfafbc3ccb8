//! Error types for cc-tools-core.
//!
//! Each subsystem gets its own error enum so callers can pattern-match on
//! the failure kind without downcasting. `CoreError` is the umbrella type
//! the daemon and hook binaries actually propagate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from the protocol codec (`rpc` module).
#[derive(Debug, Error)]
pub enum CodecError {
    /// The line was not valid JSON.
    #[error("invalid JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// The decoded value had `jsonrpc != "2.0"`.
    #[error("invalid request: jsonrpc must be \"2.0\"")]
    InvalidRequest,

    /// The `id` field was a JSON array or object, which has no canonical
    /// string form.
    #[error("invalid request id: arrays and objects are not permitted")]
    InvalidId,
}

/// Errors from the command discovery resolver.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// The edited file's directory does not exist or could not be read.
    #[error("cannot read directory {path}: {source}")]
    Io {
        /// Directory that failed to read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the command executor.
#[derive(Debug, Error)]
pub enum ExecError {
    /// There was no command to execute.
    #[error("no command to execute")]
    NoCommand,

    /// The command exceeded its deadline and was killed.
    #[error("command timed out after {0:?}")]
    TimedOut(std::time::Duration),

    /// The child process could not be spawned, or was killed by a signal.
    #[error("failed to execute command: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Errors from the in-memory and file-system lock managers.
#[derive(Debug, Error)]
pub enum LockError {
    /// The lock file could not be written.
    #[error("failed to write lock file {path}: {source}")]
    Write {
        /// Lock file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Umbrella error type propagated by the daemon and hook binaries.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Codec failure.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Discovery failure.
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    /// Executor failure.
    #[error(transparent)]
    Exec(#[from] ExecError),

    /// Lock manager failure.
    #[error(transparent)]
    Lock(#[from] LockError),

    /// Generic I/O failure not covered by a more specific variant.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;
