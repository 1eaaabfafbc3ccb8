//! # cc-tools-core
//!
//! The request-serving core of cc-tools: a local developer-tools daemon
//! that runs lint/test commands on behalf of short-lived hook clients
//! invoked by an external AI coding assistant after each file edit.
//!
//! This crate is the shared library both binaries in the workspace depend
//! on. It owns no `main`, no socket listener, and no CLI surface -- those
//! live in `cc-tools-daemon` and `cc-tools-hooks` respectively, which
//! compose the modules below.
//!
//! ## Architecture
//!
//! - **`capabilities`** -- injectable clock/filesystem/process-liveness
//!   traits so the rest of the crate never touches `std::fs`/`std::time`
//!   directly.
//! - **`config`** -- environment-variable-driven effective configuration
//!   (timeouts, cooldowns, socket path, debug/disable flags).
//! - **`error`** -- per-subsystem `thiserror` enums plus the umbrella
//!   `CoreError`.
//! - **`rpc`** -- JSON-RPC 2.0 request/response types, the polymorphic
//!   request id, and the newline-delimited codec.
//! - **`hook`** -- the assistant's tool-event envelope and its edit-tool
//!   classification.
//! - **`discovery`** -- project-root-relative lint/test command selection.
//! - **`executor`** -- deadline-bound child process execution and the
//!   hook exit-code framing.
//! - **`lock`** -- the two-tier locking system: `lock::memory` (in-process)
//!   and `lock::file` (cross-process, PID + cooldown).
//! - **`validate`** -- the parallel lint+test validator.
//! - **`stats`** -- the daemon's request/error/connection counters.

// Workspace lints are inherited from Cargo.toml

pub mod capabilities;
pub mod config;
pub mod discovery;
pub mod error;
pub mod executor;
pub mod hook;
pub mod lock;
pub mod rpc;
pub mod stats;
pub mod validate;

pub use capabilities::Capabilities;
pub use config::EffectiveConfig;
pub use error::{CoreError, CoreResult};
