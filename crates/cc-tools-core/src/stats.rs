//! Server statistics tracked by the daemon.
//!
//! Mirrors the teacher crate's `PerformanceMetrics` (same `Arc<Mutex<...>>`
//! shape) but tracks the much smaller set of counters this daemon's
//! `stats` method reports: uptime, request count, error count, and the
//! number of currently-open connections.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::RwLock;

use crate::capabilities::Clock;

/// Thread-safe counters for the daemon's `stats` method.
pub struct Stats {
    start_unix: u64,
    requests: AtomicU64,
    errors: AtomicU64,
    active_connections: RwLock<u64>,
}

impl Stats {
    /// Start tracking from "now" per the given clock.
    #[must_use]
    pub fn new(clock: &dyn Clock) -> Self {
        Self {
            start_unix: clock.now_unix(),
            requests: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            active_connections: RwLock::new(0),
        }
    }

    /// Record one handled request.
    pub fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    /// Record one error response.
    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    /// A connection was accepted.
    pub fn connection_opened(&self) {
        *self.active_connections.write() += 1;
    }

    /// A connection was closed.
    pub fn connection_closed(&self) {
        let mut n = self.active_connections.write();
        *n = n.saturating_sub(1);
    }

    /// Render the plain-text block the `stats` method returns.
    #[must_use]
    pub fn render(&self, clock: &dyn Clock, socket_path: &str) -> String {
        let uptime = clock.now_unix().saturating_sub(self.start_unix);
        format!(
            "uptime: {}s\nrequests: {}\nerrors: {}\nactive_connections: {}\nsocket: {}\n",
            uptime,
            self.requests.load(Ordering::Relaxed),
            self.errors.load(Ordering::Relaxed),
            *self.active_connections.read(),
            socket_path,
        )
    }
}
