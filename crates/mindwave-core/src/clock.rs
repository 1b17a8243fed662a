//! Injectable clock abstraction.
//!
//! Services that depend on wall-clock time (ledger staleness, rate-limit
//! windows, journal timestamps) take an `Arc<dyn Clock>` so tests can
//! simulate time without real delays.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of "now" for time-dependent services.
pub trait Clock: Send + Sync {
    /// Current Unix time in whole seconds.
    fn now_unix(&self) -> u64;
}

/// Clock backed by the system wall clock.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_unix(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Convenience constructor for the default clock.
pub fn system_clock() -> Arc<dyn Clock> {
    Arc::new(SystemClock)
}
