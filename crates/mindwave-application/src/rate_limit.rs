//! Fixed-window request rate limiter.
//!
//! Guards the trials polling endpoint: N requests per window per client
//! address. Over-capacity callers are not failed outright; the endpoint
//! answers 429 with the last-known-good payload so client UIs degrade
//! instead of breaking.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;

use mindwave_core::clock::Clock;
use mindwave_core::config::RateLimitConfig;

/// Outcome of a rate-limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    /// Seconds until the current window rolls over
    Limited { retry_after_secs: u64 },
}

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: u64,
    count: u32,
}

/// Fixed-window counter keyed by client address.
pub struct FixedWindowLimiter {
    capacity: u32,
    window_secs: u64,
    clock: Arc<dyn Clock>,
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            capacity: config.capacity.max(1),
            window_secs: config.window_secs.max(1),
            clock,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// Records one request for `key` and decides whether it may proceed.
    pub fn check(&self, key: &str) -> RateDecision {
        let now = self.clock.now_unix();
        let mut windows = self.windows.lock().unwrap_or_else(|e| e.into_inner());

        // Opportunistic cleanup keeps the map bounded by active clients.
        windows.retain(|_, w| now.saturating_sub(w.started_at) < self.window_secs * 2);

        let window = windows.entry(key.to_string()).or_insert(Window {
            started_at: now,
            count: 0,
        });

        if now.saturating_sub(window.started_at) >= self.window_secs {
            window.started_at = now;
            window.count = 0;
        }

        if window.count >= self.capacity {
            let retry_after_secs =
                (window.started_at + self.window_secs).saturating_sub(now).max(1);
            return RateDecision::Limited { retry_after_secs };
        }

        window.count += 1;
        RateDecision::Allowed
    }
}
