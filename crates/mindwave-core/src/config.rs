//! Configuration models.
//!
//! Values are loaded once at process start by the infrastructure layer
//! (env vars first, then `~/.config/mindwave/config.toml`). The backend
//! section is required for any feature that persists remotely; pure-local
//! playback works without it.

use serde::{Deserialize, Serialize};

/// Hosted backend endpoint configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the hosted backend (e.g. `https://xyz.supabase.co`)
    pub url: String,
    /// Anonymous access key sent as `apikey` and bearer token
    pub anon_key: String,
    /// Deadline for the awaited trial claim call, in seconds.
    /// Timeout is treated as claim failure.
    #[serde(default = "default_claim_timeout_secs")]
    pub claim_timeout_secs: u64,
    /// General request timeout for fire-and-forget calls, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_claim_timeout_secs() -> u64 {
    5
}

fn default_request_timeout_secs() -> u64 {
    10
}

/// Trial ledger cache/poll tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Background poll interval in seconds
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    /// Cache staleness window in seconds
    #[serde(default = "default_stale_after_secs")]
    pub stale_after_secs: u64,
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_stale_after_secs() -> u64 {
    30
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            stale_after_secs: default_stale_after_secs(),
        }
    }
}

/// Fixed-window rate limiter tuning for the trials endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window per client address
    #[serde(default = "default_capacity")]
    pub capacity: u32,
    /// Window length in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
}

fn default_capacity() -> u32 {
    30
}

fn default_window_secs() -> u64 {
    60
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            window_secs: default_window_secs(),
        }
    }
}

/// Root application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RootConfig {
    /// Absent when running local-only
    #[serde(default)]
    pub backend: Option<BackendConfig>,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}
