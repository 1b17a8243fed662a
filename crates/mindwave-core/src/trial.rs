//! Trial ledger domain model.
//!
//! A "trial" is one unit of a globally shared, decrementing promotional
//! allowance per dose. The true counts live behind the remote authority;
//! every local view is a best-effort cache.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Fallback count reported when no fetch has ever succeeded.
pub const DEFAULT_TRIALS: u32 = 420;

/// A point-in-time view of the dose-id -> remaining-count mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrialSnapshot {
    /// Remaining trials per dose id
    pub counts: HashMap<String, u32>,
    /// Unix seconds of the last successful fetch; `None` before the first
    pub fetched_at: Option<u64>,
    /// True when the latest refresh failed and this data is stale
    pub degraded: bool,
}

impl TrialSnapshot {
    /// Best-known remaining count for a dose.
    ///
    /// Falls back to [`DEFAULT_TRIALS`] when the dose was never fetched.
    pub fn remaining(&self, dose_id: &str) -> u32 {
        self.counts.get(dose_id).copied().unwrap_or(DEFAULT_TRIALS)
    }

    /// True once any fetch has succeeded. Callers use this to distinguish
    /// "loading" from "locked at zero".
    pub fn is_populated(&self) -> bool {
        self.fetched_at.is_some()
    }
}

/// Result of a claim against the remote authority.
///
/// Exhaustion (`success: false`) is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimOutcome {
    pub success: bool,
    #[serde(default)]
    pub remaining: Option<u32>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ClaimOutcome {
    pub fn granted(remaining: u32) -> Self {
        Self {
            success: true,
            remaining: Some(remaining),
            error: None,
        }
    }

    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            remaining: None,
            error: Some(reason.into()),
        }
    }
}

/// Remote authority that owns the true trial counts.
///
/// The decrement is linearized server-side; clients never decide claims
/// from their own cache.
#[async_trait]
pub trait TrialAuthority: Send + Sync {
    /// Fetches the full dose-id -> remaining mapping.
    async fn fetch_counts(&self) -> Result<HashMap<String, u32>>;

    /// Fetches the remaining count for a single dose.
    async fn remaining(&self, dose_id: &str) -> Result<u32>;

    /// Atomically claims one trial unit for a dose.
    async fn claim(&self, dose_id: &str, user_id: &str) -> Result<ClaimOutcome>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfetched_dose_falls_back_to_default() {
        let snapshot = TrialSnapshot::default();
        assert_eq!(snapshot.remaining("dmt"), DEFAULT_TRIALS);
        assert!(!snapshot.is_populated());
    }

    #[test]
    fn fetched_zero_is_distinguishable_from_unknown() {
        let mut snapshot = TrialSnapshot::default();
        snapshot.counts.insert("dmt".into(), 0);
        snapshot.fetched_at = Some(1_700_000_000);
        assert_eq!(snapshot.remaining("dmt"), 0);
        assert!(snapshot.is_populated());
    }
}
