//! Trial count endpoints.
//!
//! `GET /api/trials` returns the full dose-id -> remaining mapping;
//! `GET /api/trials/:dose_id` is the legacy single-count shape. Both are
//! served from the ledger cache and refreshed only when stale, so a
//! burst of clients costs at most one upstream fetch per staleness
//! window. Over-limit callers still get the last known counts with a
//! 429 so their UIs degrade instead of breaking.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tracing::debug;

use mindwave_application::{FixedWindowLimiter, RateDecision, TrialLedger};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<TrialLedger>,
    pub limiter: Arc<FixedWindowLimiter>,
}

/// Full-mapping response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialsPayload {
    /// Remaining trials per dose id
    pub counts: HashMap<String, u32>,
    /// True when served from cache without an upstream fetch
    pub cached: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Legacy single-dose response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrialPayload {
    pub dose_id: String,
    pub remaining: u32,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/trials", get(get_trials))
        .route("/api/trials/:dose_id", get(get_trial))
        .with_state(state)
}

async fn get_trials(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    let (status, retry_after, payload) = trials_response(&state, &addr.ip().to_string()).await;
    with_retry_after(status, retry_after, Json(payload))
}

async fn get_trial(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Path(dose_id): Path<String>,
) -> Response {
    let (status, retry_after, payload) = trial_response(&state, &addr.ip().to_string(), dose_id).await;
    with_retry_after(status, retry_after, Json(payload))
}

fn with_retry_after(
    status: StatusCode,
    retry_after: Option<u64>,
    body: impl IntoResponse,
) -> Response {
    match retry_after {
        Some(secs) => (status, [(header::RETRY_AFTER, secs.to_string())], body).into_response(),
        None => (status, body).into_response(),
    }
}

/// Builds the full-mapping response. Split from the handler so tests can
/// drive it without an HTTP stack.
async fn trials_response(state: &AppState, client_ip: &str) -> (StatusCode, Option<u64>, TrialsPayload) {
    if let RateDecision::Limited { retry_after_secs } = state.limiter.check(client_ip) {
        debug!(client_ip, "trials request rate limited");
        let snapshot = state.ledger.snapshot().await;
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Some(retry_after_secs),
            TrialsPayload {
                counts: snapshot.counts,
                cached: true,
                error: Some("rate limited".into()),
            },
        );
    }

    let (snapshot, cached) = if state.ledger.is_stale().await {
        (state.ledger.refresh().await, false)
    } else {
        (state.ledger.snapshot().await, true)
    };

    let error = snapshot
        .degraded
        .then(|| "trial service unavailable, serving last known counts".to_string());
    (
        StatusCode::OK,
        None,
        TrialsPayload {
            counts: snapshot.counts,
            cached,
            error,
        },
    )
}

async fn trial_response(
    state: &AppState,
    client_ip: &str,
    dose_id: String,
) -> (StatusCode, Option<u64>, TrialPayload) {
    if let RateDecision::Limited { retry_after_secs } = state.limiter.check(client_ip) {
        let remaining = state.ledger.remaining(&dose_id).await;
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Some(retry_after_secs),
            TrialPayload { dose_id, remaining },
        );
    }

    if state.ledger.is_stale().await {
        state.ledger.refresh().await;
    }
    let remaining = state.ledger.remaining(&dose_id).await;
    (StatusCode::OK, None, TrialPayload { dose_id, remaining })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mindwave_core::clock::Clock;
    use mindwave_core::config::{LedgerConfig, RateLimitConfig};
    use mindwave_core::error::{MindwaveError, Result};
    use mindwave_core::trial::{ClaimOutcome, TrialAuthority, DEFAULT_TRIALS};
    use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

    struct FakeClock(AtomicU64);

    impl FakeClock {
        fn advance(&self, secs: u64) {
            self.0.fetch_add(secs, Ordering::SeqCst);
        }
    }

    impl Clock for FakeClock {
        fn now_unix(&self) -> u64 {
            self.0.load(Ordering::SeqCst)
        }
    }

    struct FakeAuthority {
        counts: std::sync::Mutex<HashMap<String, u32>>,
        fail_fetch: AtomicBool,
        fetches: AtomicU32,
    }

    #[async_trait]
    impl TrialAuthority for FakeAuthority {
        async fn fetch_counts(&self) -> Result<HashMap<String, u32>> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_fetch.load(Ordering::SeqCst) {
                return Err(MindwaveError::gateway("upstream down", true));
            }
            Ok(self.counts.lock().unwrap().clone())
        }

        async fn remaining(&self, dose_id: &str) -> Result<u32> {
            Ok(self
                .counts
                .lock()
                .unwrap()
                .get(dose_id)
                .copied()
                .unwrap_or(0))
        }

        async fn claim(&self, _dose_id: &str, _user_id: &str) -> Result<ClaimOutcome> {
            Ok(ClaimOutcome::denied("not under test"))
        }
    }

    fn fixture(counts: &[(&str, u32)]) -> (AppState, Arc<FakeAuthority>, Arc<FakeClock>) {
        let authority = Arc::new(FakeAuthority {
            counts: std::sync::Mutex::new(
                counts.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            ),
            fail_fetch: AtomicBool::new(false),
            fetches: AtomicU32::new(0),
        });
        let clock = Arc::new(FakeClock(AtomicU64::new(50_000)));
        let ledger = Arc::new(TrialLedger::new(
            authority.clone(),
            clock.clone(),
            LedgerConfig::default(),
        ));
        let limiter = Arc::new(FixedWindowLimiter::new(
            RateLimitConfig {
                capacity: 3,
                window_secs: 60,
            },
            clock.clone(),
        ));
        (AppState { ledger, limiter }, authority, clock)
    }

    #[tokio::test]
    async fn first_request_fetches_then_cache_serves() {
        let (state, authority, _clock) = fixture(&[("dmt", 12)]);

        let (status, _, payload) = trials_response(&state, "1.1.1.1").await;
        assert_eq!(status, StatusCode::OK);
        assert!(!payload.cached);
        assert_eq!(payload.counts.get("dmt"), Some(&12));

        let (_, _, payload) = trials_response(&state, "1.1.1.1").await;
        assert!(payload.cached);
        assert_eq!(authority.fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stale_cache_refetches() {
        let (state, authority, clock) = fixture(&[("dmt", 12)]);
        trials_response(&state, "1.1.1.1").await;
        clock.advance(31);
        let (_, _, payload) = trials_response(&state, "1.1.1.1").await;
        assert!(!payload.cached);
        assert_eq!(authority.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn upstream_failure_degrades_with_last_known_counts() {
        let (state, authority, clock) = fixture(&[("dmt", 12)]);
        trials_response(&state, "1.1.1.1").await;

        authority.fail_fetch.store(true, Ordering::SeqCst);
        clock.advance(31);
        let (status, _, payload) = trials_response(&state, "1.1.1.1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.counts.get("dmt"), Some(&12));
        assert!(payload.error.is_some());
    }

    #[tokio::test]
    async fn over_limit_gets_429_with_cached_payload() {
        let (state, _, _) = fixture(&[("dmt", 12)]);
        for _ in 0..3 {
            let (status, _, _) = trials_response(&state, "9.9.9.9").await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, retry_after, payload) = trials_response(&state, "9.9.9.9").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert!(retry_after.is_some());
        // The body still carries the counts fetched earlier.
        assert_eq!(payload.counts.get("dmt"), Some(&12));
        assert_eq!(payload.error.as_deref(), Some("rate limited"));
    }

    #[tokio::test]
    async fn rate_limit_is_per_client() {
        let (state, _, _) = fixture(&[("dmt", 12)]);
        for _ in 0..3 {
            trials_response(&state, "9.9.9.9").await;
        }
        let (status, _, _) = trials_response(&state, "8.8.8.8").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn single_dose_endpoint_returns_remaining() {
        let (state, _, _) = fixture(&[("dmt", 12)]);
        let (status, _, payload) = trial_response(&state, "1.1.1.1", "dmt".into()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(payload.remaining, 12);
        assert_eq!(payload.dose_id, "dmt");
    }

    #[tokio::test]
    async fn unknown_dose_falls_back_before_first_fetch() {
        let (state, authority, _) = fixture(&[]);
        authority.fail_fetch.store(true, Ordering::SeqCst);
        let (_, _, payload) = trial_response(&state, "1.1.1.1", "dmt".into()).await;
        assert_eq!(payload.remaining, DEFAULT_TRIALS);
    }
}
