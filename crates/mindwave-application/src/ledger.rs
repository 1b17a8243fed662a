//! Trial ledger client.
//!
//! Maintains the local view of the globally shared per-dose trial counts.
//! Reads never block on the network: callers get the cached snapshot, the
//! fallback constant before the first successful fetch, and stale data
//! when the authority is unreachable. Only [`TrialLedger::claim`] talks
//! to the remote authority synchronously, and even that degrades to a
//! failed claim instead of an error.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use mindwave_core::clock::Clock;
use mindwave_core::config::LedgerConfig;
use mindwave_core::durable::StateRepository;
use mindwave_core::trial::{ClaimOutcome, TrialAuthority, TrialSnapshot};

/// Cached, polled client for the shared trial ledger.
pub struct TrialLedger {
    authority: Arc<dyn TrialAuthority>,
    clock: Arc<dyn Clock>,
    config: LedgerConfig,
    snapshot: RwLock<TrialSnapshot>,
    /// Durable mirror, written on refresh/claim so restarts start warm
    state_repository: Option<Arc<dyn StateRepository>>,
    poll_token: std::sync::Mutex<Option<CancellationToken>>,
}

impl TrialLedger {
    pub fn new(
        authority: Arc<dyn TrialAuthority>,
        clock: Arc<dyn Clock>,
        config: LedgerConfig,
    ) -> Self {
        Self {
            authority,
            clock,
            config,
            snapshot: RwLock::new(TrialSnapshot::default()),
            state_repository: None,
            poll_token: std::sync::Mutex::new(None),
        }
    }

    /// Attaches the durable store so the mirror survives restarts.
    pub fn with_state_repository(mut self, repository: Arc<dyn StateRepository>) -> Self {
        self.state_repository = Some(repository);
        self
    }

    /// Seeds the cache from a previously persisted mirror.
    ///
    /// Seeded data counts as never-fetched for staleness purposes: the
    /// first poll still refreshes it.
    pub async fn seed(&self, counts: std::collections::HashMap<String, u32>) {
        let mut snapshot = self.snapshot.write().await;
        if snapshot.fetched_at.is_none() {
            snapshot.counts = counts;
        }
    }

    /// Best-known remaining count for a dose. Never blocks on the network.
    pub async fn remaining(&self, dose_id: &str) -> u32 {
        self.snapshot.read().await.remaining(dose_id)
    }

    /// Copy of the current snapshot.
    pub async fn snapshot(&self) -> TrialSnapshot {
        self.snapshot.read().await.clone()
    }

    /// True when the cache is older than the staleness window.
    pub async fn is_stale(&self) -> bool {
        let snapshot = self.snapshot.read().await;
        match snapshot.fetched_at {
            Some(at) => self.clock.now_unix().saturating_sub(at) >= self.config.stale_after_secs,
            None => true,
        }
    }

    /// Fetches the full mapping from the authority.
    ///
    /// Stale-if-error: a failed fetch keeps the previous counts and only
    /// flags the snapshot as degraded.
    pub async fn refresh(&self) -> TrialSnapshot {
        match self.authority.fetch_counts().await {
            Ok(counts) => {
                let mut snapshot = self.snapshot.write().await;
                snapshot.counts = counts;
                snapshot.fetched_at = Some(self.clock.now_unix());
                snapshot.degraded = false;
                let result = snapshot.clone();
                drop(snapshot);
                self.persist_mirror(&result).await;
                result
            }
            Err(err) => {
                warn!(error = %err, "trial refresh failed, serving stale data");
                let mut snapshot = self.snapshot.write().await;
                snapshot.degraded = true;
                snapshot.clone()
            }
        }
    }

    /// Claims one trial unit through the remote atomic decrement.
    ///
    /// The decrement is linearized by the authority; the local cache is
    /// only updated from the authoritative `remaining` in the response.
    /// Transport errors and timeouts come back as failed claims, never
    /// as errors, so the UI can treat the dose as locked.
    pub async fn claim(&self, dose_id: &str, user_id: &str) -> ClaimOutcome {
        match self.authority.claim(dose_id, user_id).await {
            Ok(outcome) => {
                if outcome.success {
                    if let Some(remaining) = outcome.remaining {
                        let mut snapshot = self.snapshot.write().await;
                        snapshot.counts.insert(dose_id.to_string(), remaining);
                        let copy = snapshot.clone();
                        drop(snapshot);
                        self.persist_mirror(&copy).await;
                    }
                }
                outcome
            }
            Err(err) => {
                warn!(dose_id, error = %err, "trial claim failed");
                ClaimOutcome::denied(err.to_string())
            }
        }
    }

    async fn persist_mirror(&self, snapshot: &TrialSnapshot) {
        if let Some(repository) = &self.state_repository {
            for (dose_id, remaining) in &snapshot.counts {
                if let Err(err) = repository.set_trial_mirror(dose_id, *remaining).await {
                    debug!(error = %err, "failed to persist trial mirror");
                    break;
                }
            }
        }
    }

    /// Starts the background poll task.
    ///
    /// The task is owned by the ledger, refreshes on a fixed interval,
    /// and is independent of any UI surface. Calling this twice replaces
    /// (cancels) the previous poller.
    pub fn start_polling(self: &Arc<Self>) -> CancellationToken {
        let token = CancellationToken::new();
        let ledger = Arc::clone(self);
        let child = token.clone();
        let interval = Duration::from_secs(self.config.poll_interval_secs.max(1));
        tokio::spawn(async move {
            // First refresh right away so startup is not a full interval behind.
            ledger.refresh().await;
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        ledger.refresh().await;
                    }
                }
            }
            debug!("trial poll task stopped");
        });

        let mut slot = self.poll_token.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.replace(token.clone()) {
            previous.cancel();
        }
        token
    }

    /// Cancels the background poll task, if running.
    pub fn stop_polling(&self) {
        let mut slot = self.poll_token.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = slot.take() {
            token.cancel();
        }
    }
}

impl Drop for TrialLedger {
    fn drop(&mut self) {
        self.stop_polling();
    }
}
