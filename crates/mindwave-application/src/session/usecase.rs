//! Session use case.
//!
//! The facade the UI talks to: starting a trip (with the trial gate),
//! pausing/resuming, the early-exit confirmation policy, live parameter
//! changes, and journal/custom-trip authoring. Owns the driver token so
//! that stopping a session releases the timer, the audio voices, and the
//! haptic interval together.

use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use mindwave_core::clock::Clock;
use mindwave_core::dose::custom::CustomTrip;
use mindwave_core::dose::{Dose, FrequencyLayer, VisualType};
use mindwave_core::durable::StateRepository;
use mindwave_core::error::Result;
use mindwave_core::gateway::{ExitFeedback, PersistenceGateway, RatingSubmission};
use mindwave_core::journal::{JournalEntry, NewJournalEntry};
use mindwave_core::output::{AudioOutput, HapticOutput};
use mindwave_core::session::{SessionEvent, SessionSnapshot, SessionStore, TripPhase};

use crate::ledger::TrialLedger;

use super::{driver, SessionContext};

/// Progress ratio past which an exit no longer asks for confirmation.
const EARLY_EXIT_THRESHOLD: f64 = 0.9;

/// Who is asking for the session.
#[derive(Debug, Clone, Default)]
pub struct UserContext {
    /// Backend user id when authenticated
    pub user_id: Option<String>,
    /// Premium users bypass the trial gate entirely
    pub is_premium: bool,
}

/// Result of a start request.
#[derive(Debug, Clone, PartialEq)]
pub enum StartOutcome {
    Started,
    /// A session is already active; the request was a no-op
    AlreadyActive,
    /// The trial gate denied the start (exhausted or claim failure)
    Locked { reason: Option<String> },
}

/// Result of a stop request.
#[derive(Debug, Clone, PartialEq)]
pub enum StopDecision {
    /// Below the 90% mark: capture feedback before tearing down
    NeedsConfirmation { elapsed_secs: u32, total_secs: u32 },
    /// Torn down immediately
    Stopped,
}

/// Facade over the session store, driver, outputs, and trial gate.
pub struct SessionUsecase {
    ctx: Arc<SessionContext>,
    ledger: Arc<TrialLedger>,
    driver_token: Mutex<Option<CancellationToken>>,
    current_user: Mutex<Option<String>>,
}

impl SessionUsecase {
    pub fn new(
        audio: Arc<dyn AudioOutput>,
        haptics: Arc<dyn HapticOutput>,
        state_repository: Arc<dyn StateRepository>,
        gateway: Option<Arc<dyn PersistenceGateway>>,
        ledger: Arc<TrialLedger>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (events, _) = broadcast::channel(64);
        Self {
            ctx: Arc::new(SessionContext {
                store: Mutex::new(SessionStore::new()),
                events,
                audio,
                haptics,
                state_repository,
                gateway,
                clock,
            }),
            ledger,
            driver_token: Mutex::new(None),
            current_user: Mutex::new(None),
        }
    }

    /// Subscribes to session lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.ctx.events.subscribe()
    }

    /// Starts a trip.
    ///
    /// Premium doses consumed by non-premium users claim exactly one
    /// trial unit first; the await is bounded by the gateway's claim
    /// timeout, and any failure means `Locked`, never a crash.
    pub async fn start_trip(&self, dose: Dose, user: &UserContext) -> StartOutcome {
        if self.ctx.store.lock().await.is_active() {
            return StartOutcome::AlreadyActive;
        }

        if dose.is_premium && !user.is_premium {
            let user_id = user.user_id.as_deref().unwrap_or("anonymous");
            let outcome = self.ledger.claim(&dose.id, user_id).await;
            if !outcome.success {
                info!(dose_id = %dose.id, "trial claim denied, dose locked");
                return StartOutcome::Locked {
                    reason: outcome.error,
                };
            }
        }

        let (volume, intensity) = {
            let mut store = self.ctx.store.lock().await;
            if !store.start_trip(dose.clone()) {
                return StartOutcome::AlreadyActive;
            }
            (store.volume(), store.active().map(|s| s.intensity).unwrap_or(5))
        };

        self.ctx.audio.play(&dose.frequencies, volume, intensity);
        if let Some(beat) = primary_beat_freq(&dose.frequencies) {
            self.ctx.haptics.start_rhythmic(beat, intensity);
        }
        self.ctx.haptics.phase_pattern(TripPhase::Onset, intensity);

        *self.current_user.lock().await = user.user_id.clone();
        self.replace_driver(Some(driver::spawn(
            Arc::clone(&self.ctx),
            user.user_id.clone(),
        )))
        .await;

        self.ctx.emit(SessionEvent::Started { dose_id: dose.id });
        StartOutcome::Started
    }

    /// Pauses or resumes playback.
    ///
    /// Pausing cancels the driver timer outright; resuming spawns a
    /// fresh one, so there is never more than one outstanding timer.
    pub async fn toggle_play(&self) {
        let (playing, beat, intensity) = {
            let mut store = self.ctx.store.lock().await;
            let playing = store.toggle_play();
            let beat = store
                .active()
                .and_then(|s| primary_beat_freq(&s.dose.frequencies));
            let intensity = store.active().map(|s| s.intensity).unwrap_or(5);
            (playing, beat, intensity)
        };

        match playing {
            None => {}
            Some(false) => {
                self.replace_driver(None).await;
                self.ctx.audio.pause();
                self.ctx.haptics.stop();
                self.ctx.emit(SessionEvent::Paused);
            }
            Some(true) => {
                self.ctx.audio.resume();
                if let Some(beat) = beat {
                    self.ctx.haptics.start_rhythmic(beat, intensity);
                }
                let user_id = self.current_user.lock().await.clone();
                self.replace_driver(Some(driver::spawn(Arc::clone(&self.ctx), user_id)))
                    .await;
                self.ctx.emit(SessionEvent::Resumed);
            }
        }
    }

    /// Requests to end the session.
    ///
    /// Before 90% of the duration this only asks for confirmation; the
    /// session keeps running until [`SessionUsecase::confirm_stop`] (or
    /// a later request past the threshold) tears it down.
    pub async fn request_stop(&self) -> StopDecision {
        let early = {
            let store = self.ctx.store.lock().await;
            match store.active() {
                None => return StopDecision::Stopped,
                Some(s) => (s.progress() < EARLY_EXIT_THRESHOLD)
                    .then(|| (s.elapsed_secs, s.total_secs)),
            }
        };

        match early {
            Some((elapsed_secs, total_secs)) => StopDecision::NeedsConfirmation {
                elapsed_secs,
                total_secs,
            },
            None => {
                self.teardown().await;
                StopDecision::Stopped
            }
        }
    }

    /// Confirms an early exit, submitting the captured feedback.
    pub async fn confirm_stop(&self, reason: impl Into<String>, feedback: Option<String>) {
        let reason = reason.into();
        let ended = self.teardown().await;
        let (Some(ended), Some(gateway)) = (ended, self.ctx.gateway.clone()) else {
            return;
        };
        let user_id = self.current_user.lock().await.clone();
        let payload = ExitFeedback {
            dose_id: ended.dose.id,
            dose_name: ended.dose.name,
            elapsed_secs: ended.elapsed_secs,
            reason,
            feedback,
        };
        tokio::spawn(async move {
            if let Err(err) = gateway
                .submit_exit_feedback(user_id.as_deref(), &payload)
                .await
            {
                warn!(error = %err, "exit feedback submission failed");
            }
        });
    }

    /// Live intensity change, mirrored to audio and haptics.
    pub async fn set_intensity(&self, intensity: u8) {
        let beat = {
            let mut store = self.ctx.store.lock().await;
            store.set_intensity(intensity);
            store
                .active()
                .filter(|s| s.playing)
                .and_then(|s| primary_beat_freq(&s.dose.frequencies))
        };
        let intensity = intensity.clamp(1, 10);
        self.ctx.audio.set_intensity(intensity);
        if let Some(beat) = beat {
            self.ctx.haptics.start_rhythmic(beat, intensity);
        }
    }

    /// Live master-volume change.
    pub async fn set_volume(&self, volume: f32) {
        self.ctx.store.lock().await.set_volume(volume);
        self.ctx.audio.set_volume(volume.clamp(0.0, 1.0));
    }

    /// Swaps the visual strategy; audio, haptics, and timing are untouched.
    pub async fn set_visual(&self, visual: VisualType) {
        self.ctx.store.lock().await.set_visual(visual);
    }

    pub async fn toggle_controls(&self) {
        self.ctx.store.lock().await.toggle_controls();
    }

    pub async fn snapshot(&self) -> Option<SessionSnapshot> {
        self.ctx.store.lock().await.snapshot()
    }

    /// Adds a manually authored journal entry (local always, remote when
    /// authenticated).
    pub async fn add_journal_entry(&self, new: NewJournalEntry) -> Result<JournalEntry> {
        let entry = new.into_entry(self.ctx.clock.now_unix());
        self.ctx
            .state_repository
            .add_journal_entry(entry.clone())
            .await?;
        if let (Some(gateway), Some(user_id)) = (
            self.ctx.gateway.clone(),
            self.current_user.lock().await.clone(),
        ) {
            let remote_entry = entry.clone();
            tokio::spawn(async move {
                if let Err(err) = gateway.save_journal_entry(&user_id, &remote_entry).await {
                    warn!(error = %err, "journal sync failed");
                }
            });
        }
        Ok(entry)
    }

    /// Saves a custom trip to the durable store.
    pub async fn add_custom_trip(&self, trip: CustomTrip) -> Result<()> {
        self.ctx.state_repository.add_custom_trip(trip).await
    }

    /// Deletes a custom trip from the durable store.
    pub async fn delete_custom_trip(&self, id: &str) -> Result<()> {
        self.ctx.state_repository.delete_custom_trip(id).await
    }

    /// Submits a post-session rating, fire-and-forget.
    pub async fn submit_rating(&self, rating: RatingSubmission) {
        let (Some(gateway), Some(user_id)) = (
            self.ctx.gateway.clone(),
            self.current_user.lock().await.clone(),
        ) else {
            return;
        };
        tokio::spawn(async move {
            if let Err(err) = gateway.submit_rating(&user_id, &rating).await {
                warn!(error = %err, "rating submission failed");
            }
        });
    }

    /// Cancels the driver and releases all outputs; returns the capture
    /// when a session was actually active.
    async fn teardown(&self) -> Option<mindwave_core::session::EndedSession> {
        self.replace_driver(None).await;
        self.ctx.audio.stop();
        self.ctx.haptics.stop();
        let ended = self.ctx.store.lock().await.stop_trip();
        if let Some(ended) = &ended {
            self.ctx.emit(SessionEvent::Stopped {
                dose_id: ended.dose.id.clone(),
                elapsed_secs: ended.elapsed_secs,
            });
        }
        ended
    }

    async fn replace_driver(&self, token: Option<CancellationToken>) {
        let mut slot = self.driver_token.lock().await;
        if let Some(previous) = slot.take() {
            previous.cancel();
        }
        *slot = token;
    }
}

/// First audible beat frequency of a recipe, used to pace haptics.
fn primary_beat_freq(layers: &[FrequencyLayer]) -> Option<f64> {
    layers.iter().map(|l| l.beat_freq).find(|f| *f > 0.0)
}


#[cfg(test)]
mod tests {
    use super::tests_support::*;
    use super::*;
    use mindwave_core::dose::dose_by_id;
    use std::sync::atomic::Ordering;

    fn free_dose() -> Dose {
        dose_by_id("psilocybin").unwrap().clone()
    }

    fn premium_dose() -> Dose {
        dose_by_id("dmt").unwrap().clone()
    }

    #[tokio::test]
    async fn start_free_dose_never_claims() {
        let authority = FakeAuthority::with(&[("psilocybin", 10)]);
        let (usecase, audio, haptics, _) = usecase_with(authority.clone());

        let outcome = usecase
            .start_trip(free_dose(), &UserContext::default())
            .await;
        assert_eq!(outcome, StartOutcome::Started);
        assert_eq!(authority.claim_calls.load(Ordering::SeqCst), 0);
        assert_eq!(audio.plays.load(Ordering::SeqCst), 1);
        assert_eq!(haptics.rhythmic_starts.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn premium_dose_claims_exactly_once() {
        let authority = FakeAuthority::with(&[("dmt", 2)]);
        let (usecase, _, _, _) = usecase_with(authority.clone());

        let outcome = usecase
            .start_trip(premium_dose(), &UserContext::default())
            .await;
        assert_eq!(outcome, StartOutcome::Started);
        assert_eq!(authority.claim_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn premium_user_bypasses_the_trial_gate() {
        let authority = FakeAuthority::with(&[("dmt", 0)]);
        let (usecase, _, _, _) = usecase_with(authority.clone());

        let user = UserContext {
            user_id: Some("user-1".into()),
            is_premium: true,
        };
        assert_eq!(
            usecase.start_trip(premium_dose(), &user).await,
            StartOutcome::Started
        );
        assert_eq!(authority.claim_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exhausted_trials_lock_the_dose() {
        let authority = FakeAuthority::with(&[("dmt", 0)]);
        let (usecase, audio, _, _) = usecase_with(authority);

        let outcome = usecase
            .start_trip(premium_dose(), &UserContext::default())
            .await;
        assert!(matches!(outcome, StartOutcome::Locked { .. }));
        assert_eq!(audio.plays.load(Ordering::SeqCst), 0);
        assert!(usecase.snapshot().await.is_none());
    }

    #[tokio::test]
    async fn second_start_is_a_noop() {
        let authority = FakeAuthority::with(&[]);
        let (usecase, audio, _, _) = usecase_with(authority);

        usecase
            .start_trip(free_dose(), &UserContext::default())
            .await;
        let outcome = usecase
            .start_trip(free_dose(), &UserContext::default())
            .await;
        assert_eq!(outcome, StartOutcome::AlreadyActive);
        assert_eq!(audio.plays.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn early_exit_below_threshold_asks_for_confirmation() {
        let authority = FakeAuthority::with(&[]);
        let (usecase, audio, _, _) = usecase_with(authority);

        usecase
            .start_trip(free_dose(), &UserContext::default())
            .await;
        // 80/100 < 90%
        {
            let mut store = usecase.ctx.store.lock().await;
            store.set_elapsed(80 * 18); // total 1800 -> 1440 = 80%
        }
        let decision = usecase.request_stop().await;
        assert!(matches!(decision, StopDecision::NeedsConfirmation { .. }));
        // Session still running, nothing released yet.
        assert!(usecase.snapshot().await.is_some());
        assert_eq!(audio.stops.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn late_exit_tears_down_without_confirmation() {
        let authority = FakeAuthority::with(&[]);
        let (usecase, audio, haptics, _) = usecase_with(authority);

        usecase
            .start_trip(free_dose(), &UserContext::default())
            .await;
        {
            let mut store = usecase.ctx.store.lock().await;
            store.set_elapsed(95 * 18); // 1710 = 95%
        }
        let decision = usecase.request_stop().await;
        assert_eq!(decision, StopDecision::Stopped);
        assert!(usecase.snapshot().await.is_none());
        assert_eq!(audio.stops.load(Ordering::SeqCst), 1);
        assert!(haptics.stops.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn confirm_stop_tears_down() {
        let authority = FakeAuthority::with(&[]);
        let (usecase, audio, _, _) = usecase_with(authority);

        usecase
            .start_trip(free_dose(), &UserContext::default())
            .await;
        usecase.confirm_stop("too_intense", None).await;
        assert!(usecase.snapshot().await.is_none());
        assert_eq!(audio.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn stop_when_idle_is_a_noop() {
        let authority = FakeAuthority::with(&[]);
        let (usecase, audio, _, _) = usecase_with(authority);
        assert_eq!(usecase.request_stop().await, StopDecision::Stopped);
        assert_eq!(audio.stops.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_cancels_the_timer_and_resume_restarts_it() {
        let authority = FakeAuthority::with(&[]);
        let (usecase, audio, _, _) = usecase_with(authority);

        usecase
            .start_trip(free_dose(), &UserContext::default())
            .await;
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        let before_pause = usecase.snapshot().await.unwrap().elapsed_secs;
        assert!(before_pause >= 2);

        usecase.toggle_play().await;
        assert_eq!(audio.pauses.load(Ordering::SeqCst), 1);
        tokio::time::sleep(std::time::Duration::from_secs(5)).await;
        assert_eq!(usecase.snapshot().await.unwrap().elapsed_secs, before_pause);

        usecase.toggle_play().await;
        assert_eq!(audio.resumes.load(Ordering::SeqCst), 1);
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        assert!(usecase.snapshot().await.unwrap().elapsed_secs > before_pause);
    }

    #[tokio::test]
    async fn intensity_and_volume_changes_reach_the_audio_output() {
        let authority = FakeAuthority::with(&[]);
        let (usecase, audio, _, _) = usecase_with(authority);

        usecase
            .start_trip(free_dose(), &UserContext::default())
            .await;
        usecase.set_intensity(3).await;
        usecase.set_volume(0.25).await;
        assert_eq!(*audio.last_intensity.lock().unwrap(), Some(3));
        assert_eq!(*audio.last_volume.lock().unwrap(), Some(0.25));
    }

    #[tokio::test]
    async fn manual_journal_entry_lands_in_the_durable_store() {
        let authority = FakeAuthority::with(&[]);
        let (usecase, _, _, repo) = usecase_with(authority);

        let entry = usecase
            .add_journal_entry(NewJournalEntry {
                dose_id: "meditation".into(),
                dose_name: "Deep Meditation".into(),
                mood: vec!["calm".into()],
                intensity: 3,
                notes: "felt grounded".into(),
                duration_secs: 1200,
            })
            .await
            .unwrap();
        assert_eq!(entry.timestamp, 1_700_000_000);
        assert_eq!(repo.entries.lock().unwrap().len(), 1);
    }
}
