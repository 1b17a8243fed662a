//! 1 Hz session phase driver.
//!
//! One driver task exists per playing session. It advances elapsed time by
//! exactly one second per tick, recomputes the phase, and performs the
//! completion side effects (journal write, remote sync, rating prompt via
//! the `Completed` event) in the same logical step that completion is
//! detected. Pausing or stopping the session cancels the task.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use mindwave_core::dose::VisualType;
use mindwave_core::journal::NewJournalEntry;
use mindwave_core::session::{SessionEvent, TripPhase};

use super::SessionContext;

/// Spawns the driver task for the current session.
///
/// Returns the token that cancels it. The task also exits on its own when
/// the session completes or disappears, so cancelling an already-finished
/// driver is a harmless no-op.
pub(crate) fn spawn(ctx: Arc<SessionContext>, user_id: Option<String>) -> CancellationToken {
    let token = CancellationToken::new();
    let task_token = token.clone();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(1));
        // The first tick of `interval` fires immediately; consume it so
        // elapsed time starts advancing one full second after spawn.
        interval.tick().await;
        loop {
            tokio::select! {
                _ = task_token.cancelled() => break,
                _ = interval.tick() => {
                    if !advance(&ctx, user_id.as_deref()).await {
                        break;
                    }
                }
            }
        }
    });
    token
}

/// Performs one tick. Returns `false` when the driver should exit.
async fn advance(ctx: &SessionContext, user_id: Option<&str>) -> bool {
    let (outcome, total_secs, intensity, visual) = {
        let mut store = ctx.store.lock().await;
        let (total_secs, intensity, visual) = match store.active() {
            Some(s) => (s.total_secs, s.intensity, s.visual),
            None => return false,
        };
        (store.tick(), total_secs, intensity, visual)
    };

    let Some(outcome) = outcome else {
        // Paused between cancellation and this tick; keep the tick silent.
        return true;
    };

    ctx.emit(SessionEvent::Tick {
        elapsed_secs: outcome.elapsed_secs,
        total_secs,
    });

    // Breathing guide: 8-second box cadence, inhale on the first half.
    if visual == VisualType::Breath {
        match outcome.elapsed_secs % 8 {
            0 => ctx.haptics.breathing_pulse(true, intensity),
            4 => ctx.haptics.breathing_pulse(false, intensity),
            _ => {}
        }
    }

    if outcome.phase_changed {
        ctx.emit(SessionEvent::PhaseChanged {
            phase: outcome.phase,
        });
        if outcome.phase != TripPhase::Complete {
            ctx.haptics.phase_pattern(outcome.phase, intensity);
        }
    }

    let Some(ended) = outcome.completed else {
        return true;
    };

    // Completion: the store is already cleared; release the outputs and
    // synthesize the journal entry from the capture.
    ctx.audio.stop();
    ctx.haptics.stop();
    ctx.haptics.phase_pattern(TripPhase::Complete, ended.intensity);

    let entry = NewJournalEntry {
        dose_id: ended.dose.id.clone(),
        dose_name: ended.dose.name.clone(),
        mood: Vec::new(),
        intensity: ended.intensity,
        notes: String::new(),
        duration_secs: ended.elapsed_secs,
    }
    .into_entry(ctx.clock.now_unix());

    if let Err(err) = ctx.state_repository.add_journal_entry(entry.clone()).await {
        warn!(error = %err, "failed to persist completion journal entry");
    }

    if let (Some(gateway), Some(user_id)) = (ctx.gateway.clone(), user_id) {
        let user_id = user_id.to_string();
        let remote_entry = entry.clone();
        tokio::spawn(async move {
            if let Err(err) = gateway.save_journal_entry(&user_id, &remote_entry).await {
                warn!(error = %err, "journal sync failed");
            }
        });
    }

    ctx.emit(SessionEvent::Completed { entry });
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::usecase::tests_support::{
        context_with, MockAudio, MockHaptics, MockStateRepository,
    };
    use mindwave_core::dose::dose_by_id;
    use std::sync::atomic::Ordering;

    fn short_dose(total_secs: u32) -> mindwave_core::dose::Dose {
        let mut dose = dose_by_id("psilocybin").unwrap().clone();
        dose.default_duration_secs = total_secs;
        dose
    }

    #[tokio::test(start_paused = true)]
    async fn driver_completes_after_total_ticks_with_one_journal_entry() {
        let audio = Arc::new(MockAudio::default());
        let haptics = Arc::new(MockHaptics::default());
        let repo = Arc::new(MockStateRepository::default());
        let ctx = context_with(audio.clone(), haptics.clone(), repo.clone());

        ctx.store.lock().await.start_trip(short_dose(5));
        let mut events = ctx.events.subscribe();
        let _token = spawn(ctx.clone(), None);

        tokio::time::sleep(Duration::from_secs(10)).await;

        assert!(!ctx.store.lock().await.is_active());
        assert_eq!(repo.entries.lock().unwrap().len(), 1);
        let entry = &repo.entries.lock().unwrap()[0];
        assert_eq!(entry.duration_secs, 5);
        assert_eq!(audio.stops.load(Ordering::SeqCst), 1);
        assert!(haptics.stops.load(Ordering::SeqCst) >= 1);

        let mut saw_completed = false;
        while let Ok(event) = events.try_recv() {
            if matches!(event, SessionEvent::Completed { .. }) {
                assert!(!saw_completed, "completed fired twice");
                saw_completed = true;
            }
        }
        assert!(saw_completed);
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_driver_stops_ticking() {
        let audio = Arc::new(MockAudio::default());
        let haptics = Arc::new(MockHaptics::default());
        let repo = Arc::new(MockStateRepository::default());
        let ctx = context_with(audio, haptics, repo);

        ctx.store.lock().await.start_trip(short_dose(100));
        let token = spawn(ctx.clone(), None);

        tokio::time::sleep(Duration::from_secs(3)).await;
        let elapsed_at_cancel = ctx.store.lock().await.snapshot().unwrap().elapsed_secs;
        token.cancel();

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(
            ctx.store.lock().await.snapshot().unwrap().elapsed_secs,
            elapsed_at_cancel
        );
    }

    #[tokio::test(start_paused = true)]
    async fn paused_session_does_not_advance() {
        let audio = Arc::new(MockAudio::default());
        let haptics = Arc::new(MockHaptics::default());
        let repo = Arc::new(MockStateRepository::default());
        let ctx = context_with(audio, haptics, repo);

        ctx.store.lock().await.start_trip(short_dose(100));
        ctx.store.lock().await.toggle_play();
        let _token = spawn(ctx.clone(), None);

        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(ctx.store.lock().await.snapshot().unwrap().elapsed_secs, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn breath_visual_drives_the_breathing_guide() {
        let audio = Arc::new(MockAudio::default());
        let haptics = Arc::new(MockHaptics::default());
        let repo = Arc::new(MockStateRepository::default());
        let ctx = context_with(audio, haptics.clone(), repo);

        ctx.store.lock().await.start_trip(short_dose(100));
        ctx.store.lock().await.set_visual(VisualType::Breath);
        let _token = spawn(ctx.clone(), None);

        // Ticks land at 1..=9: exhale at 4, inhale at 8.
        tokio::time::sleep(Duration::from_secs(9)).await;
        let breaths = haptics.breaths.lock().unwrap().clone();
        assert_eq!(breaths, vec![false, true]);
    }

    #[tokio::test(start_paused = true)]
    async fn phase_transitions_fire_haptic_patterns() {
        let audio = Arc::new(MockAudio::default());
        let haptics = Arc::new(MockHaptics::default());
        let repo = Arc::new(MockStateRepository::default());
        let ctx = context_with(audio, haptics.clone(), repo);

        // total 10: peak at 2s (0.15), sustain at 4s, comedown at 7s.
        ctx.store.lock().await.start_trip(short_dose(10));
        let _token = spawn(ctx.clone(), None);

        tokio::time::sleep(Duration::from_secs(8)).await;
        let fired = haptics.phase_patterns.lock().unwrap().clone();
        assert!(fired.contains(&TripPhase::Peak));
        assert!(fired.contains(&TripPhase::Sustain));
        assert!(fired.contains(&TripPhase::Comedown));
    }
}
