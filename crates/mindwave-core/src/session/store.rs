//! Volatile session state store.
//!
//! Single source of truth for "is a session active, which dose, what phase,
//! how much time has elapsed." All transitions are pure and synchronous;
//! callers wrap the store in a lock (the application layer uses a single
//! `tokio::sync::Mutex`) so the 1 Hz driver and UI actions never interleave
//! mid-mutation.
//!
//! This store is deliberately NOT persisted: a process restart abandons any
//! in-progress session. Durable history lives in [`crate::durable`].

use serde::{Deserialize, Serialize};

use crate::dose::{Dose, VisualType};

use super::phase::TripPhase;

/// Default master volume for a fresh store.
pub const DEFAULT_VOLUME: f32 = 0.7;

/// The currently active session.
///
/// The store exclusively owns this value; dropping it (stop/completion)
/// is the signal for the application layer to release the 1 Hz timer,
/// audio voices, and haptic interval together.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSession {
    pub dose: Dose,
    pub playing: bool,
    pub phase: TripPhase,
    pub elapsed_secs: u32,
    pub total_secs: u32,
    pub intensity: u8,
    pub visual: VisualType,
    pub show_controls: bool,
}

impl ActiveSession {
    /// Progress ratio in `[0, 1]`; 1.0 for a zero-length session.
    pub fn progress(&self) -> f64 {
        if self.total_secs == 0 {
            return 1.0;
        }
        (self.elapsed_secs as f64 / self.total_secs as f64).min(1.0)
    }
}

/// Read-only copy of the session state handed to observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub dose_id: String,
    pub dose_name: String,
    pub playing: bool,
    pub phase: TripPhase,
    pub elapsed_secs: u32,
    pub total_secs: u32,
    pub intensity: u8,
    pub volume: f32,
    pub visual: VisualType,
    pub show_controls: bool,
}

/// Capture of a session at the moment it ended, used to synthesize the
/// completion journal entry and the exit-feedback payload.
#[derive(Debug, Clone, PartialEq)]
pub struct EndedSession {
    pub dose: Dose,
    pub intensity: u8,
    pub elapsed_secs: u32,
    pub total_secs: u32,
}

/// Result of one driver tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    pub elapsed_secs: u32,
    pub phase: TripPhase,
    /// Set when this tick crossed a phase boundary
    pub phase_changed: bool,
    /// Set when this tick reached the total duration; the store has
    /// already been cleared when this is `Some`.
    pub completed: Option<EndedSession>,
}

/// Process-wide single-writer session container.
#[derive(Debug, Default)]
pub struct SessionStore {
    session: Option<ActiveSession>,
    volume: f32,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            session: None,
            volume: DEFAULT_VOLUME,
        }
    }

    /// Starts a session from a dose's defaults.
    ///
    /// Returns `false` (state unchanged) when a session is already active.
    pub fn start_trip(&mut self, dose: Dose) -> bool {
        if self.session.is_some() {
            return false;
        }
        let intensity = dose.clamped_intensity();
        let total_secs = dose.default_duration_secs;
        let visual = dose.visual_type;
        self.session = Some(ActiveSession {
            dose,
            playing: true,
            phase: TripPhase::Onset,
            elapsed_secs: 0,
            total_secs,
            intensity,
            visual,
            show_controls: true,
        });
        true
    }

    /// Clears the active session. Safe to call when none is active.
    ///
    /// Returns the ended-session capture so callers can tear down
    /// coordinators and record exit feedback.
    pub fn stop_trip(&mut self) -> Option<EndedSession> {
        self.session.take().map(|s| EndedSession {
            intensity: s.intensity,
            elapsed_secs: s.elapsed_secs,
            total_secs: s.total_secs,
            dose: s.dose,
        })
    }

    /// Flips the playing flag. Returns the new value, or `None` when no
    /// session is active.
    pub fn toggle_play(&mut self) -> Option<bool> {
        let session = self.session.as_mut()?;
        session.playing = !session.playing;
        Some(session.playing)
    }

    /// Advances elapsed time by one second and recomputes the phase.
    ///
    /// No-op (`None`) when no session is active or playback is paused.
    /// When the advance reaches the total duration the session is torn
    /// down in the same call and the capture is returned in
    /// [`TickOutcome::completed`]; elapsed never advances past total.
    pub fn tick(&mut self) -> Option<TickOutcome> {
        let session = self.session.as_mut()?;
        if !session.playing {
            return None;
        }
        session.elapsed_secs = (session.elapsed_secs + 1).min(session.total_secs);
        let next_phase = TripPhase::for_elapsed(session.elapsed_secs, session.total_secs);
        let phase_changed = next_phase != session.phase;
        session.phase = next_phase;
        let elapsed_secs = session.elapsed_secs;

        let completed = if next_phase.is_complete() {
            self.stop_trip()
        } else {
            None
        };

        Some(TickOutcome {
            elapsed_secs,
            phase: next_phase,
            phase_changed,
            completed,
        })
    }

    /// Overwrites elapsed time, clamped to the total duration.
    pub fn set_elapsed(&mut self, seconds: u32) {
        if let Some(session) = self.session.as_mut() {
            session.elapsed_secs = seconds.min(session.total_secs);
        }
    }

    pub fn set_phase(&mut self, phase: TripPhase) {
        if let Some(session) = self.session.as_mut() {
            session.phase = phase;
        }
    }

    /// Sets intensity, clamped to 1-10.
    pub fn set_intensity(&mut self, intensity: u8) {
        if let Some(session) = self.session.as_mut() {
            session.intensity = intensity.clamp(1, 10);
        }
    }

    /// Sets master volume, clamped to `[0, 1]`. Volume outlives sessions.
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    pub fn set_visual(&mut self, visual: VisualType) {
        if let Some(session) = self.session.as_mut() {
            session.visual = visual;
        }
    }

    pub fn toggle_controls(&mut self) {
        if let Some(session) = self.session.as_mut() {
            session.show_controls = !session.show_controls;
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_playing(&self) -> bool {
        self.session.as_ref().map(|s| s.playing).unwrap_or(false)
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    pub fn active(&self) -> Option<&ActiveSession> {
        self.session.as_ref()
    }

    /// Read-only snapshot for observers, `None` when idle.
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.session.as_ref().map(|s| SessionSnapshot {
            dose_id: s.dose.id.clone(),
            dose_name: s.dose.name.clone(),
            playing: s.playing,
            phase: s.phase,
            elapsed_secs: s.elapsed_secs,
            total_secs: s.total_secs,
            intensity: s.intensity,
            volume: self.volume,
            visual: s.visual,
            show_controls: s.show_controls,
        })
    }
}
