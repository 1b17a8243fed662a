//! Session lifecycle events.

use serde::{Deserialize, Serialize};

use crate::journal::JournalEntry;

use super::phase::TripPhase;

/// High-level events published while a session runs.
///
/// The application layer broadcasts these on a `tokio::sync::broadcast`
/// channel; coordinators and UI surfaces subscribe independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A session began playing.
    Started { dose_id: String },
    /// One second of playback elapsed.
    Tick { elapsed_secs: u32, total_secs: u32 },
    /// The derived phase crossed a boundary.
    PhaseChanged { phase: TripPhase },
    /// Playback paused by the user.
    Paused,
    /// Playback resumed by the user.
    Resumed,
    /// The session reached its full duration. Carries the journal entry
    /// synthesized from the ended session; receivers use it to surface
    /// the post-session rating prompt.
    Completed { entry: JournalEntry },
    /// The session was stopped before completion.
    Stopped { dose_id: String, elapsed_secs: u32 },
}
