//! Trip phase state machine.
//!
//! The phase is a pure function of the elapsed/total ratio. The driver
//! recomputes it after every tick; no transition state is stored anywhere
//! else.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Discrete stage of a timed session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TripPhase {
    Idle,
    Onset,
    Peak,
    Sustain,
    Comedown,
    Complete,
}

impl TripPhase {
    /// Derives the phase from a progress ratio `p = elapsed / total`.
    ///
    /// | p range        | phase    |
    /// |----------------|----------|
    /// | p < 0.15       | onset    |
    /// | 0.15 <= p < 0.40 | peak   |
    /// | 0.40 <= p < 0.70 | sustain |
    /// | 0.70 <= p < 1.0 | comedown |
    /// | p >= 1.0       | complete |
    pub fn for_progress(p: f64) -> Self {
        if p >= 1.0 {
            TripPhase::Complete
        } else if p >= 0.70 {
            TripPhase::Comedown
        } else if p >= 0.40 {
            TripPhase::Sustain
        } else if p >= 0.15 {
            TripPhase::Peak
        } else {
            TripPhase::Onset
        }
    }

    /// Derives the phase from elapsed/total seconds.
    ///
    /// A zero `total` counts as complete so a degenerate session tears
    /// down on its first tick instead of dividing by zero.
    pub fn for_elapsed(elapsed_secs: u32, total_secs: u32) -> Self {
        if total_secs == 0 {
            return TripPhase::Complete;
        }
        Self::for_progress(elapsed_secs as f64 / total_secs as f64)
    }

    /// True for the terminal phase.
    pub fn is_complete(&self) -> bool {
        matches!(self, TripPhase::Complete)
    }
}
