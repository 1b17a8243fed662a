//! Output coordinator seams.
//!
//! The session use case drives audio and haptics through these traits so
//! the application layer stays free of device concerns and tests can
//! observe teardown ordering with fakes.

use crate::dose::FrequencyLayer;
use crate::session::TripPhase;

/// Continuous tone output for the active session.
///
/// Implementations must make `stop` idempotent and release every audio
/// resource they created; `stop` when nothing plays is a no-op.
pub trait AudioOutput: Send + Sync {
    /// Starts (or restarts) tone generation for the given layers.
    fn play(&self, layers: &[FrequencyLayer], volume: f32, intensity: u8);

    /// Pauses output without discarding voices.
    fn pause(&self);

    /// Resumes output after a pause.
    fn resume(&self);

    /// Master volume 0.0-1.0, smoothed by the implementation.
    fn set_volume(&self, volume: f32);

    /// Intensity 1-10, scales per-layer gain independently of volume.
    fn set_intensity(&self, intensity: u8);

    /// Stops all tone generation and releases audio resources.
    fn stop(&self);
}

/// Vibration output for supporting devices.
///
/// Support is detected once at construction; on unsupported devices every
/// call is a silent no-op and never an error.
pub trait HapticOutput: Send + Sync {
    /// Whether the device can vibrate at all.
    fn is_supported(&self) -> bool;

    /// Starts the repeating beat-synced pattern.
    fn start_rhythmic(&self, beat_freq: f64, intensity: u8);

    /// Fires the one-shot pattern for a phase transition.
    fn phase_pattern(&self, phase: TripPhase, intensity: u8);

    /// One-shot pulse on a breathing-guide inhale.
    fn breathing_pulse(&self, inhale: bool, intensity: u8);

    /// Stops all vibration immediately.
    fn stop(&self);
}
