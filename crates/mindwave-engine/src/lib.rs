//! Playback engine: audio synthesis, haptic patterns, visual strategies.
//!
//! The audio path is split into a pure sample mixer (testable without a
//! device) and a cpal-backed output that owns the stream on a dedicated
//! thread. Haptics and visuals are derived from the same session
//! parameters but never feed back into session state.

pub mod audio;
pub mod haptics;
pub mod visuals;

pub use audio::device::CpalAudioOutput;
pub use haptics::{HapticCoordinator, NoopVibration, VibrationDevice};
