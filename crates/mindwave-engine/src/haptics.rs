//! Haptic pattern coordinator.
//!
//! Translates session state into vibration patterns on a device seam so
//! the same coordinator runs against real hardware bridges or test fakes.
//! On unsupported devices every call is a silent no-op.
//!
//! Patterns are millisecond on/off sequences. The rhythmic pattern splits
//! each beat period (1000 / beat_freq ms) into a vibration scaled by
//! intensity and the remaining pause; phase transitions fire a one-shot
//! pattern per phase; the breathing guide vibrates on inhale only.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::debug;

use mindwave_core::output::HapticOutput;
use mindwave_core::session::TripPhase;

/// Bounds on the unscaled beat pulse: lower frequencies get longer
/// vibrations, higher get shorter.
const MIN_PULSE_MS: f64 = 20.0;
const MAX_PULSE_MS: f64 = 100.0;
/// Every beat keeps at least this much silence.
const MIN_PAUSE_MS: f64 = 50.0;

/// Low-level vibration sink.
pub trait VibrationDevice: Send + Sync {
    /// Whether this device can vibrate at all.
    fn is_supported(&self) -> bool;

    /// Plays an on/off millisecond pattern, starting with "on".
    fn vibrate(&self, pattern: &[u64]);

    /// Cancels any in-flight vibration.
    fn cancel(&self);
}

/// Device stand-in for platforms without vibration hardware.
pub struct NoopVibration;

impl VibrationDevice for NoopVibration {
    fn is_supported(&self) -> bool {
        false
    }

    fn vibrate(&self, _pattern: &[u64]) {}

    fn cancel(&self) {}
}

/// [`HapticOutput`] implementation over a [`VibrationDevice`].
pub struct HapticCoordinator {
    device: Arc<dyn VibrationDevice>,
    rhythm: Mutex<Option<CancellationToken>>,
}

impl HapticCoordinator {
    pub fn new(device: Arc<dyn VibrationDevice>) -> Self {
        Self {
            device,
            rhythm: Mutex::new(None),
        }
    }

    fn cancel_rhythm(&self) {
        let mut slot = self.rhythm.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = slot.take() {
            token.cancel();
        }
    }
}

impl HapticOutput for HapticCoordinator {
    fn is_supported(&self) -> bool {
        self.device.is_supported()
    }

    fn start_rhythmic(&self, beat_freq: f64, intensity: u8) {
        if !self.device.is_supported() || beat_freq <= 0.0 {
            return;
        }
        self.cancel_rhythm();

        let period_ms = 1000.0 / beat_freq;
        let vibrate = scale_ms(period_ms.clamp(MIN_PULSE_MS, MAX_PULSE_MS) as u64, intensity);
        let pause = (period_ms - vibrate as f64).max(MIN_PAUSE_MS).round() as u64;
        let token = CancellationToken::new();
        let child = token.clone();
        let device = Arc::clone(&self.device);
        debug!(beat_freq, vibrate, pause, "starting rhythmic haptics");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(vibrate + pause));
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = interval.tick() => device.vibrate(&[vibrate, pause]),
                }
            }
        });

        let mut slot = self.rhythm.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = slot.replace(token) {
            previous.cancel();
        }
    }

    fn phase_pattern(&self, phase: TripPhase, intensity: u8) {
        if !self.device.is_supported() {
            return;
        }
        let base: &[u64] = match phase {
            TripPhase::Idle => return,
            TripPhase::Onset => &[30, 100, 30, 100, 30],
            TripPhase::Peak => &[50, 50, 50, 50, 50, 50, 50],
            TripPhase::Sustain => &[40, 80, 40, 80],
            TripPhase::Comedown => &[20, 150, 20, 200],
            TripPhase::Complete => &[100, 50, 100],
        };
        let pattern: Vec<u64> = base.iter().map(|ms| scale_ms(*ms, intensity)).collect();
        self.device.vibrate(&pattern);
    }

    fn breathing_pulse(&self, inhale: bool, intensity: u8) {
        // Exhale is the natural pause; only inhale vibrates.
        if !inhale || !self.device.is_supported() {
            return;
        }
        self.device.vibrate(&[scale_ms(30, intensity)]);
    }

    fn stop(&self) {
        self.cancel_rhythm();
        self.device.cancel();
    }
}

impl Drop for HapticCoordinator {
    fn drop(&mut self) {
        self.cancel_rhythm();
    }
}

/// Scales a base duration by intensity: 1 maps to 0.1x, 10 to 1.0x.
fn scale_ms(base: u64, intensity: u8) -> u64 {
    let factor = f64::from(intensity.clamp(1, 10)) / 10.0;
    (base as f64 * factor).round() as u64
}
