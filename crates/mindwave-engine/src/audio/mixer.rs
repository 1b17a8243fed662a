//! Pure stereo sample mixer.
//!
//! One voice per frequency layer:
//!
//! - binaural: `base_freq` hard left, `base_freq + beat_freq` hard right;
//!   the beat exists only in the listener's head
//! - solfeggio: one tone on both channels at reduced gain
//! - isochronic: one tone on both channels, amplitude-gated at `beat_freq`
//!
//! Volume and intensity changes arrive through [`Params`] (lock-free, set
//! from any thread) and are smoothed per-sample so parameter jumps never
//! click.

use std::f32::consts::TAU;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use mindwave_core::dose::{FrequencyLayer, LayerKind};

/// Gain multiplier for solfeggio layers relative to the others.
const SOLFEGGIO_GAIN: f32 = 0.5;

/// Per-sample smoothing coefficient for the master gain.
const GAIN_SMOOTHING: f32 = 0.001;

/// Live playback parameters shared between the control side and the
/// audio callback.
pub struct Params {
    volume_bits: AtomicU32,
    intensity: AtomicU32,
}

impl Params {
    pub fn new(volume: f32, intensity: u8) -> Self {
        Self {
            volume_bits: AtomicU32::new(volume.clamp(0.0, 1.0).to_bits()),
            intensity: AtomicU32::new(u32::from(intensity.clamp(1, 10))),
        }
    }

    pub fn set_volume(&self, volume: f32) {
        self.volume_bits
            .store(volume.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    pub fn volume(&self) -> f32 {
        f32::from_bits(self.volume_bits.load(Ordering::Relaxed))
    }

    pub fn set_intensity(&self, intensity: u8) {
        self.intensity
            .store(u32::from(intensity.clamp(1, 10)), Ordering::Relaxed);
    }

    pub fn intensity(&self) -> u8 {
        self.intensity.load(Ordering::Relaxed) as u8
    }
}

/// Gain contribution of the 1-10 intensity setting.
pub fn intensity_gain(intensity: u8) -> f32 {
    0.3 + f32::from(intensity.clamp(1, 10)) / 10.0 * 0.7
}

struct Voice {
    kind: LayerKind,
    left_freq: f32,
    right_freq: f32,
    beat_freq: f32,
    left_phase: f32,
    right_phase: f32,
    gate_phase: f32,
}

impl Voice {
    fn from_layer(layer: &FrequencyLayer) -> Self {
        let base = layer.base_freq as f32;
        let beat = layer.beat_freq as f32;
        let right_freq = match layer.kind {
            LayerKind::Binaural => base + beat,
            LayerKind::Solfeggio | LayerKind::Isochronic => base,
        };
        Self {
            kind: layer.kind,
            left_freq: base,
            right_freq,
            beat_freq: beat,
            left_phase: 0.0,
            right_phase: 0.0,
            gate_phase: 0.0,
        }
    }

    fn next(&mut self, sample_rate: f32) -> (f32, f32) {
        let left = self.left_phase.sin();
        let right = self.right_phase.sin();
        self.left_phase = (self.left_phase + TAU * self.left_freq / sample_rate) % TAU;
        self.right_phase = (self.right_phase + TAU * self.right_freq / sample_rate) % TAU;

        match self.kind {
            LayerKind::Binaural => (left, right),
            LayerKind::Solfeggio => (left * SOLFEGGIO_GAIN, left * SOLFEGGIO_GAIN),
            LayerKind::Isochronic => {
                // Raised-cosine gate, fully closed once per beat period.
                let gate = 0.5 * (1.0 - self.gate_phase.cos());
                self.gate_phase = (self.gate_phase + TAU * self.beat_freq / sample_rate) % TAU;
                (left * gate, left * gate)
            }
        }
    }
}

/// Sums all voices into stereo frames.
pub struct Mixer {
    voices: Vec<Voice>,
    params: Arc<Params>,
    sample_rate: f32,
    /// Smoothed product of volume and intensity gain
    gain: f32,
    /// Equal-power-ish normalization across voices
    voice_scale: f32,
}

impl Mixer {
    pub fn new(layers: &[FrequencyLayer], params: Arc<Params>, sample_rate: f32) -> Self {
        let voices: Vec<Voice> = layers.iter().map(Voice::from_layer).collect();
        let voice_scale = if voices.is_empty() {
            0.0
        } else {
            1.0 / voices.len() as f32
        };
        // Start at the target so playback does not fade in from silence
        // over the smoothing window.
        let gain = params.volume() * intensity_gain(params.intensity());
        Self {
            voices,
            params,
            sample_rate,
            gain,
            voice_scale,
        }
    }

    /// Produces the next stereo frame in `[-1, 1]`.
    pub fn next_frame(&mut self) -> (f32, f32) {
        let target = self.params.volume() * intensity_gain(self.params.intensity());
        self.gain += (target - self.gain) * GAIN_SMOOTHING;

        let mut left = 0.0;
        let mut right = 0.0;
        for voice in &mut self.voices {
            let (l, r) = voice.next(self.sample_rate);
            left += l;
            right += r;
        }
        (
            left * self.voice_scale * self.gain,
            right * self.voice_scale * self.gain,
        )
    }

    #[cfg(test)]
    fn current_gain(&self) -> f32 {
        self.gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: f32 = 8_000.0;

    fn layer(kind: LayerKind, base: f64, beat: f64) -> FrequencyLayer {
        FrequencyLayer::new("test", base, beat, kind)
    }

    fn run(mixer: &mut Mixer, frames: usize) -> Vec<(f32, f32)> {
        (0..frames).map(|_| mixer.next_frame()).collect()
    }

    #[test]
    fn intensity_gain_is_monotonic_and_bounded() {
        assert!(intensity_gain(1) < intensity_gain(5));
        assert!(intensity_gain(5) < intensity_gain(10));
        assert!((intensity_gain(10) - 1.0).abs() < 1e-6);
        // Out-of-range input clamps instead of exceeding unity.
        assert_eq!(intensity_gain(200), intensity_gain(10));
    }

    #[test]
    fn empty_recipe_is_silent() {
        let params = Arc::new(Params::new(1.0, 10));
        let mut mixer = Mixer::new(&[], params, RATE);
        for (l, r) in run(&mut mixer, 100) {
            assert_eq!(l, 0.0);
            assert_eq!(r, 0.0);
        }
    }

    #[test]
    fn binaural_channels_carry_different_frequencies() {
        let params = Arc::new(Params::new(1.0, 10));
        let mut mixer = Mixer::new(&[layer(LayerKind::Binaural, 200.0, 10.0)], params, RATE);
        let frames = run(&mut mixer, 800);
        // Count rising zero crossings per channel over 0.1s: 200 Hz left,
        // 210 Hz right.
        let crossings = |pick: fn(&(f32, f32)) -> f32| {
            frames
                .windows(2)
                .filter(|w| pick(&w[0]) <= 0.0 && pick(&w[1]) > 0.0)
                .count()
        };
        let left = crossings(|f| f.0);
        let right = crossings(|f| f.1);
        assert_eq!(left, 20);
        assert_eq!(right, 21);
    }

    #[test]
    fn solfeggio_is_identical_on_both_channels() {
        let params = Arc::new(Params::new(0.8, 7));
        let mut mixer = Mixer::new(&[layer(LayerKind::Solfeggio, 528.0, 0.0)], params, RATE);
        for (l, r) in run(&mut mixer, 500) {
            assert_eq!(l, r);
        }
    }

    #[test]
    fn solfeggio_gain_is_reduced() {
        let params = Arc::new(Params::new(1.0, 10));
        let mut solfeggio = Mixer::new(
            &[layer(LayerKind::Solfeggio, 200.0, 0.0)],
            params.clone(),
            RATE,
        );
        let mut binaural = Mixer::new(&[layer(LayerKind::Binaural, 200.0, 0.0)], params, RATE);
        let peak = |frames: &[(f32, f32)]| {
            frames
                .iter()
                .map(|(l, _)| l.abs())
                .fold(0.0f32, f32::max)
        };
        let solfeggio_peak = peak(&run(&mut solfeggio, 400));
        let binaural_peak = peak(&run(&mut binaural, 400));
        assert!(solfeggio_peak < binaural_peak * 0.6);
    }

    #[test]
    fn isochronic_gate_closes_once_per_beat_period() {
        let params = Arc::new(Params::new(1.0, 10));
        let mut mixer = Mixer::new(&[layer(LayerKind::Isochronic, 100.0, 10.0)], params, RATE);
        let frames = run(&mut mixer, 800); // one 10 Hz period = 800 frames
        // The gate starts closed; the first few frames are near-silent
        // while mid-period output is not.
        let head_peak = frames[..20]
            .iter()
            .map(|(l, _)| l.abs())
            .fold(0.0f32, f32::max);
        let mid_peak = frames[300..500]
            .iter()
            .map(|(l, _)| l.abs())
            .fold(0.0f32, f32::max);
        assert!(head_peak < 0.05);
        assert!(mid_peak > 0.3);
    }

    #[test]
    fn volume_changes_are_smoothed() {
        let params = Arc::new(Params::new(1.0, 10));
        let mut mixer = Mixer::new(&[layer(LayerKind::Binaural, 200.0, 8.0)], params.clone(), RATE);
        let initial = mixer.current_gain();
        params.set_volume(0.0);
        mixer.next_frame();
        // One frame later the gain has barely moved.
        assert!(mixer.current_gain() > initial * 0.9);
        for _ in 0..40_000 {
            mixer.next_frame();
        }
        assert!(mixer.current_gain() < 0.01);
    }

    #[test]
    fn params_clamp_their_inputs() {
        let params = Params::new(3.0, 99);
        assert_eq!(params.volume(), 1.0);
        assert_eq!(params.intensity(), 10);
        params.set_volume(-1.0);
        params.set_intensity(0);
        assert_eq!(params.volume(), 0.0);
        assert_eq!(params.intensity(), 1);
    }
}
