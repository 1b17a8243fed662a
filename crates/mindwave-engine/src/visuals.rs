//! Visual strategy parameters.
//!
//! Each [`VisualType`] maps to one pure function from elapsed time and
//! intensity to a [`VisualFrame`]. Renderers consume frames however they
//! like; nothing here touches session state, and switching strategies
//! mid-session just switches which function runs.

use std::f64::consts::TAU;

use mindwave_core::dose::VisualType;

/// One rendered frame's worth of animation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualFrame {
    /// Accumulated rotation in radians (unbounded, monotonic in time)
    pub rotation: f64,
    /// Scale factor around 1.0
    pub zoom: f64,
    /// Periodic emphasis in `[0, 1]`
    pub pulse: f64,
    /// Index into the dose palette for the dominant color
    pub color_index: usize,
    /// Element density in `[0, 1]` (particles, rings, segments)
    pub density: f64,
}

/// Computes the animation frame for a strategy at a point in time.
///
/// `palette_len` is the dose's color count; a zero-length palette pins
/// `color_index` to 0.
pub fn frame(visual: VisualType, elapsed_secs: f64, intensity: u8, palette_len: usize) -> VisualFrame {
    let level = f64::from(intensity.clamp(1, 10)) / 10.0;
    let t = elapsed_secs.max(0.0);

    let raw = match visual {
        // Slow spin, gentle radial breathing.
        VisualType::Mandala => VisualFrame {
            rotation: t * 0.2 * level,
            zoom: 1.0 + 0.1 * level * (t * 0.5).sin(),
            pulse: half_sine(t, 0.25),
            color_index: cycle(t, 8.0, palette_len),
            density: 0.4 + 0.6 * level,
        },
        // Density-driven; barely rotates.
        VisualType::Particles => VisualFrame {
            rotation: t * 0.05,
            zoom: 1.0,
            pulse: half_sine(t, 1.0 + level),
            color_index: cycle(t, 3.0, palette_len),
            density: 0.2 + 0.8 * level,
        },
        // Deep zoom is the whole point; intensity speeds the dive.
        VisualType::Fractals => VisualFrame {
            rotation: t * 0.1 * level,
            zoom: 1.0 + (t * 0.05 * (1.0 + level)).fract(),
            pulse: half_sine(t, 0.5),
            color_index: cycle(t, 5.0, palette_len),
            density: 0.5 + 0.5 * level,
        },
        // Steps through the palette chakra by chakra.
        VisualType::Chakra => VisualFrame {
            rotation: t * 0.15,
            zoom: 1.0 + 0.05 * half_sine(t, 0.2),
            pulse: half_sine(t, 0.2),
            color_index: cycle(t, 6.0, palette_len),
            density: 0.6,
        },
        VisualType::Waves => VisualFrame {
            rotation: 0.0,
            zoom: 1.0,
            pulse: half_sine(t, 0.4 + 0.3 * level),
            color_index: cycle(t, 10.0, palette_len),
            density: 0.3 + 0.7 * level,
        },
        // Box-breathing cadence: one full cycle every 8 seconds,
        // independent of intensity so the guide stays steady.
        VisualType::Breath => VisualFrame {
            rotation: 0.0,
            zoom: 1.0 + 0.25 * half_sine(t, 0.125),
            pulse: half_sine(t, 0.125),
            color_index: 0,
            density: 0.5,
        },
        VisualType::Tunnel => VisualFrame {
            rotation: t * 0.4 * level,
            zoom: 1.0 + 0.3 * level,
            pulse: half_sine(t, 1.5),
            color_index: cycle(t, 2.0, palette_len),
            density: 0.5 + 0.5 * level,
        },
        VisualType::Cosmic => VisualFrame {
            rotation: t * 0.08,
            zoom: 1.0 + 0.15 * level * (t * 0.1).sin(),
            pulse: half_sine(t, 0.3),
            color_index: cycle(t, 12.0, palette_len),
            density: 0.7 + 0.3 * level,
        },
    };

    VisualFrame {
        pulse: raw.pulse.clamp(0.0, 1.0),
        density: raw.density.clamp(0.0, 1.0),
        ..raw
    }
}

/// Sine rectified into `[0, 1]` at the given frequency in Hz.
fn half_sine(t: f64, freq_hz: f64) -> f64 {
    0.5 * (1.0 + (t * freq_hz * TAU).sin())
}

/// Palette index advancing every `period_secs`.
fn cycle(t: f64, period_secs: f64, palette_len: usize) -> usize {
    if palette_len == 0 {
        return 0;
    }
    ((t / period_secs) as usize) % palette_len
}
