//! Dose domain model.
//!
//! A dose is an immutable catalog entry combining an audio frequency
//! recipe, a visual style, and display metadata. Catalog doses are built
//! once at startup; custom doses are synthesized at runtime from a
//! [`super::custom::CustomTrip`] and are indistinguishable downstream.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// Catalog grouping used for discovery/filtering.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DoseCategory {
    Euphoric,
    Psychedelic,
    Meditative,
    Creative,
    Sleep,
    Focus,
    Dissociative,
    Natural,
}

/// Rendering strategy selector for the visual layer.
///
/// Purely a strategy key; switching it at runtime never affects audio,
/// haptics, or session state.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VisualType {
    Mandala,
    Particles,
    Fractals,
    Chakra,
    Waves,
    Breath,
    Tunnel,
    Cosmic,
}

impl Default for VisualType {
    fn default() -> Self {
        VisualType::Mandala
    }
}

/// How a frequency layer is turned into audible output.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum LayerKind {
    /// Two tones, `base_freq` fully left and `base_freq + beat_freq`
    /// fully right; the beat is perceptual, not synthesized.
    Binaural,
    /// Single tone on both channels at reduced gain.
    Solfeggio,
    /// Single tone amplitude-modulated at `beat_freq`.
    Isochronic,
}

/// One audio layer of a dose recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequencyLayer {
    /// Display name (e.g. "Theta Deep")
    pub name: String,
    /// Carrier frequency in Hz
    pub base_freq: f64,
    /// Beat/offset frequency in Hz (ignored for solfeggio layers)
    pub beat_freq: f64,
    /// Synthesis mode for this layer
    pub kind: LayerKind,
}

impl FrequencyLayer {
    pub fn new(name: impl Into<String>, base_freq: f64, beat_freq: f64, kind: LayerKind) -> Self {
        Self {
            name: name.into(),
            base_freq,
            beat_freq,
            kind,
        }
    }
}

/// Immutable session template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dose {
    /// Stable identifier, also the key of the shared trial ledger
    pub id: String,
    pub name: String,
    pub slug: String,
    pub tagline: String,
    pub description: String,
    pub category: DoseCategory,
    /// Ordered audio recipe; the audio coordinator emits one voice per layer
    pub frequencies: Vec<FrequencyLayer>,
    /// Session length in seconds when the user does not override it
    pub default_duration_secs: u32,
    /// Base intensity 1-10; the session copies this as its starting value
    pub intensity: u8,
    pub visual_type: VisualType,
    /// Ordered palette of hex color values consumed by visual strategies
    pub colors: Vec<String>,
    /// Effect tags shown on the catalog card
    pub effects: Vec<String>,
    pub is_premium: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
}

impl Dose {
    /// Clamped intensity, guarding against out-of-range catalog data.
    pub fn clamped_intensity(&self) -> u8 {
        self.intensity.clamp(1, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn visual_type_round_trips_through_strings() {
        assert_eq!(VisualType::Mandala.to_string(), "mandala");
        assert_eq!(VisualType::from_str("tunnel").unwrap(), VisualType::Tunnel);
    }

    #[test]
    fn layer_kind_serde_uses_lowercase() {
        let json = serde_json::to_string(&LayerKind::Isochronic).unwrap();
        assert_eq!(json, "\"isochronic\"");
    }
}
