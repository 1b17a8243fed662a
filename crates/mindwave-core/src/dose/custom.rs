//! User-authored session templates.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::model::{Dose, DoseCategory, FrequencyLayer, LayerKind, VisualType};

/// Maximum number of saved custom trips per user.
pub const MAX_CUSTOM_TRIPS: usize = 12;

/// A saved custom trip created through the builder.
///
/// Stored in the durable state and converted to a [`Dose`] on demand so the
/// session pipeline never distinguishes catalog from custom templates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTrip {
    pub id: String,
    pub name: String,
    pub duration_secs: u32,
    pub intensity: u8,
    /// (base_freq, beat_freq) pairs; kind is chosen per pair in `to_dose`
    pub frequencies: Vec<CustomLayer>,
    pub visual_type: VisualType,
    /// Unix seconds
    pub created_at: u64,
}

/// A single layer of a custom trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomLayer {
    pub base_freq: f64,
    pub beat_freq: f64,
    #[serde(default = "default_kind")]
    pub kind: LayerKind,
}

fn default_kind() -> LayerKind {
    LayerKind::Binaural
}

impl CustomTrip {
    /// Builds a new custom trip with a generated identifier.
    pub fn new(
        name: impl Into<String>,
        duration_secs: u32,
        intensity: u8,
        frequencies: Vec<CustomLayer>,
        visual_type: VisualType,
        created_at: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            duration_secs,
            intensity: intensity.clamp(1, 10),
            frequencies,
            visual_type,
            created_at,
        }
    }

    /// Synthesizes a [`Dose`] so the template can be played like any
    /// catalog entry. Custom trips are never premium-gated.
    pub fn to_dose(&self) -> Dose {
        let frequencies = self
            .frequencies
            .iter()
            .enumerate()
            .map(|(i, l)| FrequencyLayer::new(format!("Layer {}", i + 1), l.base_freq, l.beat_freq, l.kind))
            .collect();
        Dose {
            id: format!("custom-{}", self.id),
            name: self.name.clone(),
            slug: format!("custom-{}", self.id),
            tagline: "Custom Trip".into(),
            description: "User-crafted frequency journey.".into(),
            category: DoseCategory::Creative,
            frequencies,
            default_duration_secs: self.duration_secs,
            intensity: self.intensity,
            visual_type: self.visual_type,
            colors: vec![
                "#8b5cf6".into(),
                "#06b6d4".into(),
                "#f59e0b".into(),
                "#ec4899".into(),
            ],
            effects: vec!["Custom blend".into()],
            is_premium: false,
            price: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CustomTrip {
        CustomTrip::new(
            "Night Drift",
            1200,
            7,
            vec![CustomLayer {
                base_freq: 180.0,
                beat_freq: 4.0,
                kind: LayerKind::Binaural,
            }],
            VisualType::Cosmic,
            1_700_000_000,
        )
    }

    #[test]
    fn to_dose_preserves_recipe() {
        let trip = sample();
        let dose = trip.to_dose();
        assert_eq!(dose.default_duration_secs, 1200);
        assert_eq!(dose.intensity, 7);
        assert_eq!(dose.frequencies.len(), 1);
        assert_eq!(dose.frequencies[0].base_freq, 180.0);
        assert!(!dose.is_premium);
        assert!(dose.id.starts_with("custom-"));
    }

    #[test]
    fn intensity_is_clamped_on_construction() {
        let trip = CustomTrip::new("x", 60, 99, vec![], VisualType::Waves, 0);
        assert_eq!(trip.intensity, 10);
    }
}
