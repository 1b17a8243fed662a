//! Built-in dose catalog.
//!
//! Constructed once at startup and never mutated. The trial ledger and the
//! session use case both key on `Dose::id`.

use once_cell::sync::Lazy;

use super::model::{Dose, DoseCategory, FrequencyLayer, LayerKind, VisualType};

fn layer(name: &str, base_freq: f64, beat_freq: f64, kind: LayerKind) -> FrequencyLayer {
    FrequencyLayer::new(name, base_freq, beat_freq, kind)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// The static dose catalog.
pub static DOSES: Lazy<Vec<Dose>> = Lazy::new(|| {
    vec![
        Dose {
            id: "psilocybin".into(),
            name: "Psilocybin".into(),
            slug: "psilocybin".into(),
            tagline: "Mushroom Mysticism".into(),
            description: "Deep introspective journey with fractal visuals and ego dissolution."
                .into(),
            category: DoseCategory::Psychedelic,
            frequencies: vec![
                layer("Theta Deep", 200.0, 6.0, LayerKind::Binaural),
                layer("528Hz Love", 528.0, 0.0, LayerKind::Solfeggio),
            ],
            default_duration_secs: 1800,
            intensity: 8,
            visual_type: VisualType::Fractals,
            colors: strings(&["#8b5cf6", "#3b82f6", "#f59e0b", "#22c55e"]),
            effects: strings(&["Ego dissolution", "Visual fractals", "Deep insight"]),
            is_premium: false,
            price: None,
        },
        Dose {
            id: "dmt".into(),
            name: "DMT Breakthrough".into(),
            slug: "dmt".into(),
            tagline: "Hyperspace Gateway".into(),
            description: "Intense geometric hyperspace breakthrough. Not for beginners.".into(),
            category: DoseCategory::Psychedelic,
            frequencies: vec![
                layer("Gamma Burst", 400.0, 40.0, LayerKind::Binaural),
                layer("963Hz Crown", 963.0, 0.0, LayerKind::Solfeggio),
            ],
            default_duration_secs: 900,
            intensity: 10,
            visual_type: VisualType::Tunnel,
            colors: strings(&["#ec4899", "#06b6d4", "#f59e0b", "#ffffff"]),
            effects: strings(&["Hyperspace", "Time dissolution", "Geometric visions"]),
            is_premium: true,
            price: Some(4.99),
        },
        Dose {
            id: "lsd".into(),
            name: "LSD Journey".into(),
            slug: "lsd".into(),
            tagline: "Reality Enhancement".into(),
            description: "Classic psychedelic experience with enhanced colors and breathing walls."
                .into(),
            category: DoseCategory::Psychedelic,
            frequencies: vec![
                layer("Alpha Wave", 300.0, 10.0, LayerKind::Binaural),
                layer("Theta Layer", 250.0, 7.0, LayerKind::Binaural),
            ],
            default_duration_secs: 2700,
            intensity: 7,
            visual_type: VisualType::Waves,
            colors: strings(&["#f97316", "#8b5cf6", "#22c55e", "#06b6d4"]),
            effects: strings(&["Enhanced colors", "Breathing visuals", "Time dilation"]),
            is_premium: false,
            price: None,
        },
        Dose {
            id: "mdma".into(),
            name: "MDMA Euphoria".into(),
            slug: "mdma".into(),
            tagline: "Pure Love & Connection".into(),
            description: "Waves of euphoria, empathy, and connection.".into(),
            category: DoseCategory::Euphoric,
            frequencies: vec![
                layer("Alpha Bliss", 350.0, 10.0, LayerKind::Binaural),
                layer("528Hz Heart", 528.0, 0.0, LayerKind::Solfeggio),
            ],
            default_duration_secs: 2400,
            intensity: 8,
            visual_type: VisualType::Particles,
            colors: strings(&["#ec4899", "#f472b6", "#fbbf24", "#ffffff"]),
            effects: strings(&["Euphoria", "Empathy", "Love waves"]),
            is_premium: false,
            price: None,
        },
        Dose {
            id: "cannabis".into(),
            name: "Cannabis Calm".into(),
            slug: "cannabis".into(),
            tagline: "Mellow Body Glow".into(),
            description: "Gentle full-body relaxation with a soft creative drift.".into(),
            category: DoseCategory::Euphoric,
            frequencies: vec![
                layer("Alpha Chill", 220.0, 10.0, LayerKind::Binaural),
                layer("432Hz Earth", 432.0, 0.0, LayerKind::Solfeggio),
            ],
            default_duration_secs: 1800,
            intensity: 4,
            visual_type: VisualType::Breath,
            colors: strings(&["#22c55e", "#84cc16", "#fbbf24", "#14b8a6"]),
            effects: strings(&["Relaxation", "Body glow", "Creative drift"]),
            is_premium: false,
            price: None,
        },
        Dose {
            id: "ketamine".into(),
            name: "Ketamine Drift".into(),
            slug: "ketamine".into(),
            tagline: "Weightless Dissociation".into(),
            description: "Slow dissociative drift through deep delta space.".into(),
            category: DoseCategory::Dissociative,
            frequencies: vec![
                layer("Delta Deep", 150.0, 2.0, LayerKind::Binaural),
                layer("Theta Float", 180.0, 5.0, LayerKind::Binaural),
            ],
            default_duration_secs: 1500,
            intensity: 9,
            visual_type: VisualType::Cosmic,
            colors: strings(&["#6366f1", "#0ea5e9", "#a78bfa", "#f8fafc"]),
            effects: strings(&["Dissociation", "Weightlessness", "K-hole drift"]),
            is_premium: true,
            price: Some(3.99),
        },
        Dose {
            id: "mescaline".into(),
            name: "Mescaline Vision".into(),
            slug: "mescaline".into(),
            tagline: "Desert Cactus Wisdom".into(),
            description: "Warm visionary state with mandala geometry and grounded clarity.".into(),
            category: DoseCategory::Psychedelic,
            frequencies: vec![
                layer("Theta Vision", 280.0, 6.0, LayerKind::Binaural),
                layer("396Hz Root", 396.0, 0.0, LayerKind::Solfeggio),
            ],
            default_duration_secs: 2400,
            intensity: 7,
            visual_type: VisualType::Mandala,
            colors: strings(&["#f59e0b", "#ef4444", "#84cc16", "#f472b6"]),
            effects: strings(&["Visionary geometry", "Warmth", "Clarity"]),
            is_premium: true,
            price: Some(3.99),
        },
        Dose {
            id: "ayahuasca".into(),
            name: "Ayahuasca Ceremony".into(),
            slug: "ayahuasca".into(),
            tagline: "Jungle Medicine Spirit".into(),
            description: "Long ceremonial journey of purging, healing, and chakra visions.".into(),
            category: DoseCategory::Psychedelic,
            frequencies: vec![
                layer("Delta Heal", 120.0, 3.0, LayerKind::Binaural),
                layer("Theta Spirit", 200.0, 7.0, LayerKind::Binaural),
                layer("174Hz Pain", 174.0, 0.0, LayerKind::Solfeggio),
            ],
            default_duration_secs: 3600,
            intensity: 10,
            visual_type: VisualType::Chakra,
            colors: strings(&["#22c55e", "#8b5cf6", "#f59e0b", "#ef4444"]),
            effects: strings(&["Healing", "Purging", "Spirit visions"]),
            is_premium: true,
            price: Some(5.99),
        },
        Dose {
            id: "adderall".into(),
            name: "Adderall Focus".into(),
            slug: "adderall".into(),
            tagline: "Laser Lock-In".into(),
            description: "Sustained beta/gamma focus for deep work blocks.".into(),
            category: DoseCategory::Focus,
            frequencies: vec![
                layer("Beta Focus", 350.0, 18.0, LayerKind::Binaural),
                layer("Gamma Sharp", 400.0, 32.0, LayerKind::Binaural),
            ],
            default_duration_secs: 3600,
            intensity: 6,
            visual_type: VisualType::Breath,
            colors: strings(&["#0ea5e9", "#6366f1", "#f8fafc", "#22d3ee"]),
            effects: strings(&["Focus", "Motivation", "Flow state"]),
            is_premium: false,
            price: None,
        },
        Dose {
            id: "ambien".into(),
            name: "Ambien Dreams".into(),
            slug: "ambien".into(),
            tagline: "Hypnagogic Descent".into(),
            description: "Delta descent into hypnagogic dream imagery.".into(),
            category: DoseCategory::Sleep,
            frequencies: vec![
                layer("Delta Sleep", 100.0, 2.0, LayerKind::Binaural),
                layer("Theta Dream", 150.0, 5.0, LayerKind::Binaural),
            ],
            default_duration_secs: 1800,
            intensity: 5,
            visual_type: VisualType::Cosmic,
            colors: strings(&["#1e3a8a", "#6366f1", "#0f172a", "#a78bfa"]),
            effects: strings(&["Sleep onset", "Dream imagery", "Deep rest"]),
            is_premium: true,
            price: Some(2.99),
        },
        Dose {
            id: "meditation".into(),
            name: "Deep Meditation".into(),
            slug: "meditation".into(),
            tagline: "Still Mind Temple".into(),
            description: "Layered theta/alpha stillness with a crown-chakra shimmer.".into(),
            category: DoseCategory::Meditative,
            frequencies: vec![
                layer("Theta Zen", 200.0, 7.0, LayerKind::Binaural),
                layer("Alpha Peace", 250.0, 10.0, LayerKind::Binaural),
                layer("963Hz Crown", 963.0, 0.0, LayerKind::Solfeggio),
            ],
            default_duration_secs: 2400,
            intensity: 3,
            visual_type: VisualType::Chakra,
            colors: strings(&["#a78bfa", "#f8fafc", "#fbbf24", "#8b5cf6"]),
            effects: strings(&["Stillness", "Presence", "Inner space"]),
            is_premium: false,
            price: None,
        },
        Dose {
            id: "caffeine".into(),
            name: "Caffeine Rush".into(),
            slug: "caffeine".into(),
            tagline: "Morning Voltage".into(),
            description: "Bright beta alertness with an isochronic edge.".into(),
            category: DoseCategory::Focus,
            frequencies: vec![
                layer("Beta Alert", 380.0, 16.0, LayerKind::Binaural),
                layer("Pulse Edge", 420.0, 12.0, LayerKind::Isochronic),
            ],
            default_duration_secs: 1200,
            intensity: 5,
            visual_type: VisualType::Breath,
            colors: strings(&["#f59e0b", "#ef4444", "#fbbf24", "#f8fafc"]),
            effects: strings(&["Alertness", "Energy", "Drive"]),
            is_premium: false,
            price: None,
        },
    ]
});

/// Looks up a catalog dose by id.
pub fn dose_by_id(id: &str) -> Option<&'static Dose> {
    DOSES.iter().find(|d| d.id == id)
}
