//! Dose domain: catalog session templates and user-authored variants.

pub mod catalog;
pub mod custom;
pub mod model;

pub use catalog::{dose_by_id, DOSES};
pub use custom::{CustomTrip, MAX_CUSTOM_TRIPS};
pub use model::{Dose, DoseCategory, FrequencyLayer, LayerKind, VisualType};
