//! Durable user state.
//!
//! The persisted subset of application state: the local trial mirror, the
//! journal, saved custom trips, and the premium flag. Deliberately split
//! from the volatile [`crate::session::SessionStore`] so a reload abandons
//! any in-progress session but never loses history.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::dose::custom::{CustomTrip, MAX_CUSTOM_TRIPS};
use crate::error::Result;
use crate::journal::JournalEntry;

/// State persisted across process restarts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DurableState {
    /// Local mirror of the shared trial ledger (best-effort cache)
    #[serde(default)]
    pub trial_mirror: HashMap<String, u32>,
    /// Journal entries, newest-first
    #[serde(default)]
    pub journal: Vec<JournalEntry>,
    /// Saved custom trips, newest-first, capped at [`MAX_CUSTOM_TRIPS`]
    #[serde(default)]
    pub custom_trips: Vec<CustomTrip>,
    #[serde(default)]
    pub is_premium: bool,
}

impl DurableState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends a journal entry (most-recent-first ordering).
    pub fn push_journal_entry(&mut self, entry: JournalEntry) {
        self.journal.insert(0, entry);
    }

    /// Prepends a custom trip, dropping the oldest past the cap.
    pub fn push_custom_trip(&mut self, trip: CustomTrip) {
        self.custom_trips.insert(0, trip);
        self.custom_trips.truncate(MAX_CUSTOM_TRIPS);
    }

    /// Removes a custom trip by id. Unknown ids are ignored.
    pub fn delete_custom_trip(&mut self, id: &str) {
        self.custom_trips.retain(|t| t.id != id);
    }
}

/// Repository for the durable state file.
#[async_trait]
pub trait StateRepository: Send + Sync {
    /// Returns the current state (cached or loaded).
    async fn get_state(&self) -> Result<DurableState>;

    /// Replaces and persists the whole state.
    async fn save_state(&self, state: DurableState) -> Result<()>;

    /// Appends a journal entry and persists.
    async fn add_journal_entry(&self, entry: JournalEntry) -> Result<()>;

    /// Saves a custom trip and persists.
    async fn add_custom_trip(&self, trip: CustomTrip) -> Result<()>;

    /// Deletes a custom trip and persists.
    async fn delete_custom_trip(&self, id: &str) -> Result<()>;

    /// Updates the local trial mirror for one dose and persists.
    async fn set_trial_mirror(&self, dose_id: &str, remaining: u32) -> Result<()>;

    /// Sets the premium flag and persists.
    async fn set_premium(&self, premium: bool) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dose::custom::CustomLayer;
    use crate::dose::{LayerKind, VisualType};

    fn trip(name: &str, created_at: u64) -> CustomTrip {
        CustomTrip::new(
            name,
            600,
            5,
            vec![CustomLayer {
                base_freq: 200.0,
                beat_freq: 7.0,
                kind: LayerKind::Binaural,
            }],
            VisualType::Waves,
            created_at,
        )
    }

    #[test]
    fn journal_is_newest_first() {
        let mut state = DurableState::new();
        let older = crate::journal::NewJournalEntry {
            dose_id: "lsd".into(),
            dose_name: "LSD Journey".into(),
            mood: vec![],
            intensity: 7,
            notes: String::new(),
            duration_secs: 100,
        }
        .into_entry(1);
        let newer = crate::journal::NewJournalEntry {
            dose_id: "dmt".into(),
            dose_name: "DMT Breakthrough".into(),
            mood: vec![],
            intensity: 10,
            notes: String::new(),
            duration_secs: 200,
        }
        .into_entry(2);
        state.push_journal_entry(older);
        state.push_journal_entry(newer);
        assert_eq!(state.journal[0].dose_id, "dmt");
    }

    #[test]
    fn custom_trips_are_capped() {
        let mut state = DurableState::new();
        for i in 0..(MAX_CUSTOM_TRIPS + 3) {
            state.push_custom_trip(trip(&format!("t{i}"), i as u64));
        }
        assert_eq!(state.custom_trips.len(), MAX_CUSTOM_TRIPS);
        // Newest stays at the front.
        assert_eq!(state.custom_trips[0].name, format!("t{}", MAX_CUSTOM_TRIPS + 2));
    }

    #[test]
    fn delete_custom_trip_ignores_unknown_ids() {
        let mut state = DurableState::new();
        state.push_custom_trip(trip("keep", 1));
        state.delete_custom_trip("nope");
        assert_eq!(state.custom_trips.len(), 1);
        let id = state.custom_trips[0].id.clone();
        state.delete_custom_trip(&id);
        assert!(state.custom_trips.is_empty());
    }
}
