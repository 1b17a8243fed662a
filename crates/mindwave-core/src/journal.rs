//! Journal domain model.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single journal record, either synthesized on session completion or
/// authored by hand. Stored newest-first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub id: String,
    pub dose_id: String,
    pub dose_name: String,
    /// Unix seconds
    pub timestamp: u64,
    /// Mood tags selected by the user (free-form vocabulary)
    #[serde(default)]
    pub mood: Vec<String>,
    pub intensity: u8,
    #[serde(default)]
    pub notes: String,
    pub duration_secs: u32,
}

/// Fields of a journal entry before an id and timestamp are assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewJournalEntry {
    pub dose_id: String,
    pub dose_name: String,
    #[serde(default)]
    pub mood: Vec<String>,
    pub intensity: u8,
    #[serde(default)]
    pub notes: String,
    pub duration_secs: u32,
}

impl NewJournalEntry {
    /// Stamps the entry with a fresh id and the given creation time.
    pub fn into_entry(self, timestamp: u64) -> JournalEntry {
        JournalEntry {
            id: Uuid::new_v4().to_string(),
            dose_id: self.dose_id,
            dose_name: self.dose_name,
            timestamp,
            mood: self.mood,
            intensity: self.intensity,
            notes: self.notes,
            duration_secs: self.duration_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn into_entry_assigns_id_and_timestamp() {
        let new = NewJournalEntry {
            dose_id: "lsd".into(),
            dose_name: "LSD Journey".into(),
            mood: vec!["euphoric".into()],
            intensity: 7,
            notes: String::new(),
            duration_secs: 2700,
        };
        let entry = new.into_entry(1_700_000_123);
        assert!(!entry.id.is_empty());
        assert_eq!(entry.timestamp, 1_700_000_123);
        assert_eq!(entry.duration_secs, 2700);
    }
}
