//! Wire types for the hosted backend.
//!
//! Row shapes mirror the backend tables; conversions into domain types
//! live here so the client stays free of field-by-field mapping noise.

use chrono::DateTime;
use serde::{Deserialize, Serialize};

use mindwave_core::gateway::Profile;
use mindwave_core::journal::JournalEntry;

/// `global_trials` table row.
#[derive(Debug, Clone, Deserialize)]
pub struct GlobalTrialRow {
    pub dose_id: String,
    pub trials_remaining: i64,
}

impl GlobalTrialRow {
    /// Remaining count, floored at zero.
    pub fn remaining(&self) -> u32 {
        self.trials_remaining.max(0) as u32
    }
}

/// `claim_trial` RPC response body.
#[derive(Debug, Clone, Deserialize)]
pub struct ClaimResponse {
    pub success: bool,
    #[serde(default)]
    pub trials_remaining: Option<i64>,
    #[serde(default)]
    pub error: Option<String>,
}

/// `claim_trial` RPC request body.
#[derive(Debug, Clone, Serialize)]
pub struct ClaimRequest<'a> {
    pub p_dose_id: &'a str,
    pub p_user_id: &'a str,
    pub p_ip: Option<&'a str>,
}

/// `get_trials_remaining` RPC request body.
#[derive(Debug, Clone, Serialize)]
pub struct RemainingRequest<'a> {
    pub p_dose_id: &'a str,
}

/// `profiles` table row.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_premium: bool,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            email: row.email,
            full_name: row.full_name,
            is_premium: row.is_premium,
        }
    }
}

/// `journal_entries` table row.
#[derive(Debug, Clone, Deserialize)]
pub struct JournalRow {
    pub id: String,
    pub dose_id: String,
    pub dose_name: String,
    #[serde(default)]
    pub mood: Vec<String>,
    pub intensity: u8,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    pub created_at: String,
}

impl JournalRow {
    /// Converts a row into the domain entry. A malformed `created_at`
    /// degrades to timestamp 0 rather than failing the whole list.
    pub fn into_entry(self) -> JournalEntry {
        let timestamp = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.timestamp().max(0) as u64)
            .unwrap_or(0);
        JournalEntry {
            id: self.id,
            dose_id: self.dose_id,
            dose_name: self.dose_name,
            timestamp,
            mood: self.mood,
            intensity: self.intensity,
            notes: self.notes.unwrap_or_default(),
            duration_secs: self.duration.unwrap_or(0).max(0) as u32,
        }
    }
}

/// `journal_entries` insert payload.
#[derive(Debug, Clone, Serialize)]
pub struct JournalInsert<'a> {
    pub user_id: &'a str,
    pub dose_id: &'a str,
    pub dose_name: &'a str,
    pub mood: &'a [String],
    pub intensity: u8,
    pub notes: &'a str,
    pub duration: u32,
}

/// `trip_ratings` insert payload.
#[derive(Debug, Clone, Serialize)]
pub struct RatingInsert<'a> {
    pub user_id: &'a str,
    pub dose_id: &'a str,
    pub rating: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub would_recommend: Option<bool>,
}

/// `exit_feedback` insert payload.
#[derive(Debug, Clone, Serialize)]
pub struct ExitFeedbackInsert<'a> {
    pub user_id: Option<&'a str>,
    pub dose_id: &'a str,
    pub dose_name: &'a str,
    pub elapsed_seconds: u32,
    pub reason: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<&'a str>,
}

/// `testimonials` insert payload.
#[derive(Debug, Clone, Serialize)]
pub struct TestimonialInsert<'a> {
    pub user_id: Option<&'a str>,
    pub name: &'a str,
    pub content: &'a str,
    pub rating: u8,
    pub dose_id: Option<&'a str>,
}

/// `suggestions` insert payload.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionInsert<'a> {
    pub user_id: Option<&'a str>,
    #[serde(rename = "type")]
    pub kind: &'a str,
    pub content: &'a str,
    pub category: Option<&'a str>,
}
