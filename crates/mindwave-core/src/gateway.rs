//! Remote persistence gateway trait.
//!
//! Thin request/response contract over the hosted backend. The gateway
//! crate implements this with reqwest; tests substitute in-memory fakes.
//! Every operation here crosses the network and is fire-and-forget from
//! the UI's perspective except the trial claim (see [`crate::trial`]).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::journal::JournalEntry;

/// A user's backend profile, as far as the core cares about it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub is_premium: bool,
}

/// A post-session rating, 1-5 stars.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RatingSubmission {
    pub dose_id: String,
    pub rating: u8,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default)]
    pub would_recommend: Option<bool>,
}

/// Feedback captured when a user bails out before the 90% mark.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitFeedback {
    pub dose_id: String,
    pub dose_name: String,
    pub elapsed_secs: u32,
    pub reason: String,
    #[serde(default)]
    pub feedback: Option<String>,
}

/// A public testimonial submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestimonialSubmission {
    pub name: String,
    pub content: String,
    pub rating: u8,
    #[serde(default)]
    pub dose_id: Option<String>,
}

/// What kind of thing a suggestion proposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionKind {
    Dose,
    Visual,
}

/// Request/response wrapper around the hosted backend.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Looks up a user profile; `Ok(None)` when the user is unknown.
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>>;

    /// Persists a journal entry remotely.
    async fn save_journal_entry(&self, user_id: &str, entry: &JournalEntry) -> Result<()>;

    /// Fetches a user's journal, newest-first.
    async fn get_journal_entries(&self, user_id: &str) -> Result<Vec<JournalEntry>>;

    /// Submits a post-session rating.
    async fn submit_rating(&self, user_id: &str, rating: &RatingSubmission) -> Result<()>;

    /// Submits early-exit feedback. `user_id` is optional because exits
    /// happen for anonymous users too.
    async fn submit_exit_feedback(
        &self,
        user_id: Option<&str>,
        feedback: &ExitFeedback,
    ) -> Result<()>;

    /// Submits a testimonial for moderation.
    async fn submit_testimonial(
        &self,
        user_id: Option<&str>,
        testimonial: &TestimonialSubmission,
    ) -> Result<()>;

    /// Submits a suggestion-box entry.
    async fn submit_suggestion(
        &self,
        user_id: Option<&str>,
        kind: SuggestionKind,
        content: &str,
        category: Option<&str>,
    ) -> Result<()>;
}
