//! Backend REST/RPC client.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;

use mindwave_core::config::BackendConfig;
use mindwave_core::error::{MindwaveError, Result};
use mindwave_core::gateway::{
    ExitFeedback, PersistenceGateway, Profile, RatingSubmission, SuggestionKind,
    TestimonialSubmission,
};
use mindwave_core::journal::JournalEntry;
use mindwave_core::trial::{ClaimOutcome, TrialAuthority};

use crate::types::{
    ClaimRequest, ClaimResponse, ExitFeedbackInsert, GlobalTrialRow, JournalInsert, JournalRow,
    ProfileRow, RatingInsert, RemainingRequest, SuggestionInsert, TestimonialInsert,
};

/// Client for the hosted backend's REST and RPC surface.
///
/// Holds one pooled reqwest client; clone freely.
#[derive(Clone, Debug)]
pub struct BackendClient {
    client: Client,
    base_url: String,
    anon_key: String,
    claim_timeout: Duration,
}

impl BackendClient {
    /// Builds a client from backend configuration.
    ///
    /// # Errors
    ///
    /// Returns a config error when the URL is empty or the underlying
    /// HTTP client cannot be constructed.
    pub fn new(config: &BackendConfig) -> Result<Self> {
        if config.url.trim().is_empty() {
            return Err(MindwaveError::config("backend URL must not be empty"));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| MindwaveError::config(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            anon_key: config.anon_key.clone(),
            claim_timeout: Duration::from_secs(config.claim_timeout_secs),
        })
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    fn rpc_url(&self, procedure: &str) -> String {
        format!("{}/rest/v1/rpc/{}", self.base_url, procedure)
    }

    async fn call_rpc<B, R>(&self, procedure: &str, body: &B, timeout: Option<Duration>) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let mut request = self
            .client
            .post(self.rpc_url(procedure))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .json(body);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|err| {
            if err.is_timeout() {
                MindwaveError::timeout(procedure.to_string(), self.claim_timeout.as_secs())
            } else {
                MindwaveError::gateway(
                    format!("{procedure} request failed: {err}"),
                    err.is_connect(),
                )
            }
        })?;

        let response = check_status(response, procedure).await?;
        response
            .json()
            .await
            .map_err(|err| MindwaveError::gateway(format!("{procedure}: invalid body: {err}"), false))
    }

    async fn select<R>(&self, path_and_query: &str) -> Result<Vec<R>>
    where
        R: DeserializeOwned,
    {
        let response = self
            .client
            .get(self.rest_url(path_and_query))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .send()
            .await
            .map_err(|err| {
                MindwaveError::gateway(format!("select failed: {err}"), err.is_connect())
            })?;

        let response = check_status(response, path_and_query).await?;
        response
            .json()
            .await
            .map_err(|err| MindwaveError::gateway(format!("invalid select body: {err}"), false))
    }

    async fn insert<B>(&self, table: &str, body: &B) -> Result<()>
    where
        B: Serialize + Sync,
    {
        let response = self
            .client
            .post(self.rest_url(table))
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
            .header("prefer", "return=minimal")
            .json(body)
            .send()
            .await
            .map_err(|err| {
                MindwaveError::gateway(format!("insert into {table} failed: {err}"), err.is_connect())
            })?;

        check_status(response, table).await?;
        Ok(())
    }
}

/// Maps a non-success HTTP status to a typed error, reading the body for
/// diagnostics. 429 and 5xx are retryable.
async fn check_status(response: reqwest::Response, context: &str) -> Result<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "<unreadable error body>".to_string());
    warn!(%status, context, "backend request failed");
    let retryable = matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    );
    Err(MindwaveError::gateway_status(
        status.as_u16(),
        format!("{context}: {body}"),
        retryable,
    ))
}

#[async_trait]
impl TrialAuthority for BackendClient {
    async fn fetch_counts(&self) -> Result<HashMap<String, u32>> {
        let rows: Vec<GlobalTrialRow> = self
            .select("global_trials?select=dose_id,trials_remaining")
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| (row.dose_id.clone(), row.remaining()))
            .collect())
    }

    async fn remaining(&self, dose_id: &str) -> Result<u32> {
        let count: i64 = self
            .call_rpc(
                "get_trials_remaining",
                &RemainingRequest { p_dose_id: dose_id },
                None,
            )
            .await?;
        Ok(count.max(0) as u32)
    }

    async fn claim(&self, dose_id: &str, user_id: &str) -> Result<ClaimOutcome> {
        let response: ClaimResponse = self
            .call_rpc(
                "claim_trial",
                &ClaimRequest {
                    p_dose_id: dose_id,
                    p_user_id: user_id,
                    p_ip: None,
                },
                Some(self.claim_timeout),
            )
            .await?;
        Ok(ClaimOutcome {
            success: response.success,
            remaining: response.trials_remaining.map(|n| n.max(0) as u32),
            error: response.error,
        })
    }
}

#[async_trait]
impl PersistenceGateway for BackendClient {
    async fn get_profile(&self, user_id: &str) -> Result<Option<Profile>> {
        let rows: Vec<ProfileRow> = self
            .select(&format!("profiles?id=eq.{user_id}&select=*"))
            .await?;
        Ok(rows.into_iter().next().map(Profile::from))
    }

    async fn save_journal_entry(&self, user_id: &str, entry: &JournalEntry) -> Result<()> {
        self.insert(
            "journal_entries",
            &JournalInsert {
                user_id,
                dose_id: &entry.dose_id,
                dose_name: &entry.dose_name,
                mood: &entry.mood,
                intensity: entry.intensity,
                notes: &entry.notes,
                duration: entry.duration_secs,
            },
        )
        .await
    }

    async fn get_journal_entries(&self, user_id: &str) -> Result<Vec<JournalEntry>> {
        let rows: Vec<JournalRow> = self
            .select(&format!(
                "journal_entries?user_id=eq.{user_id}&select=*&order=created_at.desc"
            ))
            .await?;
        Ok(rows.into_iter().map(JournalRow::into_entry).collect())
    }

    async fn submit_rating(&self, user_id: &str, rating: &RatingSubmission) -> Result<()> {
        self.insert(
            "trip_ratings",
            &RatingInsert {
                user_id,
                dose_id: &rating.dose_id,
                rating: rating.rating.clamp(1, 5),
                feedback: rating.feedback.as_deref(),
                would_recommend: rating.would_recommend,
            },
        )
        .await
    }

    async fn submit_exit_feedback(
        &self,
        user_id: Option<&str>,
        feedback: &ExitFeedback,
    ) -> Result<()> {
        self.insert(
            "exit_feedback",
            &ExitFeedbackInsert {
                user_id,
                dose_id: &feedback.dose_id,
                dose_name: &feedback.dose_name,
                elapsed_seconds: feedback.elapsed_secs,
                reason: &feedback.reason,
                feedback: feedback.feedback.as_deref(),
            },
        )
        .await
    }

    async fn submit_testimonial(
        &self,
        user_id: Option<&str>,
        testimonial: &TestimonialSubmission,
    ) -> Result<()> {
        self.insert(
            "testimonials",
            &TestimonialInsert {
                user_id,
                name: &testimonial.name,
                content: &testimonial.content,
                rating: testimonial.rating.clamp(1, 5),
                dose_id: testimonial.dose_id.as_deref(),
            },
        )
        .await
    }

    async fn submit_suggestion(
        &self,
        user_id: Option<&str>,
        kind: SuggestionKind,
        content: &str,
        category: Option<&str>,
    ) -> Result<()> {
        let kind = match kind {
            SuggestionKind::Dose => "drug",
            SuggestionKind::Visual => "visual",
        };
        self.insert(
            "suggestions",
            &SuggestionInsert {
                user_id,
                kind,
                content,
                category,
            },
        )
        .await
    }
}
