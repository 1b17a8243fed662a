//! Durable state repository backed by a single TOML file.
//!
//! The whole [`DurableState`] document is cached in memory and rewritten
//! atomically on every mutation. The cache mutex is held across the save,
//! which serializes writers and keeps the file ordering consistent with
//! the in-memory ordering.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use mindwave_core::dose::custom::CustomTrip;
use mindwave_core::durable::{DurableState, StateRepository};
use mindwave_core::error::{MindwaveError, Result};
use mindwave_core::journal::JournalEntry;

use crate::paths::MindwavePaths;
use crate::storage::AtomicTomlFile;

/// File-backed implementation of [`StateRepository`].
pub struct TomlStateRepository {
    state: Mutex<DurableState>,
    file: Arc<AtomicTomlFile<DurableState>>,
}

impl TomlStateRepository {
    /// Opens the repository at the given path, loading any existing state.
    ///
    /// A missing or empty file starts from [`DurableState::default`].
    pub fn new(path: PathBuf) -> Result<Self> {
        let file = AtomicTomlFile::<DurableState>::new(path);
        let initial = file.load()?.unwrap_or_default();
        debug!(
            journal_entries = initial.journal.len(),
            custom_trips = initial.custom_trips.len(),
            "durable state loaded"
        );
        Ok(Self {
            state: Mutex::new(initial),
            file: Arc::new(file),
        })
    }

    /// Opens the repository at the default platform path.
    pub fn at_default_path() -> Result<Self> {
        Self::new(MindwavePaths::state_file()?)
    }

    async fn persist(&self, snapshot: DurableState) -> Result<()> {
        let file = Arc::clone(&self.file);
        tokio::task::spawn_blocking(move || file.save(&snapshot))
            .await
            .map_err(|e| MindwaveError::internal(format!("state save task failed: {e}")))?
    }
}

#[async_trait]
impl StateRepository for TomlStateRepository {
    async fn get_state(&self) -> Result<DurableState> {
        Ok(self.state.lock().await.clone())
    }

    async fn save_state(&self, state: DurableState) -> Result<()> {
        let mut guard = self.state.lock().await;
        *guard = state.clone();
        self.persist(state).await
    }

    async fn add_journal_entry(&self, entry: JournalEntry) -> Result<()> {
        let mut guard = self.state.lock().await;
        guard.push_journal_entry(entry);
        let snapshot = guard.clone();
        self.persist(snapshot).await
    }

    async fn add_custom_trip(&self, trip: CustomTrip) -> Result<()> {
        let mut guard = self.state.lock().await;
        guard.push_custom_trip(trip);
        let snapshot = guard.clone();
        self.persist(snapshot).await
    }

    async fn delete_custom_trip(&self, id: &str) -> Result<()> {
        let mut guard = self.state.lock().await;
        guard.delete_custom_trip(id);
        let snapshot = guard.clone();
        self.persist(snapshot).await
    }

    async fn set_trial_mirror(&self, dose_id: &str, remaining: u32) -> Result<()> {
        let mut guard = self.state.lock().await;
        guard.trial_mirror.insert(dose_id.to_string(), remaining);
        let snapshot = guard.clone();
        self.persist(snapshot).await
    }

    async fn set_premium(&self, premium: bool) -> Result<()> {
        let mut guard = self.state.lock().await;
        guard.is_premium = premium;
        let snapshot = guard.clone();
        self.persist(snapshot).await
    }
}
