//! Remote persistence gateway for the hosted backend.
//!
//! Implements the core seam traits ([`mindwave_core::trial::TrialAuthority`]
//! and [`mindwave_core::gateway::PersistenceGateway`]) over the backend's
//! REST/RPC surface with reqwest. The server-side stored procedures
//! (`claim_trial`, `get_trials_remaining`) stay external collaborators;
//! this crate only shapes requests and maps errors.

mod client;
mod types;

pub use client::BackendClient;
