//! Application services.
//!
//! Coordinates the domain core with the gateway, the engine, and the
//! durable store: the trial ledger (cached, polled, claim-gated), the
//! fixed-window rate limiter for the trials endpoint, and the session
//! use case with its 1 Hz phase driver.

pub mod ledger;
pub mod rate_limit;
pub mod session;

pub use ledger::TrialLedger;
pub use rate_limit::{FixedWindowLimiter, RateDecision};
pub use session::usecase::{SessionUsecase, StartOutcome, StopDecision, UserContext};
