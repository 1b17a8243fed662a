//! Session domain: the volatile trip state machine.
//!
//! A session ("trip") is one timed playback of a dose. At most one session
//! is active per process, owned by the [`store::SessionStore`]. Nothing in
//! this module performs I/O; the application layer drives the store from a
//! 1 Hz timer and reacts to the emitted [`event::SessionEvent`]s.

pub mod event;
pub mod phase;
pub mod store;

pub use event::SessionEvent;
pub use phase::TripPhase;
pub use store::{ActiveSession, EndedSession, SessionSnapshot, SessionStore, TickOutcome};
