pub mod clock;
pub mod config;
pub mod dose;
pub mod durable;
pub mod error;
pub mod gateway;
pub mod journal;
pub mod output;
pub mod session;
pub mod trial;

// Re-export common error type
pub use error::MindwaveError;
