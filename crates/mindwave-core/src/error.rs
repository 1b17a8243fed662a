//! Error types for the Mindwave application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Mindwave application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum MindwaveError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Data access error (repository/storage layer)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Remote backend error with optional HTTP status
    #[error("Gateway error: {message}")]
    Gateway {
        status: Option<u16>,
        message: String,
        retryable: bool,
    },

    /// A remote call exceeded its deadline
    #[error("Timeout after {seconds}s: {operation}")]
    Timeout { operation: String, seconds: u64 },

    /// Request rejected by the fixed-window rate limiter
    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MindwaveError {
    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates a Gateway error without an HTTP status (transport-level failure)
    pub fn gateway(message: impl Into<String>, retryable: bool) -> Self {
        Self::Gateway {
            status: None,
            message: message.into(),
            retryable,
        }
    }

    /// Creates a Gateway error carrying the HTTP status of the response
    pub fn gateway_status(status: u16, message: impl Into<String>, retryable: bool) -> Self {
        Self::Gateway {
            status: Some(status),
            message: message.into(),
            retryable,
        }
    }

    /// Creates a Timeout error
    pub fn timeout(operation: impl Into<String>, seconds: u64) -> Self {
        Self::Timeout {
            operation: operation.into(),
            seconds,
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// True when retrying the failed operation may succeed.
    ///
    /// Covers transport failures, timeouts, rate limiting, and the
    /// retryable subset of HTTP statuses (429/5xx).
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Gateway { retryable, .. } => *retryable,
            Self::Timeout { .. } | Self::RateLimited { .. } => true,
            _ => false,
        }
    }
}

impl From<std::io::Error> for MindwaveError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for MindwaveError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for MindwaveError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for MindwaveError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (for binary edges)
impl From<anyhow::Error> for MindwaveError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, MindwaveError>`.
pub type Result<T> = std::result::Result<T, MindwaveError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gateway_retryable_classification() {
        assert!(MindwaveError::gateway("connection reset", true).is_retryable());
        assert!(!MindwaveError::gateway_status(400, "bad request", false).is_retryable());
        assert!(MindwaveError::timeout("claim_trial", 5).is_retryable());
        assert!(!MindwaveError::config("missing key").is_retryable());
    }

    #[test]
    fn not_found_helper() {
        let err = MindwaveError::not_found("dose", "dmt");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Entity not found: dose 'dmt'");
    }
}
