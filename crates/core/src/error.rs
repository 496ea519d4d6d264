//! Unified error type for the consent tracker.

use thiserror::Error;

use crate::validate::ValidationFailure;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the consent tracker.
#[derive(Debug, Error)]
pub enum Error {
    /// Payload failed one or more field rules. Carries the full list.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("store error: {0}")]
    Store(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
