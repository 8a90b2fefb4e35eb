//! # Domain Errors
//!
//! Error types for the matching engine. Store and scheduling failures are
//! propagated to the caller unchanged; nothing is retried here.

use thiserror::Error;
use tl_01_correlation_store::StoreError;
use tl_02_janitor::JanitorError;

/// Matching engine error types.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MatchingError {
    /// No correlation key can be derived from the message.
    #[error("Invalid correlation key: {0}")]
    InvalidKey(String),

    /// Correlation store failure.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Janitor rejected a TTL task.
    #[error("Scheduling error: {0}")]
    Scheduling(#[from] JanitorError),

    /// A pending entry could not be decoded.
    #[error("Codec error in {namespace}: {message}")]
    Codec {
        /// Namespace of the entry
        namespace: String,
        /// Decoder message
        message: String,
    },
}

impl MatchingError {
    /// Build a codec error from a serde failure.
    pub fn codec(namespace: &str, err: serde_json::Error) -> Self {
        MatchingError::Codec {
            namespace: namespace.to_string(),
            message: err.to_string(),
        }
    }
}
