//! # Domain Errors
//!
//! Error types for the correlation store.

use thiserror::Error;

/// Errors raised by a byte-level key-value backend.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum KVStoreError {
    /// I/O error during read/write.
    #[error("KV store I/O error: {message}")]
    IOError {
        /// Backend-specific description
        message: String,
    },

    /// Data corruption in the store.
    #[error("KV store corruption: {message}")]
    CorruptionError {
        /// Backend-specific description
        message: String,
    },
}

/// Errors surfaced by the correlation store to its callers.
///
/// None of these are retried internally; they propagate to whoever invoked
/// the store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backend failed.
    #[error(transparent)]
    Backend(#[from] KVStoreError),

    /// A value could not be JSON encoded or decoded.
    #[error("Codec error in namespace {namespace}: {message}")]
    Codec {
        /// Namespace of the offending entry
        namespace: String,
        /// Serde error text
        message: String,
    },

    /// Namespace name is empty or contains the separator.
    #[error("Invalid namespace: {0:?}")]
    InvalidNamespace(String),
}

impl StoreError {
    /// Build a codec error from a serde failure.
    pub fn codec(namespace: &str, err: serde_json::Error) -> Self {
        StoreError::Codec {
            namespace: namespace.to_string(),
            message: err.to_string(),
        }
    }
}
