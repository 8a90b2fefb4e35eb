//! Janitor errors.

use thiserror::Error;
use tl_01_correlation_store::StoreError;

/// Errors surfaced by scheduling and sweeping.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JanitorError {
    /// Task persistence failed.
    #[error("Task store error: {0}")]
    Store(#[from] StoreError),

    /// A persisted task could not be decoded.
    #[error("Corrupt task {key}: {message}")]
    CorruptTask {
        /// Task record key
        key: String,
        /// Decoder message
        message: String,
    },
}
