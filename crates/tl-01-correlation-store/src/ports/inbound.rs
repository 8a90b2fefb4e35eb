//! # Inbound Ports
//!
//! API the matching engine and the janitor consume.

use crate::domain::StoreError;
use async_trait::async_trait;
use serde_json::Value;

/// Namespaced, asynchronous correlation store.
///
/// Values are JSON documents. All operations may fail with an I/O error,
/// which callers are expected to propagate.
#[async_trait]
pub trait CorrelationStore: Send + Sync {
    /// Read an entry.
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError>;

    /// Write an entry, replacing any previous value.
    async fn put(&self, namespace: &str, key: &str, value: Value) -> Result<(), StoreError>;

    /// Remove an entry. Removing an absent entry is not an error.
    async fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError>;

    /// Apply several writes atomically.
    async fn batch(&self, ops: Vec<StoreOp>) -> Result<(), StoreError>;

    /// Entries of a namespace in key order, at most `limit` of them.
    async fn entries(
        &self,
        namespace: &str,
        limit: Option<usize>,
    ) -> Result<Vec<(String, Value)>, StoreError>;

    /// Keys of a namespace in order. Values are not read.
    async fn keys(&self, namespace: &str) -> Result<Vec<String>, StoreError>;
}

/// A namespaced write inside a batch.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreOp {
    /// Put a JSON value.
    Put {
        /// Target namespace
        namespace: String,
        /// Key within the namespace
        key: String,
        /// JSON value
        value: Value,
    },
    /// Delete a key.
    Delete {
        /// Target namespace
        namespace: String,
        /// Key within the namespace
        key: String,
    },
}

impl StoreOp {
    /// Create a Put operation.
    pub fn put(namespace: impl Into<String>, key: impl Into<String>, value: Value) -> Self {
        StoreOp::Put {
            namespace: namespace.into(),
            key: key.into(),
            value,
        }
    }

    /// Create a Delete operation.
    pub fn delete(namespace: impl Into<String>, key: impl Into<String>) -> Self {
        StoreOp::Delete {
            namespace: namespace.into(),
            key: key.into(),
        }
    }

    /// Namespace this operation touches.
    pub fn namespace(&self) -> &str {
        match self {
            StoreOp::Put { namespace, .. } | StoreOp::Delete { namespace, .. } => namespace,
        }
    }
}
