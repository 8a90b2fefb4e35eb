//! # Outbound Ports (Driven Ports)
//!
//! The byte-level backend the correlation store is built on.

use crate::domain::KVStoreError;

/// Result of a prefix scan: `(raw_key, raw_value)` pairs in key order.
pub type ScanResult = Vec<(Vec<u8>, Vec<u8>)>;

/// Abstract interface for key-value database operations.
///
/// Production: `RocksDbStore` (tl-runtime/adapters/storage/rocksdb_adapter.rs)
/// Testing: `InMemoryKVStore`
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a single key-value pair.
    fn put(&mut self, key: &[u8], value: &[u8]) -> Result<(), KVStoreError>;

    /// Delete a key. Deleting an absent key is not an error.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Execute an atomic batch write.
    ///
    /// Either ALL operations in the batch succeed, or NONE are applied.
    fn atomic_batch_write(&mut self, operations: Vec<BatchOperation>) -> Result<(), KVStoreError>;

    /// Iterate over keys with a prefix, in ascending key order. Stops after
    /// `limit` hits when one is given.
    fn prefix_scan(&self, prefix: &[u8], limit: Option<usize>) -> Result<ScanResult, KVStoreError>;

    /// Keys with a prefix, in ascending order, without their values.
    fn prefix_keys(&self, prefix: &[u8]) -> Result<Vec<Vec<u8>>, KVStoreError>;
}

/// Batch operation for atomic writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOperation {
    /// Put a key-value pair.
    Put {
        /// Raw key
        key: Vec<u8>,
        /// Raw value
        value: Vec<u8>,
    },
    /// Delete a key.
    Delete {
        /// Raw key
        key: Vec<u8>,
    },
}

impl BatchOperation {
    /// Create a Put operation.
    pub fn put(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Put {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create a Delete operation.
    pub fn delete(key: impl Into<Vec<u8>>) -> Self {
        BatchOperation::Delete { key: key.into() }
    }
}
