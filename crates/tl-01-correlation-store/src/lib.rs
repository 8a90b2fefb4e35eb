//! # TL-01 Correlation Store
//!
//! Namespaced, asynchronous key-value store holding pending correlation
//! entries.
//!
//! **Component ID:** 1
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Purpose
//!
//! Leaf dependency of the matching engine. It knows nothing about matching;
//! it only offers `get`, `put`, `delete` and atomic `batch` per namespace
//! ("sublevel"), with JSON-encoded values.
//!
//! ## Key Layout
//!
//! Every namespace is a prefix of the underlying byte keyspace:
//!
//! ```text
//! !match:outbound!0xc1        -> {"commitment":"0xc1", ...}
//! !match:inbound!sub:id:net   -> {...}
//! !janitor:tasks!00000...:... -> {...}
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! tl-01-correlation-store/
//! ├── domain/     # Errors, key encoding
//! ├── ports/      # CorrelationStore (inbound), KeyValueStore (outbound)
//! ├── adapters/   # In-memory KeyValueStore
//! └── service     # LevelStore, Sublevel
//! ```
//!
//! The production RocksDB `KeyValueStore` lives in `tl-runtime` behind the
//! `rocksdb` feature.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::InMemoryKVStore;
pub use domain::{decode_key, encode_key, namespace_prefix, KVStoreError, StoreError};
pub use ports::{BatchOperation, CorrelationStore, KeyValueStore, ScanResult, StoreOp};
pub use service::{LevelStore, Sublevel};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
