//! # Adapters Layer (Hexagonal Architecture)
//!
//! Implements the outbound `KeyValueStore` port.

mod memory;

pub use memory::InMemoryKVStore;
