//! # Adapters
//!
//! Port implementations that only the runtime needs.

pub mod storage;

pub use storage::open_store;
