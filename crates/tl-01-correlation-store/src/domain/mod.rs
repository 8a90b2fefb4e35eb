//! # Domain Module
//!
//! Errors and key encoding for the correlation store.

pub mod errors;
pub mod keys;

pub use errors::*;
pub use keys::*;
