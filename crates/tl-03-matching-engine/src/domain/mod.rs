//! # Domain Module
//!
//! Pure types of the matching engine: messages, correlation keys, results.

pub mod config;
pub mod entities;
pub mod errors;
pub mod keys;
pub mod results;
pub mod value_objects;

pub use config::*;
pub use entities::*;
pub use errors::*;
pub use keys::*;
pub use results::*;
pub use value_objects::*;
