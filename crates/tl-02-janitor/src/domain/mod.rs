//! # Domain Module
//!
//! Tasks, sweep events, configuration and errors.

pub mod config;
pub mod errors;
pub mod task;

pub use config::*;
pub use errors::*;
pub use task::*;
