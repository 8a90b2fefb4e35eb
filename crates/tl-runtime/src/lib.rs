//! # Tracelink Runtime Library
//!
//! Exposes the runtime modules for testing. The entry point is the
//! `main.rs` binary.
//!
//! ## Startup Sequence
//!
//! 1. Initialise telemetry (`TL_LOG_LEVEL`, `TL_JSON_LOGS`)
//! 2. Load [`RuntimeConfig`] from the environment
//! 3. Open the correlation store (memory or RocksDB)
//! 4. Build janitor and engine, start the sweep loop and sweep handler
//! 5. Ingest stdin until EOF or Ctrl+C, then flush and shut down

#![warn(missing_docs)]

pub mod adapters;
pub mod config;
pub mod container;
pub mod ingest;
pub mod receiver;

pub use config::{RuntimeConfig, StoreBackend};
pub use container::TracelinkContainer;
pub use ingest::{IngestEvent, IngestStats};
pub use receiver::JsonLinesReceiver;
