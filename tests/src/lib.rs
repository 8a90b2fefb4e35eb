//! # Tracelink Test Suite
//!
//! Cross-crate flows: the correlation store, janitor, matching engine and
//! runtime wired together the way the binary wires them.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! └── integration/
//!     ├── mod.rs          # Shared fixtures
//!     ├── journeys.rs     # Matching properties end to end
//!     ├── expiry.rs       # Janitor-driven expiry and restarts
//!     ├── commutativity.rs# Arbitrary delivery orders
//!     └── ingest.rs       # JSON lines in, JSON lines out
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p tl-tests
//! cargo test -p tl-tests integration::expiry::
//! cargo bench -p tl-tests
//! ```

pub mod integration;
