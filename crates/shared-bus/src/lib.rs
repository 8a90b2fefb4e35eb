//! # Shared Bus - Typed Event Bus
//!
//! In-process broadcast bus used between the Tracelink components.
//!
//! ## Usage in the workspace
//!
//! | Publisher | Event | Subscribers |
//! |-----------|-------|-------------|
//! | Janitor (tl-02) | `SweepEvent` | Matching engine sweep loop |
//! | Matching engine (tl-03) | `MatchResult` | Telemetry observers, runtime |
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  Publisher   │    publish()       │  Subscriber  │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Subscribers never get write access back into the publisher; the bus only
//! carries clones of published events.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod events;
pub mod publisher;
pub mod subscriber;

// Re-export main types
pub use events::{BusEvent, EventFilter};
pub use publisher::InMemoryEventBus;
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
