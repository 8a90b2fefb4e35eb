//! # TL-02 Janitor
//!
//! Expiry scheduler for pending correlation entries.
//!
//! **Component ID:** 2
//! **Architecture:** Hexagonal (Ports/Adapters)
//!
//! ## Contract
//!
//! - `schedule(task)` persists `{namespace, key, expiryMs}` next to the data
//!   it guards, so a restarted process resumes pending expiries.
//! - When a task falls due and its key is still present, a [`SweepEvent`]
//!   carrying the stored value is broadcast. The subscriber acknowledges it
//!   by committing [`SweepEvent::ack_op`] with its own writes.
//! - The janitor never deletes matching state. Whoever subscribes decides
//!   what an expiry means.
//!
//! ```text
//! schedule(task) ──→ janitor:tasks/{due}:{ns}:{key}
//!                              │
//!               tick / sweep_due()
//!                              │
//!            key still present in {ns}? ──no──→ drop task
//!                              │ yes
//!                              ↓
//!                    SweepEvent{task, value} ──→ subscribers ──ack──→ delete record
//! ```
//!
//! A task record is only removed by the subscriber's ack. An event lost to a
//! lagging subscriber is published again once `redelivery_ms` has passed;
//! with nobody listening the task stays due and is retried next tick.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{JanitorConfig, JanitorError, StoredTask, SweepEvent, TtlTask, TASKS_NAMESPACE};
pub use ports::{ManualTimeSource, Scheduler, SystemTimeSource, TimeSource};
pub use service::Janitor;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
