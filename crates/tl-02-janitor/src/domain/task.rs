//! # TTL Tasks
//!
//! A task names a pending entry and how long it may live. Once persisted it
//! becomes a [`StoredTask`] with an absolute due time.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_bus::BusEvent;
use tl_01_correlation_store::StoreOp;

/// Namespace holding persisted tasks.
pub const TASKS_NAMESPACE: &str = "janitor:tasks";

/// Expiry request for one pending entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TtlTask {
    /// Namespace of the guarded entry.
    pub namespace: String,
    /// Key of the guarded entry.
    pub key: String,
    /// Time to live, in milliseconds from scheduling.
    pub expiry_ms: u64,
}

impl TtlTask {
    /// Build a task.
    pub fn new(namespace: impl Into<String>, key: impl Into<String>, expiry_ms: u64) -> Self {
        Self {
            namespace: namespace.into(),
            key: key.into(),
            expiry_ms,
        }
    }
}

/// A task as persisted, with its absolute due time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredTask {
    /// The scheduled task.
    pub task: TtlTask,
    /// Unix milliseconds at which the task falls due.
    pub due_at_ms: u64,
}

impl StoredTask {
    /// Record key. Zero-padding makes lexical order equal due order.
    pub fn record_key(&self) -> String {
        format!(
            "{:020}:{}:{}",
            self.due_at_ms, self.task.namespace, self.task.key
        )
    }

    /// Whether the task is due at `now_ms`.
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.due_at_ms <= now_ms
    }
}

/// Emitted when a task falls due while its key is still present.
///
/// The task record stays in the store until a subscriber commits
/// [`SweepEvent::ack_op`]. Unacknowledged events are published again.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepEvent {
    /// The expired task.
    pub task: TtlTask,
    /// Value stored under the key at sweep time.
    pub value: Value,
    /// Key of the task record in [`TASKS_NAMESPACE`].
    pub record_key: String,
}

impl SweepEvent {
    /// Batch op removing the task record. Applying it twice is harmless.
    pub fn ack_op(&self) -> StoreOp {
        StoreOp::delete(TASKS_NAMESPACE, self.record_key.clone())
    }
}

impl BusEvent for SweepEvent {
    fn topic(&self) -> &'static str {
        "sweep"
    }
}
