//! # Inbound Ports
//!
//! What the matching engine sees of the janitor.

use crate::domain::{JanitorError, SweepEvent, TtlTask};
use async_trait::async_trait;
use shared_bus::Subscription;

/// Expiry scheduler.
#[async_trait]
pub trait Scheduler: Send + Sync {
    /// Persist a task. Fails if the task store fails.
    async fn schedule(&self, task: TtlTask) -> Result<(), JanitorError>;

    /// Subscribe to sweep notifications.
    fn subscribe(&self) -> Subscription<SweepEvent>;
}
