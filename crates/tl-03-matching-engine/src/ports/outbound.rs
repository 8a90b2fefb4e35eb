//! # Outbound Ports (Driven Ports)
//!
//! The engine also depends on `CorrelationStore` (tl-01), `Scheduler` and
//! `TimeSource` (tl-02).

use crate::domain::MatchResult;
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

pub use tl_02_janitor::{ManualTimeSource, Scheduler, SystemTimeSource, TimeSource};

/// Receiver failure. Logged and counted, never propagated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReceiverError {
    /// Downstream consumer is gone.
    #[error("Receiver closed")]
    Closed,

    /// Downstream consumer rejected the result.
    #[error("Receiver failed: {0}")]
    Failed(String),
}

/// Caller-supplied sink for every emitted result.
#[async_trait]
pub trait MatchReceiver: Send + Sync {
    /// Handle one result. Results arrive in emission order.
    async fn receive(&self, result: MatchResult) -> Result<(), ReceiverError>;
}

/// Receiver forwarding results into an unbounded channel.
pub struct ChannelReceiver {
    sender: mpsc::UnboundedSender<MatchResult>,
}

impl ChannelReceiver {
    /// Create the receiver and the consuming end of its channel.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<MatchResult>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

#[async_trait]
impl MatchReceiver for ChannelReceiver {
    async fn receive(&self, result: MatchResult) -> Result<(), ReceiverError> {
        self.sender.send(result).map_err(|_| ReceiverError::Closed)
    }
}
