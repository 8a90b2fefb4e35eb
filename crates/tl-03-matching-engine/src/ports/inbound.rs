//! # Inbound Ports
//!
//! API trait defining what the matching engine can do. One operation per
//! message role observed on the wire.

use crate::domain::{BridgeMessage, InboundMessage, MatchingError, OutboundMessage, RelayMessage};
use async_trait::async_trait;

/// Matching engine API - inbound port.
///
/// Every call is linearised with every other call. Errors leave the store
/// as it was before the call, so the caller may redeliver the event.
#[async_trait]
pub trait MatchingApi: Send + Sync {
    /// Dispatch observed on the sending network.
    async fn on_outbound(&self, msg: OutboundMessage) -> Result<(), MatchingError>;

    /// Receipt observed on the receiving network.
    async fn on_inbound(&self, msg: InboundMessage) -> Result<(), MatchingError>;

    /// Hand-off observed on an intermediary network.
    async fn on_relay(&self, msg: RelayMessage) -> Result<(), MatchingError>;

    /// Bridge accepted the message.
    async fn on_bridge_accepted(&self, msg: BridgeMessage) -> Result<(), MatchingError>;

    /// Bridge delivered the message.
    async fn on_bridge_delivered(&self, msg: BridgeMessage) -> Result<(), MatchingError>;

    /// Bridged message observed on the other side.
    async fn on_bridge_inbound(&self, msg: BridgeMessage) -> Result<(), MatchingError>;

    /// Wait until every result emitted so far reached the receiver.
    async fn flush(&self);
}
