//! # Domain Value Objects
//!
//! Small immutable types shared by every message role.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a network (chain, parachain, rollup...).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(String);

impl NetworkId {
    /// Wrap a network identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NetworkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NetworkId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for NetworkId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Where and when an event was observed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Waypoint {
    /// Network the event was observed on.
    pub chain_id: NetworkId,
    /// Block containing the event.
    pub block_number: u64,
    /// Block hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block_hash: Option<String>,
    /// Transaction hash.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    /// Index of the event within the block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_index: Option<u32>,
    /// Block timestamp, Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl Waypoint {
    /// Waypoint with only the mandatory fields.
    pub fn new(chain_id: impl Into<NetworkId>, block_number: u64) -> Self {
        Self {
            chain_id: chain_id.into(),
            block_number,
            block_hash: None,
            tx_hash: None,
            event_index: None,
            timestamp: None,
        }
    }
}

/// Outcome reported by the receiving side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeliveryOutcome {
    /// Message executed successfully.
    #[default]
    #[serde(alias = "received", alias = "success")]
    Received,
    /// Message arrived but execution failed. Relayers may retry.
    #[serde(alias = "failed", alias = "fail")]
    Failed,
    /// Protocol-level timeout.
    #[serde(alias = "timeout")]
    Timeout,
}

impl DeliveryOutcome {
    /// Whether a later retry may still succeed.
    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Failed)
    }
}

/// Transport used by a leg.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegKind {
    /// Direct network-to-network transport.
    #[serde(alias = "hrmp", alias = "vmp", alias = "ump", alias = "dmp")]
    Direct,
    /// Intermediate network that receives and re-dispatches.
    Hop,
    /// External bridge protocol.
    Bridge,
}

/// One planned segment of a route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leg {
    /// Sending network.
    pub from: NetworkId,
    /// Receiving network.
    pub to: NetworkId,
    /// Transport.
    #[serde(rename = "type", alias = "kind")]
    pub kind: LegKind,
}

impl Leg {
    /// Build a leg.
    pub fn new(from: impl Into<NetworkId>, to: impl Into<NetworkId>, kind: LegKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }
}

/// Direction of an intermediary relay observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayDirection {
    /// Message arriving at the relay network.
    In,
    /// Message leaving the relay network.
    Out,
}

/// Stage of a bridge hand-off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BridgePhase {
    /// Bridge accepted the outbound message.
    Accepted,
    /// Bridge delivered it to the other side.
    Delivered,
    /// Other side observed the inbound message.
    Received,
}

impl BridgePhase {
    /// Lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Delivered => "delivered",
            Self::Received => "received",
        }
    }
}
