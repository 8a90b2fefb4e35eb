//! # Correlation Keys
//!
//! A correlation key must come out identical when computed independently at
//! the origin and at the destination of the same logical message.
//!
//! | Source | Key |
//! |--------|-----|
//! | Content commitment | `0x` + lowercase hex |
//! | Raw payload | `0x` + Keccak-256 of the bytes |
//! | Subscription + message id | `{subscription}:{id}:{network}` |
//! | Bridge channel | `{channel}:{nonce}` |

use super::errors::MatchingError;
use super::value_objects::NetworkId;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

/// Correlation key shared by both sides of a message.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorrelationKey(String);

impl CorrelationKey {
    /// Key from a content commitment.
    ///
    /// Trims, lowercases and adds the `0x` prefix if missing.
    pub fn from_commitment(commitment: &str) -> Result<Self, MatchingError> {
        let trimmed = commitment.trim().to_ascii_lowercase();
        let body = trimmed.strip_prefix("0x").unwrap_or(&trimmed);
        if body.is_empty() {
            return Err(MatchingError::InvalidKey("empty commitment".into()));
        }
        Ok(Self(format!("0x{body}")))
    }

    /// Key from the Keccak-256 of a raw payload.
    pub fn commitment_of(payload: &[u8]) -> Self {
        Self(format!("0x{}", hex::encode(Keccak256::digest(payload))))
    }

    /// Composite key for protocols without commitments.
    pub fn composite(
        subscription_id: &str,
        message_id: &str,
        network: &NetworkId,
    ) -> Result<Self, MatchingError> {
        if subscription_id.is_empty() || message_id.is_empty() || network.as_str().is_empty() {
            return Err(MatchingError::InvalidKey(format!(
                "incomplete composite key {subscription_id:?}:{message_id:?}:{network}"
            )));
        }
        Ok(Self(format!("{subscription_id}:{message_id}:{network}")))
    }

    /// Key of a bridge hand-off.
    pub fn bridge(channel_id: &str, nonce: u64) -> Result<Self, MatchingError> {
        if channel_id.is_empty() {
            return Err(MatchingError::InvalidKey("empty bridge channel".into()));
        }
        Ok(Self(format!("{channel_id}:{nonce}")))
    }

    /// Rebuild a key read back from the store.
    pub(crate) fn from_stored(raw: String) -> Self {
        Self(raw)
    }

    /// Key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Namespaces of pending entries.
pub mod namespaces {
    /// Outbound waiting for its inbound.
    pub const OUTBOUND: &str = "match:outbound";
    /// Inbound waiting for its outbound.
    pub const INBOUND: &str = "match:inbound";
    /// Relay arrival waiting for its outbound.
    pub const RELAY_IN: &str = "match:relay:in";
    /// Relay departure waiting for its outbound.
    pub const RELAY_OUT: &str = "match:relay:out";
    /// Outbound whose first delivery failed.
    pub const RETRY: &str = "match:retry";
    /// Bridge accepted phase.
    pub const BRIDGE_ACCEPTED: &str = "match:bridge:accepted";
    /// Bridge delivered phase seen before acceptance.
    pub const BRIDGE_DELIVERED: &str = "match:bridge:delivered";
    /// Bridge inbound phase seen before acceptance.
    pub const BRIDGE_INBOUND: &str = "match:bridge:in";
}

/// Role of a pending entry, one per namespace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PendingRole {
    /// `match:outbound`
    Outbound,
    /// `match:inbound`
    Inbound,
    /// `match:relay:in`
    RelayIn,
    /// `match:relay:out`
    RelayOut,
    /// `match:retry`
    Retry,
    /// `match:bridge:accepted`
    BridgeAccepted,
    /// `match:bridge:delivered`
    BridgeDelivered,
    /// `match:bridge:in`
    BridgeInbound,
}

impl PendingRole {
    /// Every role.
    pub const ALL: [PendingRole; 8] = [
        PendingRole::Outbound,
        PendingRole::Inbound,
        PendingRole::RelayIn,
        PendingRole::RelayOut,
        PendingRole::Retry,
        PendingRole::BridgeAccepted,
        PendingRole::BridgeDelivered,
        PendingRole::BridgeInbound,
    ];

    /// Namespace holding this role.
    pub fn namespace(&self) -> &'static str {
        match self {
            Self::Outbound => namespaces::OUTBOUND,
            Self::Inbound => namespaces::INBOUND,
            Self::RelayIn => namespaces::RELAY_IN,
            Self::RelayOut => namespaces::RELAY_OUT,
            Self::Retry => namespaces::RETRY,
            Self::BridgeAccepted => namespaces::BRIDGE_ACCEPTED,
            Self::BridgeDelivered => namespaces::BRIDGE_DELIVERED,
            Self::BridgeInbound => namespaces::BRIDGE_INBOUND,
        }
    }

    /// Role stored in `namespace`, if any.
    pub fn from_namespace(namespace: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.namespace() == namespace)
    }

    /// Metric label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Outbound => "outbound",
            Self::Inbound => "inbound",
            Self::RelayIn => "relay_in",
            Self::RelayOut => "relay_out",
            Self::Retry => "retry",
            Self::BridgeAccepted => "bridge_accepted",
            Self::BridgeDelivered => "bridge_delivered",
            Self::BridgeInbound => "bridge_inbound",
        }
    }
}
