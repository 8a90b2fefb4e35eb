//! # Domain Entities
//!
//! Decoded message events, one type per role observed on the wire. Each
//! knows how to derive its correlation key.

use super::errors::MatchingError;
use super::keys::CorrelationKey;
use super::value_objects::{DeliveryOutcome, Leg, NetworkId, RelayDirection, Waypoint};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Identifiers from which a correlation key is derived.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Correlation {
    /// Subscription that observed the message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    /// Content commitment (message topic / hash) shared by both sides.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commitment: Option<String>,
    /// Protocol message id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Protocol message hash, used when there is no id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_hash: Option<String>,
}

impl Correlation {
    /// Correlation by commitment only.
    pub fn commitment(commitment: impl Into<String>) -> Self {
        Self {
            commitment: Some(commitment.into()),
            ..Default::default()
        }
    }

    /// Correlation by subscription and message id.
    pub fn message(subscription_id: impl Into<String>, message_id: impl Into<String>) -> Self {
        Self {
            subscription_id: Some(subscription_id.into()),
            message_id: Some(message_id.into()),
            ..Default::default()
        }
    }

    /// Whether any identifier is present.
    pub fn is_empty(&self) -> bool {
        self.commitment.is_none() && self.message_id.is_none() && self.message_hash.is_none()
    }

    /// Derive the key, using `network` for composite keys.
    ///
    /// The commitment wins when present.
    pub fn key_for(&self, network: &NetworkId) -> Result<CorrelationKey, MatchingError> {
        if let Some(commitment) = &self.commitment {
            return CorrelationKey::from_commitment(commitment);
        }
        let id = self.message_id.as_deref().or(self.message_hash.as_deref());
        match (self.subscription_id.as_deref(), id) {
            (Some(subscription), Some(id)) => CorrelationKey::composite(subscription, id, network),
            _ => Err(MatchingError::InvalidKey(
                "neither a commitment nor a subscription and message id".into(),
            )),
        }
    }
}

/// Dispatch observed on the sending network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    /// Correlation identifiers.
    #[serde(flatten)]
    pub correlation: Correlation,
    /// Dispatch event location.
    pub origin: Waypoint,
    /// Final destination of the journey.
    pub destination: NetworkId,
    /// Planned route, first leg first.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub legs: Vec<Leg>,
    /// Protocol deadline, Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_at: Option<u64>,
    /// Key of the journey this leg continues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_id: Option<String>,
    /// Opaque decoded payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
}

impl OutboundMessage {
    /// Outbound with only the mandatory fields.
    pub fn new(
        correlation: Correlation,
        origin: Waypoint,
        destination: impl Into<NetworkId>,
    ) -> Self {
        Self {
            correlation,
            origin,
            destination: destination.into(),
            legs: Vec::new(),
            timeout_at: None,
            forward_id: None,
            payload: None,
        }
    }

    /// Set the planned route.
    pub fn with_legs(mut self, legs: Vec<Leg>) -> Self {
        self.legs = legs;
        self
    }

    /// Set the protocol deadline.
    pub fn with_timeout_at(mut self, timeout_at: u64) -> Self {
        self.timeout_at = Some(timeout_at);
        self
    }

    /// Mark as the continuation of another journey.
    pub fn with_forward_id(mut self, forward_id: impl Into<String>) -> Self {
        self.forward_id = Some(forward_id.into());
        self
    }

    /// Network the message is handed to next.
    pub fn next_network(&self) -> &NetworkId {
        self.legs.first().map(|leg| &leg.to).unwrap_or(&self.destination)
    }

    /// Correlation key, composite keys bound to the next network.
    pub fn correlation_key(&self) -> Result<CorrelationKey, MatchingError> {
        self.correlation.key_for(self.next_network())
    }
}

/// Receipt observed on the receiving network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboundMessage {
    /// Correlation identifiers.
    #[serde(flatten)]
    pub correlation: Correlation,
    /// Receipt event location.
    pub destination: Waypoint,
    /// Execution outcome.
    #[serde(default)]
    pub outcome: DeliveryOutcome,
    /// Error reported by the receiving side.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Key of the journey this leg continues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forward_id: Option<String>,
}

impl InboundMessage {
    /// Inbound with only the mandatory fields.
    pub fn new(correlation: Correlation, destination: Waypoint, outcome: DeliveryOutcome) -> Self {
        Self {
            correlation,
            destination,
            outcome,
            error: None,
            forward_id: None,
        }
    }

    /// Network the message arrived on.
    pub fn network(&self) -> &NetworkId {
        &self.destination.chain_id
    }

    /// Correlation key, composite keys bound to the receiving network.
    pub fn correlation_key(&self) -> Result<CorrelationKey, MatchingError> {
        self.correlation.key_for(self.network())
    }
}

/// Hand-off observed on an intermediary network.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelayMessage {
    /// Correlation identifiers.
    #[serde(flatten)]
    pub correlation: Correlation,
    /// Network the relayed message is headed to.
    pub destination: NetworkId,
    /// Relay event location.
    pub relay: Waypoint,
    /// Arrival or departure.
    pub direction: RelayDirection,
}

impl RelayMessage {
    /// Build a relay observation.
    pub fn new(
        correlation: Correlation,
        destination: impl Into<NetworkId>,
        relay: Waypoint,
        direction: RelayDirection,
    ) -> Self {
        Self {
            correlation,
            destination: destination.into(),
            relay,
            direction,
        }
    }

    /// Correlation key, composite keys bound to the declared destination.
    pub fn correlation_key(&self) -> Result<CorrelationKey, MatchingError> {
        self.correlation.key_for(&self.destination)
    }
}

/// One phase of a bridge hand-off.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeMessage {
    /// Identifiers of the bridged message, if the decoder knows them.
    #[serde(flatten)]
    pub correlation: Correlation,
    /// Bridge channel (lane) id.
    pub channel_id: String,
    /// Message nonce within the channel.
    pub nonce: u64,
    /// Event location.
    pub waypoint: Waypoint,
    /// Network the bridged message is headed to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination: Option<NetworkId>,
}

impl BridgeMessage {
    /// Build a bridge phase observation.
    pub fn new(channel_id: impl Into<String>, nonce: u64, waypoint: Waypoint) -> Self {
        Self {
            correlation: Correlation::default(),
            channel_id: channel_id.into(),
            nonce,
            waypoint,
            destination: None,
        }
    }

    /// Attach the base correlation.
    pub fn with_correlation(mut self, correlation: Correlation) -> Self {
        self.correlation = correlation;
        self
    }

    /// Key of the bridge hand-off.
    pub fn bridge_key(&self) -> Result<CorrelationKey, MatchingError> {
        CorrelationKey::bridge(&self.channel_id, self.nonce)
    }

    /// Key of the base correlation this hand-off belongs to, if known.
    pub fn base_key(&self) -> Result<Option<CorrelationKey>, MatchingError> {
        if self.correlation.is_empty() {
            return Ok(None);
        }
        let network = self
            .destination
            .clone()
            .unwrap_or_else(|| self.waypoint.chain_id.clone());
        self.correlation.key_for(&network).map(Some)
    }
}

/// Pending accepted phase of a bridge hand-off.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BridgeEntry {
    /// Base correlation key, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_key: Option<CorrelationKey>,
    /// Outbound that started the journey, if it was pending at acceptance.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin: Option<OutboundMessage>,
    /// The accepted phase itself.
    pub accepted: BridgeMessage,
    /// Whether the delivered phase was already reported.
    #[serde(default)]
    pub delivered: bool,
}
