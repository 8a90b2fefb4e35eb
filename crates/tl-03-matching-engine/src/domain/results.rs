//! # Match Results
//!
//! The closed set of results the engine emits.
//!
//! | Result | Terminal | Emitted when |
//! |--------|----------|--------------|
//! | `Sent` | no | first observation of an outbound |
//! | `Relayed` | no | relay, hop boundary or bridge phase observed |
//! | `Received` | yes | inbound matched (outcome may be `Failed`) |
//! | `Timeout` | yes | inbound matched with a protocol timeout |
//! | `Unmatched` | yes | outbound TTL elapsed with no counterpart |

use super::entities::{InboundMessage, OutboundMessage};
use super::keys::CorrelationKey;
use super::value_objects::{BridgePhase, RelayDirection, Waypoint};
use serde::{Deserialize, Serialize};
use shared_bus::BusEvent;

/// Intermediary stage carried by a `Relayed` result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "camelCase")]
pub enum RelayStage {
    /// Relay observed on an intermediary network.
    Relay {
        /// Arrival or departure.
        direction: RelayDirection,
        /// Relay event location.
        waypoint: Waypoint,
    },
    /// Intermediate network received the message for re-dispatch.
    Hop {
        /// Receipt at the hop.
        waypoint: Waypoint,
    },
    /// Bridge phase.
    #[serde(rename_all = "camelCase")]
    Bridge {
        /// Phase observed.
        phase: BridgePhase,
        /// Bridge hand-off key.
        bridge_key: CorrelationKey,
        /// Phase event location.
        waypoint: Waypoint,
    },
}

/// Result kind, used for topics and metric labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResultKind {
    /// `Sent`
    Sent,
    /// `Relayed`
    Relayed,
    /// `Received`
    Received,
    /// `Timeout`
    Timeout,
    /// `Unmatched`
    Unmatched,
}

impl ResultKind {
    /// Lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Sent => "sent",
            Self::Relayed => "relayed",
            Self::Received => "received",
            Self::Timeout => "timeout",
            Self::Unmatched => "unmatched",
        }
    }
}

/// A result emitted by the matching engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum MatchResult {
    /// Outbound observed for the first time.
    Sent {
        /// Correlation key.
        key: CorrelationKey,
        /// The dispatch.
        outbound: OutboundMessage,
    },
    /// Intermediary hand-off observed.
    Relayed {
        /// Correlation key (bridge key when no base key is known).
        key: CorrelationKey,
        /// Dispatch, when known.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin: Option<OutboundMessage>,
        /// What was observed.
        stage: RelayStage,
    },
    /// Inbound matched.
    Received {
        /// Correlation key.
        key: CorrelationKey,
        /// The dispatch.
        outbound: OutboundMessage,
        /// The receipt.
        inbound: InboundMessage,
    },
    /// Inbound matched, reporting a protocol timeout.
    Timeout {
        /// Correlation key.
        key: CorrelationKey,
        /// The dispatch.
        outbound: OutboundMessage,
        /// The receipt.
        inbound: InboundMessage,
    },
    /// No counterpart observed before the TTL elapsed.
    Unmatched {
        /// Correlation key.
        key: CorrelationKey,
        /// The dispatch.
        outbound: OutboundMessage,
    },
}

impl MatchResult {
    /// Correlation key.
    pub fn key(&self) -> &CorrelationKey {
        match self {
            Self::Sent { key, .. }
            | Self::Relayed { key, .. }
            | Self::Received { key, .. }
            | Self::Timeout { key, .. }
            | Self::Unmatched { key, .. } => key,
        }
    }

    /// Variant kind.
    pub fn kind(&self) -> ResultKind {
        match self {
            Self::Sent { .. } => ResultKind::Sent,
            Self::Relayed { .. } => ResultKind::Relayed,
            Self::Received { .. } => ResultKind::Received,
            Self::Timeout { .. } => ResultKind::Timeout,
            Self::Unmatched { .. } => ResultKind::Unmatched,
        }
    }

    /// Whether the result ends its correlation.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.kind(),
            ResultKind::Received | ResultKind::Timeout | ResultKind::Unmatched
        )
    }

    /// Origin dispatch, when known.
    pub fn origin(&self) -> Option<&OutboundMessage> {
        match self {
            Self::Sent { outbound, .. }
            | Self::Received { outbound, .. }
            | Self::Timeout { outbound, .. }
            | Self::Unmatched { outbound, .. } => Some(outbound),
            Self::Relayed { origin, .. } => origin.as_ref(),
        }
    }
}

impl BusEvent for MatchResult {
    fn topic(&self) -> &'static str {
        self.kind().as_str()
    }
}
