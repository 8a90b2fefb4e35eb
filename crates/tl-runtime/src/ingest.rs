//! # Event Ingestion
//!
//! Decoded message events arrive as JSON lines, one event per line, tagged
//! with their role:
//!
//! ```text
//! {"kind":"outbound","commitment":"0xc1","origin":{"chainId":"A","blockNumber":10},"destination":"B"}
//! {"kind":"inbound","commitment":"0xc1","destination":{"chainId":"B","blockNumber":7},"outcome":"received"}
//! ```
//!
//! Malformed lines and rejected events are logged and skipped. Ingestion
//! only stops at end of input or on a read error.

use serde::{Deserialize, Serialize};
use tl_03_matching_engine::{
    BridgeMessage, InboundMessage, MatchingApi, MatchingError, OutboundMessage, RelayMessage,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, warn};

/// One decoded event, tagged with the role it was observed in.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum IngestEvent {
    /// Dispatch on the sending network.
    Outbound(OutboundMessage),
    /// Receipt on the receiving network.
    Inbound(InboundMessage),
    /// Hand-off on an intermediary network.
    Relay(RelayMessage),
    /// Bridge accepted the message.
    BridgeAccepted(BridgeMessage),
    /// Bridge delivered the message.
    BridgeDelivered(BridgeMessage),
    /// Bridged message seen on the other side.
    BridgeInbound(BridgeMessage),
}

impl IngestEvent {
    /// Wire tag of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Outbound(_) => "outbound",
            Self::Inbound(_) => "inbound",
            Self::Relay(_) => "relay",
            Self::BridgeAccepted(_) => "bridge-accepted",
            Self::BridgeDelivered(_) => "bridge-delivered",
            Self::BridgeInbound(_) => "bridge-inbound",
        }
    }
}

/// Counters of one ingestion run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Non-blank lines read.
    pub lines: u64,
    /// Events accepted by the engine.
    pub dispatched: u64,
    /// Lines that did not decode.
    pub malformed: u64,
    /// Events the engine rejected.
    pub failed: u64,
}

/// Decode one line. `Ok(None)` for blank lines.
pub fn parse_line(line: &str) -> Result<Option<IngestEvent>, serde_json::Error> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    serde_json::from_str(line).map(Some)
}

/// Route one event to the matching operation for its role.
pub async fn dispatch(api: &dyn MatchingApi, event: IngestEvent) -> Result<(), MatchingError> {
    match event {
        IngestEvent::Outbound(msg) => api.on_outbound(msg).await,
        IngestEvent::Inbound(msg) => api.on_inbound(msg).await,
        IngestEvent::Relay(msg) => api.on_relay(msg).await,
        IngestEvent::BridgeAccepted(msg) => api.on_bridge_accepted(msg).await,
        IngestEvent::BridgeDelivered(msg) => api.on_bridge_delivered(msg).await,
        IngestEvent::BridgeInbound(msg) => api.on_bridge_inbound(msg).await,
    }
}

/// Feed every line of `input` to `api` until end of input.
pub async fn run_ingest<R>(input: R, api: &dyn MatchingApi) -> std::io::Result<IngestStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = IngestStats::default();
    let mut lines = input.lines();
    let mut line_no = 0u64;

    while let Some(line) = lines.next_line().await? {
        line_no += 1;
        let event = match parse_line(&line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                stats.lines += 1;
                stats.malformed += 1;
                warn!(line = line_no, error = %e, "Skipping malformed event");
                continue;
            }
        };
        stats.lines += 1;

        let kind = event.kind();
        match dispatch(api, event).await {
            Ok(()) => {
                stats.dispatched += 1;
                debug!(line = line_no, kind, "Event dispatched");
            }
            Err(e) => {
                stats.failed += 1;
                warn!(line = line_no, kind, error = %e, "Event rejected");
            }
        }
    }

    info!(
        lines = stats.lines,
        dispatched = stats.dispatched,
        malformed = stats.malformed,
        failed = stats.failed,
        "Input exhausted"
    );
    Ok(stats)
}
