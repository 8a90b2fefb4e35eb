//! # TL-03 Matching Engine
//!
//! Reconciles independently observed cross-network message events into
//! journeys.
//!
//! **Component ID:** 3
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! Per-network watchers report dispatches, relays, bridge phases and
//! receipts in any order, possibly never. The engine pairs them by
//! correlation key and emits typed results:
//!
//! - at most one match per correlation key, whatever the arrival order
//! - every pending entry carries a TTL task, so unmatched state is bounded
//! - a failed delivery parks the dispatch in `retry` for a later success
//!
//! ## Pending State
//!
//! | Namespace | Holds | TTL |
//! |-----------|-------|-----|
//! | `match:outbound` | dispatch awaiting receipt | `timeout_ms` |
//! | `match:inbound` | receipt awaiting dispatch | `timeout_ms` |
//! | `match:relay:in` / `match:relay:out` | relay awaiting dispatch | `relay_timeout_ms` |
//! | `match:retry` | dispatch after a failed delivery | declared timeout + `retry_grace_ms` |
//! | `match:bridge:*` | bridge phases | `bridge_timeout_ms` |
//!
//! ## Per-Key State Machine
//!
//! ```text
//! absent ──→ pending(outbound | inbound | relay) ──→ matched  (Received / Timeout)
//!                        │                      └──→ unmatched (TTL swept)
//!                        └── relay entries never consume the outbound
//! ```
//!
//! Multi-leg journeys are matched leg by leg: a receipt on a network that is
//! not the final destination closes the leg with `Relayed{Hop}` and the
//! re-dispatch opens a new correlation.
//!
//! ## Module Structure
//!
//! ```text
//! tl-03-matching-engine/
//! ├── domain/     # Messages, keys, results, config, errors
//! ├── ports/      # MatchingApi (inbound), MatchReceiver (outbound)
//! └── service/    # MatchingEngine, dispatcher, sweep handling
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod ports;
pub mod service;

// Re-exports
pub use domain::{
    namespaces, BridgeEntry, BridgeMessage, BridgePhase, Correlation, CorrelationKey,
    DeliveryOutcome, InboundMessage, Leg, LegKind, MatchResult, MatchingConfig, MatchingError,
    NetworkId, OutboundMessage, PendingRole, RelayDirection, RelayMessage, RelayStage, ResultKind,
    Waypoint,
};
pub use ports::{ChannelReceiver, MatchReceiver, MatchingApi, ReceiverError};
pub use service::{EngineContext, MatchingEngine};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
