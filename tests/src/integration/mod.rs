//! # Integration Flows
//!
//! Every flow runs against a [`TracelinkContainer`] built from the same
//! parts the binary uses, with a hand-driven clock so expiry is
//! deterministic.

#[cfg(test)]
mod commutativity;
#[cfg(test)]
mod expiry;
#[cfg(test)]
mod ingest;
#[cfg(test)]
mod journeys;

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;
    use std::time::Duration;

    use tl_01_correlation_store::{CorrelationStore, LevelStore};
    use tl_02_janitor::{JanitorConfig, ManualTimeSource, Scheduler};
    use tl_03_matching_engine::{
        ChannelReceiver, Correlation, DeliveryOutcome, InboundMessage, MatchResult,
        MatchingConfig, MatchingEngine, OutboundMessage, PendingRole, Waypoint,
    };
    use tl_runtime::{RuntimeConfig, TracelinkContainer};
    use tokio::sync::mpsc::UnboundedReceiver;

    pub const START_MS: u64 = 1_700_000_000_000;

    /// Short TTLs so expiry tests only move the clock a little.
    pub fn test_config() -> RuntimeConfig {
        RuntimeConfig {
            matching: MatchingConfig {
                timeout_ms: 1_000,
                relay_timeout_ms: 500,
                bridge_timeout_ms: 2_000,
                retry_grace_ms: 300,
            },
            janitor: JanitorConfig::for_testing(),
            ..RuntimeConfig::default()
        }
    }

    /// One wired process.
    pub struct Node {
        pub container: TracelinkContainer,
        pub clock: Arc<ManualTimeSource>,
        pub results: UnboundedReceiver<MatchResult>,
    }

    pub fn node() -> Node {
        node_on(
            LevelStore::in_memory().into_shared(),
            Arc::new(ManualTimeSource::new(START_MS)),
        )
    }

    /// A node over an existing store, as after a restart.
    pub fn node_on(store: Arc<dyn CorrelationStore>, clock: Arc<ManualTimeSource>) -> Node {
        let (receiver, results) = ChannelReceiver::new();
        let container = TracelinkContainer::from_parts(
            &test_config(),
            store,
            clock.clone(),
            Arc::new(receiver),
        );
        Node {
            container,
            clock,
            results,
        }
    }

    impl Node {
        pub fn engine(&self) -> &Arc<MatchingEngine> {
            &self.container.engine
        }

        /// Everything emitted so far.
        pub async fn drain(&mut self) -> Vec<MatchResult> {
            self.engine().flush().await;
            let mut out = Vec::new();
            while let Ok(result) = self.results.try_recv() {
                out.push(result);
            }
            out
        }

        /// Next result from the background loops, if one arrives in time.
        pub async fn next_result(&mut self) -> Option<MatchResult> {
            tokio::time::timeout(Duration::from_secs(5), self.results.recv())
                .await
                .ok()
                .flatten()
        }

        /// One janitor sweep handed straight to the engine. Only for nodes
        /// whose background tasks are not running.
        pub async fn sweep(&self) {
            let mut sweeps = self.container.janitor.subscribe();
            self.container.janitor.sweep_due().await.unwrap();
            while let Ok(Some(event)) = sweeps.try_recv() {
                self.engine().on_sweep(event).await.unwrap();
            }
        }

        /// Keys pending under any role.
        pub async fn pending_keys(&self) -> Vec<(PendingRole, String)> {
            let mut out = Vec::new();
            for role in PendingRole::ALL {
                for key in self.engine().pending(role).await.unwrap() {
                    out.push((role, key));
                }
            }
            out
        }
    }

    pub fn outbound(commitment: &str) -> OutboundMessage {
        OutboundMessage::new(
            Correlation::commitment(commitment),
            Waypoint::new("A", 10),
            "B",
        )
    }

    pub fn inbound(commitment: &str, outcome: DeliveryOutcome) -> InboundMessage {
        InboundMessage::new(
            Correlation::commitment(commitment),
            Waypoint::new("B", 20),
            outcome,
        )
    }
}
