//! Outbound / inbound correlation.

use super::{MatchingEngine, Transition};
use crate::domain::{
    CorrelationKey, DeliveryOutcome, InboundMessage, MatchResult, MatchingError, OutboundMessage,
    PendingRole, RelayMessage, RelayStage,
};
use tracing::debug;

impl MatchingEngine {
    /// Handle a dispatch observed on the sending network.
    ///
    /// Emits `Sent` once per unique outbound, then consumes any relay
    /// observations and a pending inbound for the same key. Without an
    /// inbound the outbound is stored until matched or swept.
    pub async fn on_outbound(&self, msg: OutboundMessage) -> Result<(), MatchingError> {
        let key = msg.correlation_key()?;
        let _guard = self.lock.lock().await;

        if self.contains(PendingRole::Outbound, &key).await?
            || self.contains(PendingRole::Retry, &key).await?
        {
            self.duplicate(PendingRole::Outbound, &key);
            return Ok(());
        }

        let mut t = Transition::default();
        t.emit(MatchResult::Sent {
            key: key.clone(),
            outbound: msg.clone(),
        });

        for role in [PendingRole::RelayIn, PendingRole::RelayOut] {
            if let Some(relay) = self.read::<RelayMessage>(role, &key).await? {
                t.delete(self.level(role), &key);
                t.emit(MatchResult::Relayed {
                    key: key.clone(),
                    origin: Some(msg.clone()),
                    stage: RelayStage::Relay {
                        direction: relay.direction,
                        waypoint: relay.relay,
                    },
                });
            }
        }

        match self.read::<InboundMessage>(PendingRole::Inbound, &key).await? {
            Some(inbound) => self.settle(&mut t, &key, msg, inbound, PendingRole::Inbound)?,
            None => t.store(
                self.level(PendingRole::Outbound),
                &key,
                &msg,
                self.config.timeout_ms,
            )?,
        }

        self.commit(t).await
    }

    /// Handle a receipt observed on the receiving network.
    ///
    /// Checks `retry` first, then `outbound`. Without either the inbound is
    /// stored until matched or swept.
    pub async fn on_inbound(&self, msg: InboundMessage) -> Result<(), MatchingError> {
        let key = msg.correlation_key()?;
        let _guard = self.lock.lock().await;

        let mut t = Transition::default();
        if let Some(outbound) = self.read(PendingRole::Retry, &key).await? {
            self.settle(&mut t, &key, outbound, msg, PendingRole::Retry)?;
        } else if let Some(outbound) = self.read(PendingRole::Outbound, &key).await? {
            self.settle(&mut t, &key, outbound, msg, PendingRole::Outbound)?;
        } else if self.contains(PendingRole::Inbound, &key).await? {
            self.duplicate(PendingRole::Inbound, &key);
            return Ok(());
        } else {
            t.store(self.level(PendingRole::Inbound), &key, &msg, self.config.timeout_ms)?;
        }

        self.commit(t).await
    }

    /// Resolve a matched outbound / inbound pair. `pending` is where the
    /// side that was waiting is stored.
    ///
    /// A failed inbound parks the outbound in `retry` (or leaves it there)
    /// and reports `Received` with the failed outcome. Otherwise the waiting
    /// side is removed and the pair resolves to a hop boundary or a
    /// terminal result.
    fn settle(
        &self,
        t: &mut Transition,
        key: &CorrelationKey,
        outbound: OutboundMessage,
        inbound: InboundMessage,
        pending: PendingRole,
    ) -> Result<(), MatchingError> {
        if inbound.outcome.is_failure() {
            if pending != PendingRole::Retry {
                let ttl = self
                    .config
                    .retry_ttl_ms(outbound.timeout_at, self.clock.now_ms());
                t.delete(self.level(pending), key);
                t.store(self.level(PendingRole::Retry), key, &outbound, ttl)?;
                debug!(key = %key, ttl_ms = ttl, "[tl-03] Delivery failed, awaiting retry");
            }
            t.emit(MatchResult::Received {
                key: key.clone(),
                outbound,
                inbound,
            });
            return Ok(());
        }

        t.delete(self.level(pending), key);
        t.emit(resolve(key.clone(), outbound, inbound));
        Ok(())
    }
}

/// Result of a successful or timed-out match.
fn resolve(key: CorrelationKey, outbound: OutboundMessage, inbound: InboundMessage) -> MatchResult {
    if inbound.network() != &outbound.destination {
        return MatchResult::Relayed {
            key,
            origin: Some(outbound),
            stage: RelayStage::Hop {
                waypoint: inbound.destination,
            },
        };
    }
    match inbound.outcome {
        DeliveryOutcome::Timeout => MatchResult::Timeout {
            key,
            outbound,
            inbound,
        },
        DeliveryOutcome::Received | DeliveryOutcome::Failed => MatchResult::Received {
            key,
            outbound,
            inbound,
        },
    }
}
