//! Bridge hand-offs.
//!
//! A bridge sits between two transport legs and reports three phases:
//! accepted, delivered, received on the other side. Each phase is keyed by
//! `{channel}:{nonce}` and emits a `Relayed` result; none of them touches
//! the base correlation.
//!
//! ```text
//! accepted ──→ match:bridge:accepted ──┬── delivered: emit once, mark entry
//!                                      └── inbound:   emit, remove entry
//! ```
//!
//! Phases arriving before `accepted` wait in their own namespace and are
//! replayed when it shows up.

use super::{MatchingEngine, Transition};
use crate::domain::{
    BridgeEntry, BridgeMessage, BridgePhase, CorrelationKey, MatchResult, MatchingError,
    OutboundMessage, PendingRole, RelayStage,
};

fn bridge_result(
    key: Option<&CorrelationKey>,
    bridge_key: &CorrelationKey,
    origin: Option<OutboundMessage>,
    phase: BridgePhase,
    msg: BridgeMessage,
) -> MatchResult {
    MatchResult::Relayed {
        key: key.unwrap_or(bridge_key).clone(),
        origin,
        stage: RelayStage::Bridge {
            phase,
            bridge_key: bridge_key.clone(),
            waypoint: msg.waypoint,
        },
    }
}

impl MatchingEngine {
    /// Bridge accepted the message.
    pub async fn on_bridge_accepted(&self, msg: BridgeMessage) -> Result<(), MatchingError> {
        let bridge_key = msg.bridge_key()?;
        let base_key = msg.base_key()?;
        let _guard = self.lock.lock().await;

        if self.contains(PendingRole::BridgeAccepted, &bridge_key).await? {
            self.duplicate(PendingRole::BridgeAccepted, &bridge_key);
            return Ok(());
        }

        let origin = match &base_key {
            Some(key) => self.find_origin(key).await?,
            None => None,
        };

        let mut t = Transition::default();
        t.emit(bridge_result(
            base_key.as_ref(),
            &bridge_key,
            origin.clone(),
            BridgePhase::Accepted,
            msg.clone(),
        ));

        let delivered = self
            .read::<BridgeMessage>(PendingRole::BridgeDelivered, &bridge_key)
            .await?;
        let was_delivered = delivered.is_some();
        if let Some(delivered) = delivered {
            t.delete(self.level(PendingRole::BridgeDelivered), &bridge_key);
            t.emit(bridge_result(
                base_key.as_ref(),
                &bridge_key,
                origin.clone(),
                BridgePhase::Delivered,
                delivered,
            ));
        }

        let inbound = self
            .read::<BridgeMessage>(PendingRole::BridgeInbound, &bridge_key)
            .await?;
        match inbound {
            Some(inbound) => {
                t.delete(self.level(PendingRole::BridgeInbound), &bridge_key);
                t.emit(bridge_result(
                    base_key.as_ref(),
                    &bridge_key,
                    origin,
                    BridgePhase::Received,
                    inbound,
                ));
            }
            None => {
                let entry = BridgeEntry {
                    base_key,
                    origin,
                    accepted: msg,
                    delivered: was_delivered,
                };
                t.store(
                    self.level(PendingRole::BridgeAccepted),
                    &bridge_key,
                    &entry,
                    self.config.bridge_timeout_ms,
                )?;
            }
        }

        self.commit(t).await
    }

    /// Bridge delivered the message.
    pub async fn on_bridge_delivered(&self, msg: BridgeMessage) -> Result<(), MatchingError> {
        let bridge_key = msg.bridge_key()?;
        let _guard = self.lock.lock().await;

        let mut t = Transition::default();
        let accepted = self
            .read::<BridgeEntry>(PendingRole::BridgeAccepted, &bridge_key)
            .await?;
        if let Some(mut entry) = accepted {
            if entry.delivered {
                self.duplicate(PendingRole::BridgeDelivered, &bridge_key);
                return Ok(());
            }
            t.emit(bridge_result(
                entry.base_key.as_ref(),
                &bridge_key,
                entry.origin.clone(),
                BridgePhase::Delivered,
                msg,
            ));
            // The rewrite replaces the entry's TTL task; the old one goes stale.
            entry.delivered = true;
            t.store(
                self.level(PendingRole::BridgeAccepted),
                &bridge_key,
                &entry,
                self.config.bridge_timeout_ms,
            )?;
        } else if self
            .contains(PendingRole::BridgeDelivered, &bridge_key)
            .await?
        {
            self.duplicate(PendingRole::BridgeDelivered, &bridge_key);
            return Ok(());
        } else {
            t.store(
                self.level(PendingRole::BridgeDelivered),
                &bridge_key,
                &msg,
                self.config.bridge_timeout_ms,
            )?;
        }

        self.commit(t).await
    }

    /// Bridged message observed on the other side. Closes the hand-off.
    pub async fn on_bridge_inbound(&self, msg: BridgeMessage) -> Result<(), MatchingError> {
        let bridge_key = msg.bridge_key()?;
        let _guard = self.lock.lock().await;

        let mut t = Transition::default();
        let accepted = self
            .read::<BridgeEntry>(PendingRole::BridgeAccepted, &bridge_key)
            .await?;
        if let Some(entry) = accepted {
            t.delete(self.level(PendingRole::BridgeAccepted), &bridge_key);
            t.delete(self.level(PendingRole::BridgeDelivered), &bridge_key);
            t.emit(bridge_result(
                entry.base_key.as_ref(),
                &bridge_key,
                entry.origin,
                BridgePhase::Received,
                msg,
            ));
        } else if self
            .contains(PendingRole::BridgeInbound, &bridge_key)
            .await?
        {
            self.duplicate(PendingRole::BridgeInbound, &bridge_key);
            return Ok(());
        } else {
            t.store(
                self.level(PendingRole::BridgeInbound),
                &bridge_key,
                &msg,
                self.config.bridge_timeout_ms,
            )?;
        }

        self.commit(t).await
    }
}
