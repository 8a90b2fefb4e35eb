//! Relay observations on intermediary networks.

use super::{MatchingEngine, Transition};
use crate::domain::{
    MatchResult, MatchingError, PendingRole, RelayDirection, RelayMessage, RelayStage,
};

impl MatchingEngine {
    /// Handle a hand-off observed on an intermediary network.
    ///
    /// A relay never terminates its correlation: with the outbound pending it
    /// only emits `Relayed`, otherwise it waits in `relay-in` / `relay-out`
    /// for the outbound to show up.
    pub async fn on_relay(&self, msg: RelayMessage) -> Result<(), MatchingError> {
        let key = msg.correlation_key()?;
        let _guard = self.lock.lock().await;

        let mut t = Transition::default();
        if let Some(origin) = self.find_origin(&key).await? {
            t.emit(MatchResult::Relayed {
                key,
                origin: Some(origin),
                stage: RelayStage::Relay {
                    direction: msg.direction,
                    waypoint: msg.relay,
                },
            });
            return self.commit(t).await;
        }

        let role = match msg.direction {
            RelayDirection::In => PendingRole::RelayIn,
            RelayDirection::Out => PendingRole::RelayOut,
        };
        if self.contains(role, &key).await? {
            self.duplicate(role, &key);
            return Ok(());
        }

        t.store(self.level(role), &key, &msg, self.config.relay_timeout_ms)?;
        self.commit(t).await
    }
}
