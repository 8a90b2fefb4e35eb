//! Expiry handling.
//!
//! The janitor reports a due task together with the value it found. The
//! entry is only removed here, under the engine lock, and only if it still
//! holds that value: an absent entry was matched in the meantime and a
//! different value belongs to a newer entry with its own task.
//!
//! Every handled sweep commits the event's ack in the same batch, so the
//! task record disappears exactly when its outcome is durable.

use super::{MatchingEngine, Transition};
use crate::domain::{CorrelationKey, MatchResult, MatchingError, OutboundMessage, PendingRole};
use std::sync::Arc;
use tl_02_janitor::SweepEvent;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

impl MatchingEngine {
    /// Handle one sweep notification.
    ///
    /// An expired outbound becomes `Unmatched`. Every other role ages out
    /// without a result. Repeated notifications for the same task are
    /// harmless.
    pub async fn on_sweep(&self, event: SweepEvent) -> Result<(), MatchingError> {
        let mut t = Transition::default();
        t.ops.push(event.ack_op());
        let SweepEvent { task, value, .. } = event;
        let _guard = self.lock.lock().await;

        let Some(role) = PendingRole::from_namespace(&task.namespace) else {
            warn!(namespace = %task.namespace, "[tl-03] Sweep for unknown namespace");
            return self.commit(t).await;
        };
        let key = CorrelationKey::from_stored(task.key);
        let level = self.level(role);

        match level.get_raw(key.as_str()).await? {
            None => {
                debug!(key = %key, namespace = role.namespace(), "[tl-03] Sweep after match");
            }
            Some(current) if current != value => {
                debug!(key = %key, namespace = role.namespace(), "[tl-03] Stale sweep");
            }
            Some(_) => {
                t.delete(level, &key);
                if role == PendingRole::Outbound {
                    let outbound: OutboundMessage = serde_json::from_value(value)
                        .map_err(|e| MatchingError::codec(role.namespace(), e))?;
                    t.emit(MatchResult::Unmatched { key, outbound });
                } else {
                    debug!(
                        key = %key,
                        namespace = role.namespace(),
                        "[tl-03] Pending entry aged out"
                    );
                }
            }
        }

        self.commit(t).await
    }

    /// Consume janitor sweeps until `shutdown` flips to true.
    pub fn start(self: &Arc<Self>, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let engine = Arc::clone(self);
        let mut sweeps = self.janitor.subscribe();

        tokio::spawn(async move {
            info!("[tl-03] Sweep handler started");
            loop {
                tokio::select! {
                    event = sweeps.recv() => {
                        let Some(event) = event else { break };
                        if let Err(e) = engine.on_sweep(event).await {
                            error!(error = %e, "[tl-03] Sweep handling failed");
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("[tl-03] Sweep handler stopped");
        })
    }
}
