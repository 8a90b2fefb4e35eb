//! # Matching Engine Service
//!
//! ## Architecture
//!
//! Every entry point runs entirely inside one process-wide async mutex:
//! derive key → lock → read pending entries → decide → commit. A commit
//! schedules TTL tasks, applies all store writes as one atomic batch, then
//! queues the results. Queued results reach the receiver through the
//! dispatcher task, so callers never wait on the receiver.
//!
//! ```text
//! on_outbound ─┐
//! on_inbound  ─┤               ┌──────────────┐  batch   ┌───────────────┐
//! on_relay    ─┼──→ Mutex ───→ │  Transition  │ ───────→ │ CorrelationStore │
//! on_bridge_* ─┤               └──────────────┘          └───────────────┘
//! on_sweep    ─┘                      │ results
//!                                     ↓
//!                    telemetry bus + queue ──→ dispatcher ──→ MatchReceiver
//! ```

mod bridge;
mod direct;
mod dispatch;
mod relay;
mod sweep;

use crate::domain::{
    BridgeMessage, CorrelationKey, InboundMessage, MatchResult, MatchingConfig, MatchingError,
    OutboundMessage, PendingRole, RelayMessage,
};
use crate::ports::{MatchReceiver, MatchingApi, TimeSource};
use async_trait::async_trait;
use dispatch::Dispatch;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared_bus::{EventFilter, InMemoryEventBus, Subscription};
use std::sync::Arc;
use tl_01_correlation_store::{CorrelationStore, StoreOp, Sublevel};
use tl_02_janitor::{Scheduler, TtlTask};
use tl_telemetry::{metric_inc, MATCHING_DUPLICATES, MATCHING_RESULTS, MATCHING_STORED};
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, error, info};

/// Everything the engine consumes.
pub struct EngineContext {
    /// Correlation store.
    pub store: Arc<dyn CorrelationStore>,
    /// Expiry scheduler.
    pub janitor: Arc<dyn Scheduler>,
    /// Sink for every emitted result.
    pub receiver: Arc<dyn MatchReceiver>,
    /// Clock used for retry TTLs.
    pub clock: Arc<dyn TimeSource>,
    /// TTL policy.
    pub config: MatchingConfig,
}

/// One sublevel per pending role.
struct Levels {
    outbound: Sublevel,
    inbound: Sublevel,
    relay_in: Sublevel,
    relay_out: Sublevel,
    retry: Sublevel,
    bridge_accepted: Sublevel,
    bridge_delivered: Sublevel,
    bridge_inbound: Sublevel,
}

impl Levels {
    fn new(store: &Arc<dyn CorrelationStore>) -> Self {
        let level = |role: PendingRole| Sublevel::new(Arc::clone(store), role.namespace());
        Self {
            outbound: level(PendingRole::Outbound),
            inbound: level(PendingRole::Inbound),
            relay_in: level(PendingRole::RelayIn),
            relay_out: level(PendingRole::RelayOut),
            retry: level(PendingRole::Retry),
            bridge_accepted: level(PendingRole::BridgeAccepted),
            bridge_delivered: level(PendingRole::BridgeDelivered),
            bridge_inbound: level(PendingRole::BridgeInbound),
        }
    }

    fn get(&self, role: PendingRole) -> &Sublevel {
        match role {
            PendingRole::Outbound => &self.outbound,
            PendingRole::Inbound => &self.inbound,
            PendingRole::RelayIn => &self.relay_in,
            PendingRole::RelayOut => &self.relay_out,
            PendingRole::Retry => &self.retry,
            PendingRole::BridgeAccepted => &self.bridge_accepted,
            PendingRole::BridgeDelivered => &self.bridge_delivered,
            PendingRole::BridgeInbound => &self.bridge_inbound,
        }
    }
}

/// Store writes, TTL tasks and results of one entry-point call.
#[derive(Default)]
struct Transition {
    ops: Vec<StoreOp>,
    tasks: Vec<TtlTask>,
    stored: Vec<&'static str>,
    results: Vec<MatchResult>,
}

impl Transition {
    fn store<T: Serialize>(
        &mut self,
        level: &Sublevel,
        key: &CorrelationKey,
        value: &T,
        ttl_ms: u64,
    ) -> Result<(), MatchingError> {
        self.ops.push(level.put_op(key.as_str(), value)?);
        self.tasks
            .push(TtlTask::new(level.namespace(), key.as_str(), ttl_ms));
        self.stored.push(level.namespace());
        Ok(())
    }

    fn delete(&mut self, level: &Sublevel, key: &CorrelationKey) {
        self.ops.push(level.delete_op(key.as_str()));
    }

    fn emit(&mut self, result: MatchResult) {
        self.results.push(result);
    }
}

/// The matching engine.
pub struct MatchingEngine {
    store: Arc<dyn CorrelationStore>,
    levels: Levels,
    janitor: Arc<dyn Scheduler>,
    clock: Arc<dyn TimeSource>,
    config: MatchingConfig,
    lock: Mutex<()>,
    queue: mpsc::UnboundedSender<Dispatch>,
    telemetry: InMemoryEventBus<MatchResult>,
}

impl MatchingEngine {
    /// Create the engine and spawn its result dispatcher.
    ///
    /// Must be called from within a Tokio runtime. Sweeps are only handled
    /// once [`MatchingEngine::start`] has been called.
    pub fn new(ctx: EngineContext) -> Self {
        let (queue, pending) = mpsc::unbounded_channel();
        tokio::spawn(dispatch::run_dispatcher(ctx.receiver, pending));

        Self {
            levels: Levels::new(&ctx.store),
            store: ctx.store,
            janitor: ctx.janitor,
            clock: ctx.clock,
            config: ctx.config,
            lock: Mutex::new(()),
            queue,
            telemetry: InMemoryEventBus::new(),
        }
    }

    /// TTL policy in use.
    pub fn config(&self) -> &MatchingConfig {
        &self.config
    }

    /// Observe every emitted result without touching the store.
    pub fn subscribe(&self, filter: EventFilter) -> Subscription<MatchResult> {
        self.telemetry.subscribe(filter)
    }

    /// Keys pending in a role, in key order.
    pub async fn pending(&self, role: PendingRole) -> Result<Vec<String>, MatchingError> {
        Ok(self.levels.get(role).keys().await?)
    }

    /// Number of pending entries across every role.
    pub async fn pending_total(&self) -> Result<usize, MatchingError> {
        let mut total = 0;
        for role in PendingRole::ALL {
            total += self.levels.get(role).len().await?;
        }
        Ok(total)
    }

    /// Wait until every result emitted so far reached the receiver.
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.queue.send(Dispatch::Flush(done)).is_err() {
            return;
        }
        let _ = wait.await;
    }

    fn level(&self, role: PendingRole) -> &Sublevel {
        self.levels.get(role)
    }

    async fn read<T: DeserializeOwned>(
        &self,
        role: PendingRole,
        key: &CorrelationKey,
    ) -> Result<Option<T>, MatchingError> {
        Ok(self.level(role).get(key.as_str()).await?)
    }

    async fn contains(
        &self,
        role: PendingRole,
        key: &CorrelationKey,
    ) -> Result<bool, MatchingError> {
        Ok(self.level(role).contains(key.as_str()).await?)
    }

    /// Pending dispatch for `key`, whether still open or awaiting a retry.
    async fn find_origin(
        &self,
        key: &CorrelationKey,
    ) -> Result<Option<OutboundMessage>, MatchingError> {
        if let Some(outbound) = self.read(PendingRole::Outbound, key).await? {
            return Ok(Some(outbound));
        }
        self.read(PendingRole::Retry, key).await
    }

    fn duplicate(&self, role: PendingRole, key: &CorrelationKey) {
        metric_inc!(MATCHING_DUPLICATES, &[role.label()]);
        debug!(key = %key, role = role.label(), "[tl-03] Duplicate dropped");
    }

    /// Apply a transition. Must be called with the lock held.
    async fn commit(&self, transition: Transition) -> Result<(), MatchingError> {
        let Transition {
            ops,
            tasks,
            stored,
            results,
        } = transition;

        // Tasks first: no entry may exist without one.
        for task in tasks {
            self.janitor.schedule(task).await?;
        }
        if !ops.is_empty() {
            self.store.batch(ops).await?;
        }
        for namespace in stored {
            metric_inc!(MATCHING_STORED, &[namespace]);
            debug!(namespace, "[tl-03] Pending entry stored");
        }
        for result in results {
            self.emit(result);
        }
        Ok(())
    }

    fn emit(&self, result: MatchResult) {
        let kind = result.kind().as_str();
        metric_inc!(MATCHING_RESULTS, &[kind]);
        info!(key = %result.key(), kind, "[tl-03] Match result");

        self.telemetry.publish_now(result.clone());
        if self.queue.send(Dispatch::Result(result)).is_err() {
            error!(kind, "[tl-03] Dispatcher gone, result dropped");
        }
    }
}

#[async_trait]
impl MatchingApi for MatchingEngine {
    async fn on_outbound(&self, msg: OutboundMessage) -> Result<(), MatchingError> {
        MatchingEngine::on_outbound(self, msg).await
    }

    async fn on_inbound(&self, msg: InboundMessage) -> Result<(), MatchingError> {
        MatchingEngine::on_inbound(self, msg).await
    }

    async fn on_relay(&self, msg: RelayMessage) -> Result<(), MatchingError> {
        MatchingEngine::on_relay(self, msg).await
    }

    async fn on_bridge_accepted(&self, msg: BridgeMessage) -> Result<(), MatchingError> {
        MatchingEngine::on_bridge_accepted(self, msg).await
    }

    async fn on_bridge_delivered(&self, msg: BridgeMessage) -> Result<(), MatchingError> {
        MatchingEngine::on_bridge_delivered(self, msg).await
    }

    async fn on_bridge_inbound(&self, msg: BridgeMessage) -> Result<(), MatchingError> {
        MatchingEngine::on_bridge_inbound(self, msg).await
    }

    async fn flush(&self) {
        MatchingEngine::flush(self).await
    }
}
