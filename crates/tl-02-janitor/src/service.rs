//! # Janitor Service
//!
//! Persists TTL tasks in the correlation store and turns due tasks into
//! [`SweepEvent`]s.

use crate::domain::{JanitorConfig, JanitorError, StoredTask, SweepEvent, TtlTask, TASKS_NAMESPACE};
use crate::ports::{Scheduler, TimeSource};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::{EventFilter, InMemoryEventBus, Subscription, DEFAULT_CHANNEL_CAPACITY};
use std::collections::HashMap;
use std::sync::Arc;
use tl_01_correlation_store::{CorrelationStore, StoreOp};
use tl_telemetry::{metric_inc, JANITOR_SCHEDULED, JANITOR_SWEEPS};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// TTL scheduler backed by the correlation store.
pub struct Janitor {
    store: Arc<dyn CorrelationStore>,
    clock: Arc<dyn TimeSource>,
    bus: InMemoryEventBus<SweepEvent>,
    config: JanitorConfig,
    /// Published but unacknowledged record keys, with publish time.
    in_flight: Mutex<HashMap<String, u64>>,
}

impl Janitor {
    /// Create a janitor over `store`.
    pub fn new(
        store: Arc<dyn CorrelationStore>,
        clock: Arc<dyn TimeSource>,
        config: JanitorConfig,
    ) -> Self {
        // A single sweep must fit in the channel or subscribers lag.
        let capacity = DEFAULT_CHANNEL_CAPACITY.max(config.batch_limit * 2);
        Self {
            store,
            clock,
            bus: InMemoryEventBus::with_capacity(capacity),
            config,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Configuration in use.
    pub fn config(&self) -> &JanitorConfig {
        &self.config
    }

    /// Number of persisted tasks, due or not.
    pub async fn pending_tasks(&self) -> Result<usize, JanitorError> {
        Ok(self.store.keys(TASKS_NAMESPACE).await?.len())
    }

    /// Publish every task due at the current time.
    ///
    /// Returns the number of sweep events published. At most `batch_limit`
    /// records are read per call. A record stays until a subscriber commits
    /// the event's ack; until then it is skipped for `redelivery_ms` and
    /// then published again.
    pub async fn sweep_due(&self) -> Result<usize, JanitorError> {
        let now = self.clock.now_ms();
        let redelivery_ms = self.config.redelivery_ms;
        self.in_flight
            .lock()
            .retain(|_, published_at| now.saturating_sub(*published_at) < redelivery_ms);
        let mut published = 0;

        let records = self
            .store
            .entries(TASKS_NAMESPACE, Some(self.config.batch_limit))
            .await?;
        for (record_key, raw) in records {
            let stored: StoredTask = match serde_json::from_value(raw) {
                Ok(stored) => stored,
                Err(e) => {
                    warn!(record = %record_key, error = %e, "[tl-02] Dropping corrupt task");
                    self.store.delete(TASKS_NAMESPACE, &record_key).await?;
                    continue;
                }
            };

            // Records are ordered by due time
            if !stored.is_due(now) {
                break;
            }
            if self.in_flight.lock().contains_key(&record_key) {
                continue;
            }

            let task = stored.task;
            let Some(value) = self.store.get(&task.namespace, &task.key).await? else {
                debug!(
                    namespace = %task.namespace,
                    key = %task.key,
                    "[tl-02] Entry already gone, discarding task"
                );
                self.store.delete(TASKS_NAMESPACE, &record_key).await?;
                continue;
            };

            let namespace = task.namespace.clone();
            let event = SweepEvent {
                task,
                value,
                record_key: record_key.clone(),
            };
            if self.bus.publish_now(event) == 0 {
                warn!(namespace = %namespace, "[tl-02] No sweep subscribers, task kept");
                break;
            }

            metric_inc!(JANITOR_SWEEPS, &[namespace.as_str()]);
            self.in_flight.lock().insert(record_key, now);
            published += 1;
        }

        if published > 0 {
            debug!(published, "[tl-02] Sweep complete");
        }
        Ok(published)
    }

    /// Run the sweep loop until `shutdown` flips to true.
    pub async fn run(self: Arc<Self>, mut shutdown: watch::Receiver<bool>) {
        info!(
            interval_ms = self.config.sweep_interval.as_millis() as u64,
            "[tl-02] Janitor started"
        );
        let mut interval = tokio::time::interval(self.config.sweep_interval);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.sweep_due().await {
                        error!(error = %e, "[tl-02] Sweep failed");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("[tl-02] Janitor stopped");
    }

    /// Spawn [`Janitor::run`] on the current runtime.
    pub fn start(self: &Arc<Self>, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(Arc::clone(self).run(shutdown))
    }
}

#[async_trait]
impl Scheduler for Janitor {
    async fn schedule(&self, task: TtlTask) -> Result<(), JanitorError> {
        let stored = StoredTask {
            due_at_ms: self.clock.now_ms().saturating_add(task.expiry_ms),
            task,
        };
        let value = serde_json::to_value(&stored).map_err(|e| JanitorError::CorruptTask {
            key: stored.record_key(),
            message: e.to_string(),
        })?;

        self.store
            .batch(vec![StoreOp::put(TASKS_NAMESPACE, stored.record_key(), value)])
            .await?;
        metric_inc!(JANITOR_SCHEDULED);

        debug!(
            namespace = %stored.task.namespace,
            key = %stored.task.key,
            due_at_ms = stored.due_at_ms,
            "[tl-02] Task scheduled"
        );
        Ok(())
    }

    fn subscribe(&self) -> Subscription<SweepEvent> {
        self.bus.subscribe(EventFilter::all())
    }
}
