//! # Tracelink Container
//!
//! Owns every component and the background tasks that drive them.
//!
//! ## Initialization Order
//!
//! 1. Correlation store
//! 2. Janitor (schedules into the store)
//! 3. Matching engine (store, janitor, receiver)
//!
//! `start` subscribes the engine to sweeps before the janitor loop runs, so
//! no due task is held back waiting for a subscriber.

use std::sync::Arc;

use anyhow::Result;
use tl_01_correlation_store::CorrelationStore;
use tl_02_janitor::{Janitor, SystemTimeSource, TimeSource};
use tl_03_matching_engine::{EngineContext, MatchReceiver, MatchingEngine};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::adapters::open_store;
use crate::config::RuntimeConfig;

/// Wired components plus their background tasks.
pub struct TracelinkContainer {
    /// Correlation store shared by janitor and engine.
    pub store: Arc<dyn CorrelationStore>,
    /// Expiry scheduler.
    pub janitor: Arc<Janitor>,
    /// Matching engine.
    pub engine: Arc<MatchingEngine>,
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
}

impl TracelinkContainer {
    /// Open the configured store and wire everything against the system clock.
    ///
    /// Must be called inside a tokio runtime.
    pub fn build(config: &RuntimeConfig, receiver: Arc<dyn MatchReceiver>) -> Result<Self> {
        let store = open_store(config)?;
        Ok(Self::from_parts(
            config,
            store,
            Arc::new(SystemTimeSource),
            receiver,
        ))
    }

    /// Wire components over an existing store and clock.
    pub fn from_parts(
        config: &RuntimeConfig,
        store: Arc<dyn CorrelationStore>,
        clock: Arc<dyn TimeSource>,
        receiver: Arc<dyn MatchReceiver>,
    ) -> Self {
        let janitor = Arc::new(Janitor::new(
            Arc::clone(&store),
            Arc::clone(&clock),
            config.janitor.clone(),
        ));
        let engine = Arc::new(MatchingEngine::new(EngineContext {
            store: Arc::clone(&store),
            janitor: janitor.clone(),
            receiver,
            clock,
            config: config.matching.clone(),
        }));
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            store,
            janitor,
            engine,
            shutdown_tx,
            handles: Vec::new(),
        }
    }

    /// Spawn the sweep handler and the janitor loop.
    pub fn start(&mut self) {
        if !self.handles.is_empty() {
            warn!("Container already started");
            return;
        }
        self.handles.push(self.engine.start(self.shutdown_tx.subscribe()));
        self.handles.push(self.janitor.start(self.shutdown_tx.subscribe()));
        info!("Background tasks running");
    }

    /// Stop background tasks and wait for them to finish.
    pub async fn shutdown(mut self) {
        info!("Initiating graceful shutdown...");
        let _ = self.shutdown_tx.send(true);
        for handle in self.handles.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "Background task ended abnormally");
            }
        }
        self.engine.flush().await;
        info!("Shutdown complete");
    }
}
