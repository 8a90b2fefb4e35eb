//! # Tracelink Runtime
//!
//! Reads decoded message events as JSON lines on stdin, reconciles them
//! into journeys and writes every match result as a JSON line on stdout.
//! Logs go to stderr.
//!
//! ## Shutdown
//!
//! End of input or Ctrl+C stops ingestion. Pending results are flushed
//! and background tasks are stopped before exit. With the RocksDB backend
//! pending entries and expiry tasks survive the restart.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::BufReader;
use tracing::{info, warn};

use tl_runtime::ingest::run_ingest;
use tl_runtime::{JsonLinesReceiver, RuntimeConfig, TracelinkContainer};
use tl_telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let _telemetry = init_telemetry(&TelemetryConfig::from_env())
        .context("Failed to initialize telemetry")?;

    let config = RuntimeConfig::from_env();
    info!("===========================================");
    info!("  Tracelink Runtime v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(
        store = ?config.store,
        data_dir = %config.data_dir.display(),
        sweep_interval_ms = config.janitor.sweep_interval.as_millis() as u64,
        "Configuration loaded"
    );

    let receiver = Arc::new(JsonLinesReceiver::new(tokio::io::stdout()));
    let mut container =
        TracelinkContainer::build(&config, receiver).context("Failed to build components")?;
    container.start();

    let input = BufReader::new(tokio::io::stdin());
    tokio::select! {
        stats = run_ingest(input, container.engine.as_ref()) => {
            let stats = stats.context("Failed to read input")?;
            info!(
                dispatched = stats.dispatched,
                malformed = stats.malformed,
                failed = stats.failed,
                "Ingestion finished"
            );
        }
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    container.engine.flush().await;
    match container.engine.pending_total().await {
        Ok(pending) => info!(pending, "Pending entries left in store"),
        Err(e) => warn!(error = %e, "Could not count pending entries"),
    }

    container.shutdown().await;
    Ok(())
}
