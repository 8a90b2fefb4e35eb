//! # Tracelink Telemetry
//!
//! Logging and metrics shared by every Tracelink component.
//!
//! ## Components
//!
//! - **Logs**: `tracing-subscriber` with `EnvFilter`, human or JSON output
//! - **Metrics**: Prometheus counters for matching and sweeping
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tl_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let _guard = init_telemetry(&TelemetryConfig::from_env())?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `TL_SERVICE_NAME` | `tracelink` | Service name attached to logs |
//! | `TL_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `TL_JSON_LOGS` | `false` | Emit JSON lines instead of human output |

#![warn(missing_docs)]

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::init_tracing;
pub use metrics::{
    encode_metrics, register_metrics, MetricsHandle, JANITOR_SCHEDULED, JANITOR_SWEEPS,
    MATCHING_DUPLICATES, MATCHING_RECEIVER_ERRORS, MATCHING_RESULTS, MATCHING_STORED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The log subscriber could not be installed.
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracingInit(String),

    /// Metric registration or encoding failed.
    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let metrics = register_metrics()?;
    init_tracing(config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(TelemetryGuard { _metrics: metrics })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!("Shutting down telemetry...");
    }
}

/// Convenience macro for recording a metric increment.
#[macro_export]
macro_rules! metric_inc {
    ($metric:expr) => {
        $metric.inc()
    };
    ($metric:expr, $labels:expr) => {
        $metric.with_label_values($labels).inc()
    };
}
