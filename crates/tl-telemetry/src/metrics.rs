//! Prometheus metrics for Tracelink components.
//!
//! All metrics follow the naming convention: `tl_<component>_<metric>_<unit>`

use lazy_static::lazy_static;
use prometheus::{Counter, CounterVec, Encoder, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // MATCHING ENGINE METRICS (tl-03)
    // =========================================================================

    /// Results emitted by the matching engine, by kind.
    pub static ref MATCHING_RESULTS: CounterVec = CounterVec::new(
        Opts::new("tl_matching_results_total", "Results emitted by the matching engine"),
        &["kind"]  // sent/relayed/received/timeout/unmatched
    ).expect("metric creation failed");

    /// Observations dropped because an entry with the same key was pending.
    pub static ref MATCHING_DUPLICATES: CounterVec = CounterVec::new(
        Opts::new("tl_matching_duplicates_total", "Duplicate observations dropped"),
        &["role"]
    ).expect("metric creation failed");

    /// Pending entries written, by namespace.
    pub static ref MATCHING_STORED: CounterVec = CounterVec::new(
        Opts::new("tl_matching_stored_total", "Pending entries stored"),
        &["namespace"]
    ).expect("metric creation failed");

    /// Receiver callbacks that failed or panicked.
    pub static ref MATCHING_RECEIVER_ERRORS: Counter = Counter::new(
        "tl_matching_receiver_errors_total",
        "Receiver callbacks that returned an error or panicked"
    ).expect("metric creation failed");

    // =========================================================================
    // JANITOR METRICS (tl-02)
    // =========================================================================

    /// Expiry tasks scheduled.
    pub static ref JANITOR_SCHEDULED: Counter = Counter::new(
        "tl_janitor_scheduled_total",
        "Expiry tasks scheduled"
    ).expect("metric creation failed");

    /// Sweep notifications published, by namespace.
    pub static ref JANITOR_SWEEPS: CounterVec = CounterVec::new(
        Opts::new("tl_janitor_sweeps_total", "Sweep notifications published"),
        &["namespace"]
    ).expect("metric creation failed");
}

/// Handle for the registered metrics
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Registering twice is not an error; already-registered collectors are
/// skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Matching
        Box::new(MATCHING_RESULTS.clone()),
        Box::new(MATCHING_DUPLICATES.clone()),
        Box::new(MATCHING_STORED.clone()),
        Box::new(MATCHING_RECEIVER_ERRORS.clone()),
        // Janitor
        Box::new(JANITOR_SCHEDULED.clone()),
        Box::new(JANITOR_SWEEPS.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_metrics_twice() {
        assert!(register_metrics().is_ok());
        assert!(register_metrics().is_ok());
    }

    #[test]
    fn test_encode_contains_counters() {
        register_metrics().unwrap();
        JANITOR_SCHEDULED.inc();
        MATCHING_STORED.with_label_values(&["match:outbound"]).inc();

        let text = encode_metrics().unwrap();
        assert!(text.contains("tl_janitor_scheduled_total"));
        assert!(text.contains("tl_matching_stored_total"));
    }
}
