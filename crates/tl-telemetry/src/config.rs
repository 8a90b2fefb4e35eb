//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,

    /// Whether to print thread ids alongside log lines
    pub thread_ids: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "tracelink".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
            thread_ids: true,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `TL_SERVICE_NAME`: Service name (default: tracelink)
    /// - `TL_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `TL_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self {
            service_name: env::var("TL_SERVICE_NAME").unwrap_or_else(|_| "tracelink".to_string()),

            log_level: env::var("TL_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            json_logs: env::var("TL_JSON_LOGS")
                .map(|v| v.to_lowercase() == "true" || v == "1")
                .unwrap_or(false),

            thread_ids: true,
        }
    }

    /// Create configuration for a named component.
    pub fn for_component(name: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = format!("tracelink-{}", name);
        config
    }
}
