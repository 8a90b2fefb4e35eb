//! # Runtime Configuration
//!
//! Defaults overridden from `TL_*` environment variables. Malformed values
//! are logged and ignored.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TL_STORE` | `memory` (`rocksdb` needs the feature) |
//! | `TL_DATA_DIR` | `./data` |
//! | `TL_MATCH_TIMEOUT_MS` | 3 600 000 |
//! | `TL_RELAY_TIMEOUT_MS` | 600 000 |
//! | `TL_BRIDGE_TIMEOUT_MS` | 7 200 000 |
//! | `TL_RETRY_GRACE_MS` | 1 800 000 |
//! | `TL_SWEEP_INTERVAL_MS` | 5 000 |
//! | `TL_SWEEP_BATCH_LIMIT` | 512 |
//! | `TL_SWEEP_REDELIVERY_MS` | 60 000 |

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use tl_02_janitor::JanitorConfig;
use tl_03_matching_engine::MatchingConfig;
use tracing::warn;

/// Correlation store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Volatile, in process.
    #[default]
    Memory,
    /// Persistent RocksDB under the data directory.
    RocksDb,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" | "mem" => Ok(Self::Memory),
            "rocksdb" | "rocks" => Ok(Self::RocksDb),
            other => Err(format!("unknown store backend {other:?}")),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Store backend.
    pub store: StoreBackend,
    /// Directory for persistent data.
    pub data_dir: PathBuf,
    /// Matching TTL policy.
    pub matching: MatchingConfig,
    /// Janitor tuning.
    pub janitor: JanitorConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            store: StoreBackend::Memory,
            data_dir: PathBuf::from("./data"),
            matching: MatchingConfig::default(),
            janitor: JanitorConfig::default(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(store) = parsed(&lookup, "TL_STORE") {
            config.store = store;
        }
        if let Some(dir) = lookup("TL_DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(ms) = parsed(&lookup, "TL_MATCH_TIMEOUT_MS") {
            config.matching.timeout_ms = ms;
        }
        if let Some(ms) = parsed(&lookup, "TL_RELAY_TIMEOUT_MS") {
            config.matching.relay_timeout_ms = ms;
        }
        if let Some(ms) = parsed(&lookup, "TL_BRIDGE_TIMEOUT_MS") {
            config.matching.bridge_timeout_ms = ms;
        }
        if let Some(ms) = parsed(&lookup, "TL_RETRY_GRACE_MS") {
            config.matching.retry_grace_ms = ms;
        }
        match parsed::<u64>(&lookup, "TL_SWEEP_INTERVAL_MS") {
            Some(0) => warn!("TL_SWEEP_INTERVAL_MS must be positive, ignoring"),
            Some(ms) => config.janitor.sweep_interval = Duration::from_millis(ms),
            None => {}
        }
        match parsed::<usize>(&lookup, "TL_SWEEP_BATCH_LIMIT") {
            Some(0) => warn!("TL_SWEEP_BATCH_LIMIT must be positive, ignoring"),
            Some(limit) => config.janitor.batch_limit = limit,
            None => {}
        }
        match parsed::<u64>(&lookup, "TL_SWEEP_REDELIVERY_MS") {
            Some(0) => warn!("TL_SWEEP_REDELIVERY_MS must be positive, ignoring"),
            Some(ms) => config.janitor.redelivery_ms = ms,
            None => {}
        }

        config
    }
}

fn parsed<T>(lookup: &impl Fn(&str) -> Option<String>, name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = lookup(name)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(variable = name, value = %raw, error = %e, "Ignoring malformed setting");
            None
        }
    }
}
