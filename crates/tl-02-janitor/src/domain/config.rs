use std::time::Duration;

/// Janitor tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JanitorConfig {
    /// Time between sweeps of the run loop.
    pub sweep_interval: Duration,
    /// Maximum number of due tasks handled per sweep.
    pub batch_limit: usize,
    /// How long a published, unacknowledged task waits before it is
    /// published again, in milliseconds.
    pub redelivery_ms: u64,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            sweep_interval: Duration::from_secs(5),
            batch_limit: 512,
            redelivery_ms: 60_000,
        }
    }
}

impl JanitorConfig {
    /// Configuration for tests: sweeps every 10ms.
    pub fn for_testing() -> Self {
        Self {
            sweep_interval: Duration::from_millis(10),
            batch_limit: 64,
            redelivery_ms: 1_000,
        }
    }
}
