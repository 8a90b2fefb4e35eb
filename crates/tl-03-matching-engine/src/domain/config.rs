//! Matching configuration.

use serde::{Deserialize, Serialize};

/// Default TTL for outbound and inbound pending entries (1 hour).
pub const DEFAULT_TIMEOUT_MS: u64 = 3_600_000;
/// Default TTL for relay entries (10 minutes).
pub const DEFAULT_RELAY_TIMEOUT_MS: u64 = 600_000;
/// Default TTL for bridge phase entries (2 hours).
pub const DEFAULT_BRIDGE_TIMEOUT_MS: u64 = 7_200_000;
/// Default grace added to a failed message's declared timeout (30 minutes).
pub const DEFAULT_RETRY_GRACE_MS: u64 = 1_800_000;

/// TTL policy of the matching engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MatchingConfig {
    /// TTL of outbound and inbound pending entries.
    pub timeout_ms: u64,
    /// TTL of relay-in / relay-out entries.
    pub relay_timeout_ms: u64,
    /// TTL of bridge phase entries.
    pub bridge_timeout_ms: u64,
    /// Grace period on top of a declared timeout for retry entries.
    pub retry_grace_ms: u64,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            relay_timeout_ms: DEFAULT_RELAY_TIMEOUT_MS,
            bridge_timeout_ms: DEFAULT_BRIDGE_TIMEOUT_MS,
            retry_grace_ms: DEFAULT_RETRY_GRACE_MS,
        }
    }
}

impl MatchingConfig {
    /// TTL of a retry entry: `max(timeout_at - now, 0) + retry_grace_ms`,
    /// or `timeout_ms` when no timeout was declared.
    pub fn retry_ttl_ms(&self, timeout_at_ms: Option<u64>, now_ms: u64) -> u64 {
        match timeout_at_ms {
            Some(deadline) => deadline
                .saturating_sub(now_ms)
                .saturating_add(self.retry_grace_ms),
            None => self.timeout_ms,
        }
    }
}
