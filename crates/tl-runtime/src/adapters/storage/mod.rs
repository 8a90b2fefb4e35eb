//! # Storage Adapters
//!
//! Selects the `KeyValueStore` behind the correlation store.
//!
//! Enable the `rocksdb` feature for the persistent backend:
//!
//! ```toml
//! tl-runtime = { path = "...", features = ["rocksdb"] }
//! ```

#[cfg(feature = "rocksdb")]
pub mod rocksdb_adapter;

#[cfg(feature = "rocksdb")]
pub use rocksdb_adapter::{RocksDbConfig, RocksDbStore};

use crate::config::{RuntimeConfig, StoreBackend};
use std::sync::Arc;
use tl_01_correlation_store::{CorrelationStore, LevelStore};
use tracing::info;

/// Open the configured correlation store.
pub fn open_store(config: &RuntimeConfig) -> anyhow::Result<Arc<dyn CorrelationStore>> {
    match config.store {
        StoreBackend::Memory => {
            info!("Using in-memory correlation store");
            Ok(LevelStore::in_memory().into_shared())
        }
        StoreBackend::RocksDb => open_rocksdb(config),
    }
}

#[cfg(feature = "rocksdb")]
fn open_rocksdb(config: &RuntimeConfig) -> anyhow::Result<Arc<dyn CorrelationStore>> {
    use anyhow::Context;

    let path = config.data_dir.join("correlation");
    let store = RocksDbStore::open(RocksDbConfig::new(path.to_string_lossy()))
        .with_context(|| format!("opening RocksDB at {}", path.display()))?;
    info!(path = %path.display(), "Using RocksDB correlation store");
    Ok(LevelStore::new(store).into_shared())
}

#[cfg(not(feature = "rocksdb"))]
fn open_rocksdb(_config: &RuntimeConfig) -> anyhow::Result<Arc<dyn CorrelationStore>> {
    anyhow::bail!("TL_STORE=rocksdb requires building tl-runtime with the `rocksdb` feature")
}
