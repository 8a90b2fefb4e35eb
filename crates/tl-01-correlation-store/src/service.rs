//! # Correlation Store Service
//!
//! `LevelStore` adapts any byte-level `KeyValueStore` into the namespaced,
//! JSON-valued `CorrelationStore`. `Sublevel` is a typed view over one
//! namespace.

use crate::adapters::InMemoryKVStore;
use crate::domain::{decode_key, encode_key, namespace_prefix, validate_namespace, StoreError};
use crate::ports::{BatchOperation, CorrelationStore, KeyValueStore, StoreOp};
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error};

/// Correlation store over a byte-level backend.
pub struct LevelStore<S: KeyValueStore> {
    backend: RwLock<S>,
}

impl<S: KeyValueStore + 'static> LevelStore<S> {
    /// Wrap a backend.
    pub fn new(backend: S) -> Self {
        Self {
            backend: RwLock::new(backend),
        }
    }

    /// Erase the backend type for sharing between components.
    pub fn into_shared(self) -> Arc<dyn CorrelationStore> {
        Arc::new(self)
    }
}

impl LevelStore<InMemoryKVStore> {
    /// Volatile store for tests and ephemeral runs.
    pub fn in_memory() -> Self {
        Self::new(InMemoryKVStore::new())
    }
}

fn encode_value(namespace: &str, value: &Value) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(value).map_err(|e| StoreError::codec(namespace, e))
}

fn decode_value(namespace: &str, raw: &[u8]) -> Result<Value, StoreError> {
    serde_json::from_slice(raw).map_err(|e| StoreError::codec(namespace, e))
}

#[async_trait]
impl<S: KeyValueStore + 'static> CorrelationStore for LevelStore<S> {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Value>, StoreError> {
        validate_namespace(namespace)?;
        let raw = self.backend.read().get(&encode_key(namespace, key))?;
        raw.map(|bytes| decode_value(namespace, &bytes)).transpose()
    }

    async fn put(&self, namespace: &str, key: &str, value: Value) -> Result<(), StoreError> {
        validate_namespace(namespace)?;
        let bytes = encode_value(namespace, &value)?;
        self.backend
            .write()
            .put(&encode_key(namespace, key), &bytes)
            .map_err(|e| {
                error!(namespace, key, error = %e, "[tl-01] put failed");
                StoreError::from(e)
            })
    }

    async fn delete(&self, namespace: &str, key: &str) -> Result<(), StoreError> {
        validate_namespace(namespace)?;
        self.backend.write().delete(&encode_key(namespace, key))?;
        Ok(())
    }

    async fn batch(&self, ops: Vec<StoreOp>) -> Result<(), StoreError> {
        // Encode everything up front so a codec failure applies nothing.
        let mut batch = Vec::with_capacity(ops.len());
        for op in &ops {
            validate_namespace(op.namespace())?;
            batch.push(match op {
                StoreOp::Put {
                    namespace,
                    key,
                    value,
                } => {
                    BatchOperation::put(encode_key(namespace, key), encode_value(namespace, value)?)
                }
                StoreOp::Delete { namespace, key } => {
                    BatchOperation::delete(encode_key(namespace, key))
                }
            });
        }
        debug!(ops = batch.len(), "[tl-01] atomic batch");
        self.backend.write().atomic_batch_write(batch)?;
        Ok(())
    }

    async fn entries(
        &self,
        namespace: &str,
        limit: Option<usize>,
    ) -> Result<Vec<(String, Value)>, StoreError> {
        validate_namespace(namespace)?;
        let hits = self
            .backend
            .read()
            .prefix_scan(&namespace_prefix(namespace), limit)?;
        hits.into_iter()
            .filter_map(|(raw_key, raw_value)| {
                decode_key(namespace, &raw_key).map(|key| (key, raw_value))
            })
            .map(|(key, raw_value)| Ok((key, decode_value(namespace, &raw_value)?)))
            .collect()
    }

    async fn keys(&self, namespace: &str) -> Result<Vec<String>, StoreError> {
        validate_namespace(namespace)?;
        let raw = self.backend.read().prefix_keys(&namespace_prefix(namespace))?;
        Ok(raw
            .iter()
            .filter_map(|raw_key| decode_key(namespace, raw_key))
            .collect())
    }
}

/// Typed view over a single namespace.
#[derive(Clone)]
pub struct Sublevel {
    store: Arc<dyn CorrelationStore>,
    namespace: &'static str,
}

impl Sublevel {
    /// View `namespace` of `store`.
    pub fn new(store: Arc<dyn CorrelationStore>, namespace: &'static str) -> Self {
        Self { store, namespace }
    }

    /// Namespace name.
    pub fn namespace(&self) -> &'static str {
        self.namespace
    }

    /// Read and decode an entry.
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StoreError> {
        match self.store.get(self.namespace, key).await? {
            Some(value) => serde_json::from_value(value)
                .map(Some)
                .map_err(|e| StoreError::codec(self.namespace, e)),
            None => Ok(None),
        }
    }

    /// Read an entry without decoding it.
    pub async fn get_raw(&self, key: &str) -> Result<Option<Value>, StoreError> {
        self.store.get(self.namespace, key).await
    }

    /// Whether an entry exists.
    pub async fn contains(&self, key: &str) -> Result<bool, StoreError> {
        Ok(self.get_raw(key).await?.is_some())
    }

    /// Batch op writing `value` under `key`.
    pub fn put_op<T: Serialize + ?Sized>(
        &self,
        key: &str,
        value: &T,
    ) -> Result<StoreOp, StoreError> {
        Ok(StoreOp::put(self.namespace, key, self.to_value(value)?))
    }

    /// Batch op removing `key`.
    pub fn delete_op(&self, key: &str) -> StoreOp {
        StoreOp::delete(self.namespace, key)
    }

    /// All keys, in order.
    pub async fn keys(&self) -> Result<Vec<String>, StoreError> {
        self.store.keys(self.namespace).await
    }

    /// Number of entries.
    pub async fn len(&self) -> Result<usize, StoreError> {
        Ok(self.keys().await?.len())
    }

    fn to_value<T: Serialize + ?Sized>(&self, value: &T) -> Result<Value, StoreError> {
        serde_json::to_value(value).map_err(|e| StoreError::codec(self.namespace, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::KVStoreError;
    use crate::ports::ScanResult;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Pending {
        commitment: String,
        block: u64,
    }

    fn store() -> Arc<dyn CorrelationStore> {
        LevelStore::in_memory().into_shared()
    }

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = store();

        store.put("ns", "k", json!({"a": 1})).await.unwrap();
        assert_eq!(store.get("ns", "k").await.unwrap(), Some(json!({"a": 1})));

        store.delete("ns", "k").await.unwrap();
        assert_eq!(store.get("ns", "k").await.unwrap(), None);

        // Idempotent
        store.delete("ns", "k").await.unwrap();
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let store = store();

        store.put("match:relay", "k", json!(1)).await.unwrap();
        store.put("match:relay:in", "k", json!(2)).await.unwrap();

        assert_eq!(store.get("match:relay", "k").await.unwrap(), Some(json!(1)));
        assert_eq!(store.entries("match:relay", None).await.unwrap().len(), 1);
        assert_eq!(store.keys("match:relay:in").await.unwrap(), vec!["k".to_string()]);
    }

    #[tokio::test]
    async fn test_entries_honour_limit() {
        let store = store();
        for i in 0..5 {
            store.put("janitor:tasks", &format!("{i:03}"), json!(i)).await.unwrap();
        }
        store.put("janitor:tasks:x", "000", json!("other")).await.unwrap();

        let head = store.entries("janitor:tasks", Some(2)).await.unwrap();
        assert_eq!(head, vec![("000".to_string(), json!(0)), ("001".to_string(), json!(1))]);
        assert_eq!(store.entries("janitor:tasks", None).await.unwrap().len(), 5);
        assert_eq!(store.keys("janitor:tasks").await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_keys_skip_value_decoding() {
        let store = LevelStore::new(InMemoryKVStore::new());
        store
            .backend
            .write()
            .put(&encode_key("match:outbound", "0xc1"), b"not json")
            .unwrap();
        let store = store.into_shared();

        assert!(store.entries("match:outbound", None).await.is_err());
        let level = Sublevel::new(store, "match:outbound");
        assert_eq!(level.keys().await.unwrap(), vec!["0xc1".to_string()]);
        assert_eq!(level.len().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_invalid_namespace_rejected() {
        let store = store();
        let err = store.put("a!b", "k", json!(1)).await.unwrap_err();
        assert_eq!(err, StoreError::InvalidNamespace("a!b".to_string()));
    }

    #[tokio::test]
    async fn test_batch_across_namespaces() {
        let store = store();
        store.put("inbound", "k", json!("pending")).await.unwrap();

        store
            .batch(vec![
                StoreOp::delete("inbound", "k"),
                StoreOp::put("retry", "k", json!("outbound")),
            ])
            .await
            .unwrap();

        assert_eq!(store.get("inbound", "k").await.unwrap(), None);
        assert_eq!(store.get("retry", "k").await.unwrap(), Some(json!("outbound")));
    }

    #[tokio::test]
    async fn test_batch_with_invalid_namespace_applies_nothing() {
        let store = store();

        let result = store
            .batch(vec![
                StoreOp::put("good", "k", json!(1)),
                StoreOp::put("", "k", json!(2)),
            ])
            .await;

        assert!(result.is_err());
        assert_eq!(store.get("good", "k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_sublevel_typed_access() {
        let store = store();
        let level = Sublevel::new(Arc::clone(&store), "match:outbound");
        let entry = Pending {
            commitment: "0xc1".into(),
            block: 100,
        };

        store.batch(vec![level.put_op("0xc1", &entry).unwrap()]).await.unwrap();
        assert!(level.contains("0xc1").await.unwrap());
        assert_eq!(level.get::<Pending>("0xc1").await.unwrap(), Some(entry));
        assert_eq!(level.keys().await.unwrap(), vec!["0xc1".to_string()]);

        store.batch(vec![level.delete_op("0xc1")]).await.unwrap();
        assert_eq!(level.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sublevel_decode_mismatch_is_codec_error() {
        let store = store();
        store.put("ns", "k", json!("not a struct")).await.unwrap();

        let level = Sublevel::new(store, "ns");
        let err = level.get::<Pending>("k").await.unwrap_err();
        assert!(matches!(err, StoreError::Codec { .. }));
    }

    struct FailingKV;

    impl KeyValueStore for FailingKV {
        fn get(&self, _key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
            Err(KVStoreError::IOError {
                message: "offline".into(),
            })
        }
        fn put(&mut self, _key: &[u8], _value: &[u8]) -> Result<(), KVStoreError> {
            Err(KVStoreError::IOError {
                message: "offline".into(),
            })
        }
        fn delete(&mut self, _key: &[u8]) -> Result<(), KVStoreError> {
            Ok(())
        }
        fn atomic_batch_write(&mut self, _ops: Vec<BatchOperation>) -> Result<(), KVStoreError> {
            Err(KVStoreError::IOError {
                message: "offline".into(),
            })
        }
        fn prefix_scan(
            &self,
            _prefix: &[u8],
            _limit: Option<usize>,
        ) -> Result<ScanResult, KVStoreError> {
            Ok(Vec::new())
        }
        fn prefix_keys(&self, _prefix: &[u8]) -> Result<Vec<Vec<u8>>, KVStoreError> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_backend_errors_propagate() {
        let store = LevelStore::new(FailingKV).into_shared();

        assert!(matches!(
            store.get("ns", "k").await,
            Err(StoreError::Backend(KVStoreError::IOError { .. }))
        ));
        assert!(store.put("ns", "k", json!(1)).await.is_err());
        assert!(store.batch(vec![StoreOp::delete("ns", "k")]).await.is_err());
    }
}
