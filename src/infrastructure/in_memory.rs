//! In-memory key-value store.
//!
//! Keeps raw strings in an ordered map, the same shape Redis string keys
//! have, so format handling behaves identically across backends. Suitable
//! for tests and local development.
//!
//! # Features
//!
//! - Thread-safe with `Arc<RwLock<...>>`
//! - Enforces the connect/close lifecycle
//! - `get_all_data` returns entries in key order

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde_json::Value;
use tokio::sync::RwLock;

use super::store::{
    KeyValueStore, StoreEntry, StoreError, StoreFuture, ValueFormat, decode_lenient,
};

/// Type name reported for every entry.
const STRING_KIND: &str = "string";

/// In-memory implementation of `KeyValueStore`.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    entries: Arc<RwLock<BTreeMap<String, String>>>,
    connected: Arc<AtomicBool>,
}

impl InMemoryStore {
    /// Creates a new empty, not yet connected store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true between `connect` and `close`.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    fn ensure_connected(connected: &AtomicBool) -> Result<(), StoreError> {
        if connected.load(Ordering::Acquire) {
            Ok(())
        } else {
            Err(StoreError::NotConnected)
        }
    }
}

#[allow(clippy::significant_drop_tightening)]
impl KeyValueStore for InMemoryStore {
    fn connect(&self) -> StoreFuture<()> {
        let connected = Arc::clone(&self.connected);
        Box::pin(async move {
            connected.store(true, Ordering::Release);
            Ok(())
        })
    }

    fn get(&self, key: &str, format: ValueFormat) -> StoreFuture<Option<Value>> {
        let entries = Arc::clone(&self.entries);
        let connected = Arc::clone(&self.connected);
        let key = key.to_string();
        Box::pin(async move {
            Self::ensure_connected(&connected)?;
            let raw = entries.read().await.get(&key).cloned();
            raw.map(|raw| format.decode(raw)).transpose()
        })
    }

    fn set(&self, key: &str, value: &Value, format: ValueFormat) -> StoreFuture<()> {
        let entries = Arc::clone(&self.entries);
        let connected = Arc::clone(&self.connected);
        let key = key.to_string();
        let encoded = format.encode(value);
        Box::pin(async move {
            Self::ensure_connected(&connected)?;
            let raw = encoded?;
            entries.write().await.insert(key, raw);
            Ok(())
        })
    }

    fn del(&self, key: &str) -> StoreFuture<u64> {
        let entries = Arc::clone(&self.entries);
        let connected = Arc::clone(&self.connected);
        let key = key.to_string();
        Box::pin(async move {
            Self::ensure_connected(&connected)?;
            let removed = entries.write().await.remove(&key);
            Ok(u64::from(removed.is_some()))
        })
    }

    fn get_all_data(&self) -> StoreFuture<Vec<StoreEntry>> {
        let entries = Arc::clone(&self.entries);
        let connected = Arc::clone(&self.connected);
        Box::pin(async move {
            Self::ensure_connected(&connected)?;
            let guard = entries.read().await;
            Ok(guard
                .iter()
                .map(|(key, raw)| {
                    StoreEntry::new(key.clone(), decode_lenient(raw.clone()), STRING_KIND)
                })
                .collect())
        })
    }

    fn close(&self) -> StoreFuture<()> {
        let connected = Arc::clone(&self.connected);
        Box::pin(async move {
            connected.store(false, Ordering::Release);
            Ok(())
        })
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn store() -> InMemoryStore {
        InMemoryStore::new()
    }

    async fn connected(store: InMemoryStore) -> InMemoryStore {
        store.connect().await.unwrap();
        store
    }

    #[rstest]
    #[tokio::test]
    async fn test_operations_require_connect(store: InMemoryStore) {
        let result = store.get("todos:a", ValueFormat::Json).await;
        assert_eq!(result, Err(StoreError::NotConnected));

        let result = store.set("todos:a", &json!({}), ValueFormat::Json).await;
        assert_eq!(result, Err(StoreError::NotConnected));
    }

    #[rstest]
    #[tokio::test]
    async fn test_close_disconnects(store: InMemoryStore) {
        let store = connected(store).await;
        assert!(store.is_connected());

        store.close().await.unwrap();

        assert!(!store.is_connected());
        assert_eq!(store.del("todos:a").await, Err(StoreError::NotConnected));
    }

    #[rstest]
    #[tokio::test]
    async fn test_set_then_get(store: InMemoryStore) {
        let store = connected(store).await;
        let value = json!({"title": "a", "completed": false});

        store.set("todos:a1", &value, ValueFormat::Json).await.unwrap();

        let found = store.get("todos:a1", ValueFormat::Json).await.unwrap();
        assert_eq!(found, Some(value));
    }

    #[rstest]
    #[tokio::test]
    async fn test_get_missing_is_none(store: InMemoryStore) {
        let store = connected(store).await;
        assert_eq!(store.get("todos:none", ValueFormat::Json).await, Ok(None));
    }

    #[rstest]
    #[tokio::test]
    async fn test_del_reports_count(store: InMemoryStore) {
        let store = connected(store).await;
        store
            .set("todos:a1", &json!({"title": "a"}), ValueFormat::Json)
            .await
            .unwrap();

        assert_eq!(store.del("todos:a1").await, Ok(1));
        assert_eq!(store.del("todos:a1").await, Ok(0));
    }

    #[rstest]
    #[tokio::test]
    async fn test_get_all_data_decodes_each_entry(store: InMemoryStore) {
        let store = connected(store).await;
        store
            .set("todos:b", &json!({"title": "b"}), ValueFormat::Json)
            .await
            .unwrap();
        store
            .set("greeting", &json!("hello"), ValueFormat::Text)
            .await
            .unwrap();

        let entries = store.get_all_data().await.unwrap();

        assert_eq!(
            entries,
            vec![
                StoreEntry::new("greeting", json!("hello"), "string"),
                StoreEntry::new("todos:b", json!({"title": "b"}), "string"),
            ]
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_clones_share_entries(store: InMemoryStore) {
        let store = connected(store).await;
        let clone = store.clone();

        clone
            .set("todos:x", &json!({"title": "x"}), ValueFormat::Json)
            .await
            .unwrap();

        assert!(store.get("todos:x", ValueFormat::Json).await.unwrap().is_some());
    }
}
