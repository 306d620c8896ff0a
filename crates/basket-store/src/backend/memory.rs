//! In-process key-value backend. Contents die with the process.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::KeyValueStore;
use crate::error::StoreResult;

/// `HashMap` behind an async `RwLock`.
#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a value, e.g. a snapshot left by an earlier run.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        MemoryKvStore {
            entries: RwLock::new(entries),
        }
    }

    /// Number of stored keys.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryKvStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_get_set_overwrite() {
        let store = MemoryKvStore::new();
        assert!(store.is_empty().await);
        assert_eq!(store.get("k").await.unwrap(), None);

        store.set("k", "one").await.unwrap();
        store.set("k", "two").await.unwrap();

        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("two"));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_seeded_entry() {
        let store = MemoryKvStore::with_entry("k", "v");
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("v"));
        assert_eq!(store.get("other").await.unwrap(), None);
    }
}
