//! In-memory cache store.
//!
//! Used by tests and by hosts started without a database path. Contents live
//! only as long as the process.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use tokio::sync::RwLock;

use super::store::{CacheKey, CacheStore, CachedEntry};
use crate::Error;

type Namespace = HashMap<CacheKey, CachedEntry>;

/// Named caches held in a `BTreeMap` so listings come back sorted.
#[derive(Clone, Default)]
pub struct MemoryStore {
    caches: Arc<RwLock<BTreeMap<String, Namespace>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries across all namespaces.
    pub async fn len(&self) -> usize {
        self.caches.read().await.values().map(HashMap::len).sum()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait::async_trait]
impl CacheStore for MemoryStore {
    async fn open(&self, namespace: &str) -> Result<(), Error> {
        self.caches.write().await.entry(namespace.to_string()).or_default();
        Ok(())
    }

    async fn namespaces(&self, prefix: &str) -> Result<Vec<String>, Error> {
        let caches = self.caches.read().await;
        Ok(caches.keys().filter(|name| name.starts_with(prefix)).cloned().collect())
    }

    async fn delete_namespace(&self, namespace: &str) -> Result<bool, Error> {
        Ok(self.caches.write().await.remove(namespace).is_some())
    }

    async fn get(&self, namespace: &str, key: &CacheKey) -> Result<Option<CachedEntry>, Error> {
        let caches = self.caches.read().await;
        Ok(caches.get(namespace).and_then(|ns| ns.get(key)).cloned())
    }

    async fn put(&self, namespace: &str, entry: CachedEntry) -> Result<(), Error> {
        let mut caches = self.caches.write().await;
        caches
            .entry(namespace.to_string())
            .or_default()
            .insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn put_all(&self, namespace: &str, entries: Vec<CachedEntry>) -> Result<(), Error> {
        let mut caches = self.caches.write().await;
        let ns = caches.entry(namespace.to_string()).or_default();
        for entry in entries {
            ns.insert(entry.key.clone(), entry);
        }
        Ok(())
    }

    async fn delete(&self, namespace: &str, key: &CacheKey) -> Result<bool, Error> {
        let mut caches = self.caches.write().await;
        Ok(caches.get_mut(namespace).and_then(|ns| ns.remove(key)).is_some())
    }

    async fn keys(&self, namespace: &str) -> Result<Vec<CacheKey>, Error> {
        let caches = self.caches.read().await;
        let mut keys: Vec<CacheKey> = caches
            .get(namespace)
            .map(|ns| ns.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort_by(|a, b| a.url.cmp(&b.url).then_with(|| a.method.cmp(&b.method)));
        Ok(keys)
    }
}
