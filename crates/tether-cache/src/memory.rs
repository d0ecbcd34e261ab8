//! In-memory cache store.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tether_core::ports::{Cache, CacheStorage};
use tether_core::{CacheGeneration, Error, RequestKey, Response, Result};
use tokio::sync::RwLock;
use tracing::debug;

/// Cache store held entirely in process memory.
#[derive(Default)]
pub struct MemoryCacheStorage {
    caches: RwLock<BTreeMap<CacheGeneration, Arc<MemoryCache>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CacheStorage for MemoryCacheStorage {
    async fn open(&self, name: &CacheGeneration) -> Result<Arc<dyn Cache>> {
        let mut caches = self.caches.write().await;
        let cache = caches
            .entry(name.clone())
            .or_insert_with(|| {
                debug!(cache = %name, "Creating cache generation");
                Arc::new(MemoryCache::new(name.clone()))
            })
            .clone();
        Ok(cache)
    }

    async fn has(&self, name: &CacheGeneration) -> Result<bool> {
        Ok(self.caches.read().await.contains_key(name))
    }

    async fn delete(&self, name: &CacheGeneration) -> Result<bool> {
        Ok(self.caches.write().await.remove(name).is_some())
    }

    async fn keys(&self) -> Result<Vec<CacheGeneration>> {
        Ok(self.caches.read().await.keys().cloned().collect())
    }
}

/// One in-memory generation.
pub struct MemoryCache {
    name: CacheGeneration,
    entries: RwLock<HashMap<RequestKey, Response>>,
}

impl MemoryCache {
    fn new(name: CacheGeneration) -> Self {
        Self {
            name,
            entries: RwLock::new(HashMap::new()),
        }
    }
}

fn ensure_cacheable(key: &RequestKey) -> Result<()> {
    if key.method.is_cacheable() {
        Ok(())
    } else {
        Err(Error::InvalidRequest(format!(
            "Only GET requests can be cached: {}",
            key
        )))
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn match_key(&self, key: &RequestKey) -> Result<Option<Response>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: RequestKey, response: Response) -> Result<()> {
        ensure_cacheable(&key)?;
        debug!(cache = %self.name, key = %key, status = response.status, "Storing entry");
        self.entries.write().await.insert(key, response);
        Ok(())
    }

    async fn add_all(&self, entries: Vec<(RequestKey, Response)>) -> Result<()> {
        for (key, _) in &entries {
            ensure_cacheable(key)?;
        }
        let mut stored = self.entries.write().await;
        for (key, response) in entries {
            stored.insert(key, response);
        }
        Ok(())
    }

    async fn delete(&self, key: &RequestKey) -> Result<bool> {
        Ok(self.entries.write().await.remove(key).is_some())
    }

    async fn keys(&self) -> Result<Vec<RequestKey>> {
        let mut keys: Vec<RequestKey> = self.entries.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
