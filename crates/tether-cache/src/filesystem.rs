//! Filesystem-backed cache store.
//!
//! Layout: `<root>/<hex of generation>/<sha256 of key>.json`, one
//! [`StoredEntry`] per file. Each write goes to its own uniquely named
//! temporary file which is then renamed into place.

use crate::keys::{entry_file_name, generation_dir_name, generation_from_dir_name};
use crate::types::StoredEntry;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tether_core::ports::{Cache, CacheStorage};
use tether_core::{CacheGeneration, Error, RequestKey, Response, Result};
use tracing::{debug, warn};
use uuid::Uuid;

const STAGED_SUFFIX: &str = ".staged";

/// Cache store persisted under a root directory.
pub struct FilesystemCacheStorage {
    root_dir: PathBuf,
}

impl FilesystemCacheStorage {
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    fn generation_dir(&self, name: &CacheGeneration) -> PathBuf {
        self.root_dir.join(generation_dir_name(name))
    }
}

#[async_trait]
impl CacheStorage for FilesystemCacheStorage {
    async fn open(&self, name: &CacheGeneration) -> Result<Arc<dyn Cache>> {
        let dir = self.generation_dir(name);
        tokio::fs::create_dir_all(&dir).await.map_err(|e| {
            Error::CacheStorage(format!("Failed to create cache dir {}: {}", dir.display(), e))
        })?;
        Ok(Arc::new(FilesystemCache {
            name: name.clone(),
            dir,
        }))
    }

    async fn has(&self, name: &CacheGeneration) -> Result<bool> {
        Ok(self.generation_dir(name).is_dir())
    }

    async fn delete(&self, name: &CacheGeneration) -> Result<bool> {
        let dir = self.generation_dir(name);
        if !dir.is_dir() {
            return Ok(false);
        }
        tokio::fs::remove_dir_all(&dir).await.map_err(|e| {
            Error::CacheStorage(format!("Failed to delete cache {}: {}", name, e))
        })?;
        debug!(cache = %name, "Deleted cache generation");
        Ok(true)
    }

    async fn keys(&self) -> Result<Vec<CacheGeneration>> {
        if !self.root_dir.exists() {
            return Ok(vec![]);
        }

        let mut names = vec![];
        let mut read_dir = tokio::fs::read_dir(&self.root_dir)
            .await
            .map_err(|e| Error::CacheStorage(format!("Failed to read cache root: {}", e)))?;

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| Error::CacheStorage(format!("Failed to read entry: {}", e)))?
        {
            if !entry.path().is_dir() {
                continue;
            }
            let dir_name = entry.file_name().to_string_lossy().to_string();
            match generation_from_dir_name(&dir_name) {
                Some(generation) => names.push(generation),
                None => warn!(dir = %dir_name, "Skipping unrecognised cache dir"),
            }
        }

        names.sort();
        Ok(names)
    }
}

/// One generation directory.
pub struct FilesystemCache {
    name: CacheGeneration,
    dir: PathBuf,
}

impl FilesystemCache {
    fn entry_path(&self, key: &RequestKey) -> PathBuf {
        self.dir.join(entry_file_name(key))
    }

    async fn write_staged(&self, key: &RequestKey, response: &Response) -> Result<PathBuf> {
        if !key.method.is_cacheable() {
            return Err(Error::InvalidRequest(format!(
                "Only GET requests can be cached: {}",
                key
            )));
        }
        let entry = StoredEntry::new(key.clone(), response);
        let json = serde_json::to_vec(&entry)?;
        let staged = self
            .dir
            .join(format!("{}.{}{}", entry_file_name(key), Uuid::new_v4(), STAGED_SUFFIX));
        tokio::fs::write(&staged, json)
            .await
            .map_err(|e| Error::CacheStorage(format!("Failed to write entry {}: {}", key, e)))?;
        Ok(staged)
    }

    async fn commit(&self, staged: &Path, key: &RequestKey) -> Result<()> {
        tokio::fs::rename(staged, self.entry_path(key))
            .await
            .map_err(|e| Error::CacheStorage(format!("Failed to commit entry {}: {}", key, e)))
    }

    async fn read_entry(path: &Path) -> Result<StoredEntry> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| Error::CacheStorage(format!("Failed to read entry: {}", e)))?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl Cache for FilesystemCache {
    async fn match_key(&self, key: &RequestKey) -> Result<Option<Response>> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(None);
        }
        let entry = Self::read_entry(&path).await?;
        Ok(Some(entry.to_response()?))
    }

    async fn put(&self, key: RequestKey, response: Response) -> Result<()> {
        let staged = self.write_staged(&key, &response).await?;
        self.commit(&staged, &key).await?;
        debug!(cache = %self.name, key = %key, status = response.status, "Stored entry");
        Ok(())
    }

    async fn add_all(&self, entries: Vec<(RequestKey, Response)>) -> Result<()> {
        let mut staged = Vec::with_capacity(entries.len());
        for (key, response) in &entries {
            match self.write_staged(key, response).await {
                Ok(path) => staged.push((path, key)),
                Err(e) => {
                    for (path, _) in &staged {
                        let _ = tokio::fs::remove_file(path).await;
                    }
                    return Err(e);
                }
            }
        }
        for (i, (path, key)) in staged.iter().enumerate() {
            if let Err(e) = self.commit(path, key).await {
                for (path, _) in &staged[i..] {
                    let _ = tokio::fs::remove_file(path).await;
                }
                for (_, key) in &staged[..i] {
                    let _ = tokio::fs::remove_file(self.entry_path(key)).await;
                }
                warn!(cache = %self.name, error = %e, "Rolled back partial add_all");
                return Err(e);
            }
        }
        debug!(cache = %self.name, count = staged.len(), "Stored entries");
        Ok(())
    }

    async fn delete(&self, key: &RequestKey) -> Result<bool> {
        let path = self.entry_path(key);
        if !path.exists() {
            return Ok(false);
        }
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| Error::CacheStorage(format!("Failed to delete entry {}: {}", key, e)))?;
        Ok(true)
    }

    async fn keys(&self) -> Result<Vec<RequestKey>> {
        let mut keys = vec![];
        let mut read_dir = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| Error::CacheStorage(format!("Failed to read cache dir: {}", e)))?;

        while let Some(entry) = read_dir
            .next_entry()
            .await
            .map_err(|e| Error::CacheStorage(format!("Failed to read entry: {}", e)))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                keys.push(Self::read_entry(&path).await?.key);
            }
        }

        keys.sort();
        Ok(keys)
    }
}
