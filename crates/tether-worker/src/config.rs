//! Worker configuration.

use serde::{Deserialize, Serialize};
use tether_core::{CacheGeneration, Error, RequestKey, Result};
use url::Url;

/// Immutable worker-scoped configuration, built once at startup and shared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Current cache generation. Bump it to roll out a new shell.
    #[serde(default)]
    pub cache_name: CacheGeneration,
    /// Origin the worker is scoped to; relative paths resolve against it.
    #[serde(default = "default_origin")]
    pub origin: Url,
    /// Shell URLs written to the cache on install.
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,
    /// Page served when a navigation fails and nothing is cached for it.
    #[serde(default = "default_offline_page")]
    pub offline_page: String,
    /// Path prefix identifying API requests.
    #[serde(default = "default_api_prefix")]
    pub api_prefix: String,
    /// Activate straight after install instead of waiting for `SKIP_WAITING`.
    #[serde(default = "default_skip_waiting")]
    pub skip_waiting_on_install: bool,
}

fn default_origin() -> Url {
    Url::parse("http://localhost:8080/").expect("static origin is valid")
}

fn default_offline_page() -> String {
    "/offline.html".to_string()
}

fn default_precache() -> Vec<String> {
    vec!["/".to_string(), default_offline_page()]
}

fn default_api_prefix() -> String {
    "/api/".to_string()
}

fn default_skip_waiting() -> bool {
    true
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            cache_name: CacheGeneration::default(),
            origin: default_origin(),
            precache: default_precache(),
            offline_page: default_offline_page(),
            api_prefix: default_api_prefix(),
            skip_waiting_on_install: default_skip_waiting(),
        }
    }
}

impl WorkerConfig {
    /// Create a config for the given origin with default paths.
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            ..Default::default()
        }
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Set the cache generation.
    pub fn with_cache_name(mut self, name: CacheGeneration) -> Self {
        self.cache_name = name;
        self
    }

    /// Replace the precache list.
    pub fn with_precache(mut self, urls: Vec<String>) -> Self {
        self.precache = urls;
        self
    }

    /// Set the API path prefix.
    pub fn with_api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Enable or disable immediate activation after install.
    pub fn with_skip_waiting(mut self, enable: bool) -> Self {
        self.skip_waiting_on_install = enable;
        self
    }

    /// Resolve a path or absolute URL against the origin.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        Ok(self.origin.join(path)?)
    }

    /// Cache key of the offline fallback page.
    pub fn offline_page_key(&self) -> Result<RequestKey> {
        Ok(RequestKey::get(self.resolve(&self.offline_page)?))
    }

    /// Resolved precache list.
    pub fn precache_urls(&self) -> Result<Vec<Url>> {
        self.precache.iter().map(|p| self.resolve(p)).collect()
    }

    /// Whether a URL falls under the API prefix.
    pub fn is_api(&self, url: &Url) -> bool {
        url.path().starts_with(&self.api_prefix)
    }
}
