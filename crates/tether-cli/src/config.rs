//! CLI configuration management.

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tether_core::CacheGeneration;
use tether_worker::WorkerConfig;
use url::Url;

/// CLI configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Origin the worker fetches from.
    #[serde(default = "default_origin")]
    pub origin: String,
    /// Current cache generation.
    #[serde(default)]
    pub cache_name: CacheGeneration,
    /// Where the cache store lives. Defaults to the user cache directory.
    pub cache_dir: Option<PathBuf>,
    /// Edge server listen address.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

fn default_origin() -> String {
    "http://localhost:8080/".to_string()
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            cache_name: CacheGeneration::default(),
            cache_dir: None,
            bind_addr: default_bind_addr(),
        }
    }
}

impl CliConfig {
    /// Load configuration from file.
    pub fn load() -> anyhow::Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            Ok(serde_yaml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file.
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    fn project_dirs() -> anyhow::Result<directories::ProjectDirs> {
        directories::ProjectDirs::from("dev", "tether", "tether")
            .context("Could not determine config directory")
    }

    /// Get the configuration file path.
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.yaml"))
    }

    /// Cache store root.
    pub fn cache_dir(&self) -> anyhow::Result<PathBuf> {
        match &self.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::project_dirs()?.cache_dir().join("caches")),
        }
    }

    /// Worker configuration for the configured origin and generation.
    pub fn worker_config(&self, origin: Option<&str>) -> anyhow::Result<WorkerConfig> {
        let origin = origin.unwrap_or(&self.origin);
        let origin = Url::parse(origin).with_context(|| format!("Invalid origin: {}", origin))?;
        Ok(WorkerConfig::new(origin).with_cache_name(self.cache_name.clone()))
    }

    /// Set a configuration value.
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "origin" => {
                Url::parse(value).with_context(|| format!("Invalid origin: {}", value))?;
                self.origin = value.to_string();
            }
            "cache_name" => self.cache_name = CacheGeneration::new(value)?,
            "cache_dir" => self.cache_dir = Some(PathBuf::from(value)),
            "bind_addr" => self.bind_addr = value.to_string(),
            _ => bail!("Unknown config key: {}", key),
        }
        Ok(())
    }
}
