//! Cache generation names.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The generation a fresh deployment starts with.
pub const DEFAULT_GENERATION: &str = "offline-demo-v1";

/// Name of one cache store generation, e.g. `offline-demo-v1`.
///
/// At most one generation is current; activation deletes every other one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CacheGeneration(String);

impl CacheGeneration {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::InvalidCacheName("cache name is empty".to_string()));
        }
        if name.contains(['/', '\\']) || name.chars().any(char::is_control) {
            return Err(Error::InvalidCacheName(name));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CacheGeneration {
    fn default() -> Self {
        Self(DEFAULT_GENERATION.to_string())
    }
}

impl fmt::Display for CacheGeneration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for CacheGeneration {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for CacheGeneration {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<CacheGeneration> for String {
    fn from(value: CacheGeneration) -> Self {
        value.0
    }
}
