//! On-disk entry format.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tether_core::{RequestKey, Response, Result};

/// A cached response as written by [`crate::FilesystemCacheStorage`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEntry {
    /// Request identity.
    pub key: RequestKey,
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    /// Base64-encoded body.
    pub body: String,
    /// When the entry was written.
    pub stored_at: DateTime<Utc>,
}

impl StoredEntry {
    pub fn new(key: RequestKey, response: &Response) -> Self {
        Self {
            key,
            status: response.status,
            status_text: response.status_text.clone(),
            headers: response.headers.clone(),
            body: STANDARD.encode(&response.body),
            stored_at: Utc::now(),
        }
    }

    pub fn to_response(&self) -> Result<Response> {
        let body = STANDARD.decode(&self.body).map_err(|e| {
            tether_core::Error::Serialization(format!("Invalid entry body for {}: {}", self.key, e))
        })?;
        Ok(Response {
            status: self.status,
            status_text: self.status_text.clone(),
            headers: self.headers.clone(),
            body,
        })
    }
}
