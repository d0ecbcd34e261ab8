//! Edge server configuration.

use serde::{Deserialize, Serialize};

/// Edge server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeConfig {
    /// Address to listen on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// `message` field of the API stub.
    #[serde(default = "default_api_message")]
    pub api_message: String,
}

fn default_bind_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_api_message() -> String {
    "Hello from the edge!".to_string()
}

impl Default for EdgeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            api_message: default_api_message(),
        }
    }
}

impl EdgeConfig {
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            ..Default::default()
        }
    }

    pub fn with_api_message(mut self, message: impl Into<String>) -> Self {
        self.api_message = message.into();
        self
    }
}
