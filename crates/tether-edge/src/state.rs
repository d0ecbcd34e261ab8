//! Application state shared across handlers.

use crate::config::EdgeConfig;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: EdgeConfig,
}

impl AppState {
    pub fn new(config: EdgeConfig) -> Self {
        Self { config }
    }
}
