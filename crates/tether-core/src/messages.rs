//! Messages exchanged between pages and the worker.

use serde::{Deserialize, Serialize};

/// Page to worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    /// Promote a waiting worker to active immediately.
    SkipWaiting,
}

/// Worker to page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkerMessage {
    /// Declared for pages to listen on; no code path sends it.
    CacheUpdated,
}
