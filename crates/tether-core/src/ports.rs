//! Port traits (hexagonal architecture).
//!
//! These traits define the interfaces between the worker engine and the
//! host environment: the cache store, the network and the controlled pages.

use crate::generation::CacheGeneration;
use crate::http::{Request, RequestKey, Response};
use crate::messages::WorkerMessage;
use crate::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Registry of named cache generations.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Open a generation, creating it if it does not exist.
    async fn open(&self, name: &CacheGeneration) -> Result<Arc<dyn Cache>>;

    /// Check whether a generation exists.
    async fn has(&self, name: &CacheGeneration) -> Result<bool>;

    /// Delete a generation and all of its entries. Returns whether it existed.
    async fn delete(&self, name: &CacheGeneration) -> Result<bool>;

    /// Enumerate existing generation names.
    async fn keys(&self) -> Result<Vec<CacheGeneration>>;
}

/// One cache generation: request key to response snapshot.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Look up a stored response.
    async fn match_key(&self, key: &RequestKey) -> Result<Option<Response>>;

    /// Store a response, replacing any previous entry (last write wins).
    async fn put(&self, key: RequestKey, response: Response) -> Result<()>;

    /// Store every entry or none of them.
    async fn add_all(&self, entries: Vec<(RequestKey, Response)>) -> Result<()>;

    /// Remove an entry. Returns whether it existed.
    async fn delete(&self, key: &RequestKey) -> Result<bool>;

    /// List stored keys.
    async fn keys(&self) -> Result<Vec<RequestKey>>;
}

/// Network access. Any failure to obtain a response is `Error::Network`;
/// an HTTP error status is still a successful fetch.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response>;
}

/// Pages within the worker's scope.
#[async_trait]
pub trait Clients: Send + Sync {
    /// Take control of every open page without a reload.
    async fn claim(&self) -> Result<usize>;

    /// Post a message to every controlled page.
    async fn post_message(&self, message: WorkerMessage) -> Result<usize>;

    /// Number of pages currently controlled.
    async fn controlled(&self) -> usize;
}
