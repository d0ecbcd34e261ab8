//! Fetch interception policy.
//!
//! | Class      | Strategy                                            |
//! |------------|-----------------------------------------------------|
//! | Navigation | network, then cached copy, then offline page        |
//! | API        | network (store 2xx), then cached copy, then offline JSON |
//! | Asset      | cache, then network (store)                         |
//! | Non-GET    | network only, never cached                          |

use crate::classify::{RequestClass, classify};
use crate::config::WorkerConfig;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tether_core::events::{FetchOutcome, FetchStrategy, ResponseSource};
use tether_core::ports::{Cache, CacheStorage, Network};
use tether_core::{Request, RequestKey, Response, Result};
use tracing::{debug, warn};

/// Placeholder body returned for API requests that cannot be served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OfflinePayload {
    pub message: String,
    pub cached: bool,
    pub online: bool,
    pub timestamp: DateTime<Utc>,
}

impl OfflinePayload {
    pub fn now() -> Self {
        Self {
            message: "You are offline. This is cached data.".to_string(),
            cached: true,
            online: false,
            timestamp: Utc::now(),
        }
    }
}

/// Resolves intercepted requests against the cache store and the network.
pub struct FetchPolicy {
    config: Arc<WorkerConfig>,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
}

impl FetchPolicy {
    pub fn new(
        config: Arc<WorkerConfig>,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> Self {
        Self {
            config,
            storage,
            network,
        }
    }

    /// Resolve one request.
    ///
    /// Errors only surface for pass-through requests and for assets that are
    /// neither cached nor reachable; navigation and API requests always
    /// produce a response.
    pub async fn handle(&self, request: &Request) -> Result<FetchOutcome> {
        let class = classify(&self.config, request);
        debug!(url = %request.url, method = %request.method, class = %class, "Intercepted fetch");

        match class {
            RequestClass::Passthrough => self.passthrough(request).await,
            RequestClass::Navigation => self.navigation(request).await,
            RequestClass::Api => self.api(request).await,
            RequestClass::Asset => self.asset(request).await,
        }
    }

    /// Hand the request to the network without touching the cache.
    pub async fn passthrough(&self, request: &Request) -> Result<FetchOutcome> {
        let response = self.network.fetch(request).await?;
        Ok(FetchOutcome {
            strategy: FetchStrategy::Passthrough,
            source: ResponseSource::Network,
            response,
        })
    }

    async fn navigation(&self, request: &Request) -> Result<FetchOutcome> {
        let strategy = FetchStrategy::NetworkFirst;
        let key = request.key();

        match self.network.fetch(request).await {
            Ok(response) => {
                self.store(&key, &response).await;
                return Ok(network_outcome(strategy, response));
            }
            Err(e) => warn!(url = %request.url, error = %e, "Navigation fetch failed, falling back to cache"),
        }

        if let Some(cached) = self.lookup(&key).await {
            return Ok(FetchOutcome {
                strategy,
                source: ResponseSource::Cache,
                response: cached,
            });
        }

        let offline_key = self.config.offline_page_key()?;
        if let Some(offline) = self.lookup(&offline_key).await {
            return Ok(FetchOutcome {
                strategy,
                source: ResponseSource::OfflinePage,
                response: offline,
            });
        }

        warn!(url = %request.url, "Offline page not cached");
        Ok(FetchOutcome {
            strategy,
            source: ResponseSource::Synthesized,
            response: Response::new(503, "Offline").with_header("content-type", "text/plain"),
        })
    }

    async fn api(&self, request: &Request) -> Result<FetchOutcome> {
        let strategy = FetchStrategy::NetworkFirstJson;
        let key = request.key();

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.ok() {
                    self.store(&key, &response).await;
                } else {
                    debug!(url = %request.url, status = response.status, "Not caching unsuccessful API response");
                }
                return Ok(network_outcome(strategy, response));
            }
            Err(e) => warn!(url = %request.url, error = %e, "API fetch failed, falling back to cache"),
        }

        if let Some(cached) = self.lookup(&key).await {
            return Ok(FetchOutcome {
                strategy,
                source: ResponseSource::Cache,
                response: cached,
            });
        }

        Ok(FetchOutcome {
            strategy,
            source: ResponseSource::Synthesized,
            response: Response::json(200, &OfflinePayload::now())?,
        })
    }

    async fn asset(&self, request: &Request) -> Result<FetchOutcome> {
        let strategy = FetchStrategy::CacheFirst;
        let key = request.key();

        if let Some(cached) = self.lookup(&key).await {
            return Ok(FetchOutcome {
                strategy,
                source: ResponseSource::Cache,
                response: cached,
            });
        }

        let response = self.network.fetch(request).await?;
        self.store(&key, &response).await;
        Ok(network_outcome(strategy, response))
    }

    async fn cache(&self) -> Result<Arc<dyn Cache>> {
        self.storage.open(&self.config.cache_name).await
    }

    /// Cache read where any store failure counts as a miss.
    async fn lookup(&self, key: &RequestKey) -> Option<Response> {
        let result = match self.cache().await {
            Ok(cache) => cache.match_key(key).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(hit) => hit,
            Err(e) => {
                warn!(key = %key, error = %e, "Cache lookup failed");
                None
            }
        }
    }

    /// Store a copy of the response; the original still goes to the page if this fails.
    async fn store(&self, key: &RequestKey, response: &Response) {
        let result = match self.cache().await {
            Ok(cache) => cache.put(key.clone(), response.clone()).await,
            Err(e) => Err(e),
        };
        if let Err(e) = result {
            warn!(key = %key, error = %e, "Failed to cache response");
        }
    }
}

fn network_outcome(strategy: FetchStrategy, response: Response) -> FetchOutcome {
    FetchOutcome {
        strategy,
        source: ResponseSource::Network,
        response,
    }
}
