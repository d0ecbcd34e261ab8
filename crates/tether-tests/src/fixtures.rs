//! Test fixtures for workers and shell content.

use crate::helpers::ScriptedNetwork;
use chrono::{SecondsFormat, Utc};
use std::sync::Arc;
use tether_cache::MemoryCacheStorage;
use tether_core::events::{EventOutcome, FetchOutcome, WorkerEvent};
use tether_core::messages::ClientMessage;
use tether_core::{Method, Request, Response, Result, WorkerState};
use tether_worker::{ClientRegistry, ServiceWorker, WorkerConfig};

pub const INDEX_BODY: &str = "<html><body>index</body></html>";
pub const OFFLINE_BODY: &str = "<html><body>offline</body></html>";
pub const STYLE_BODY: &str = "body { color: black; }";

pub fn html(body: &str) -> Response {
    Response::new(200, body).with_header("content-type", "text/html; charset=utf-8")
}

/// An `/api/data` body the way the edge produces it.
pub fn api_response(message: &str) -> Response {
    let value = serde_json::json!({
        "message": message,
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "online": true,
    });
    Response::json(200, &value).expect("static JSON serializes")
}

/// Network serving the shell, one asset and the API stub.
pub fn shell_network() -> ScriptedNetwork {
    ScriptedNetwork::new()
        .with_route("/", html(INDEX_BODY))
        .with_route("/offline.html", html(OFFLINE_BODY))
        .with_route("/app.css", Response::new(200, STYLE_BODY).with_header("content-type", "text/css"))
        .with_route("/api/data", api_response("Hello from the edge!"))
}

/// A worker wired to in-memory collaborators the test can inspect.
pub struct TestWorker {
    pub worker: ServiceWorker,
    pub config: WorkerConfig,
    pub storage: Arc<MemoryCacheStorage>,
    pub network: Arc<ScriptedNetwork>,
    pub clients: Arc<ClientRegistry>,
}

impl TestWorker {
    /// A fresh, not yet installed worker over [`shell_network`].
    pub fn new(config: WorkerConfig) -> Self {
        Self::with_parts(
            config,
            Arc::new(MemoryCacheStorage::new()),
            Arc::new(shell_network()),
            Arc::new(ClientRegistry::new()),
        )
    }

    pub fn with_parts(
        config: WorkerConfig,
        storage: Arc<MemoryCacheStorage>,
        network: Arc<ScriptedNetwork>,
        clients: Arc<ClientRegistry>,
    ) -> Self {
        let worker = ServiceWorker::new(
            config.clone(),
            storage.clone(),
            network.clone(),
            clients.clone(),
        );
        Self {
            worker,
            config,
            storage,
            network,
            clients,
        }
    }

    /// Installed and activated with the default config; call log cleared.
    pub async fn activated() -> Self {
        let ctx = Self::new(WorkerConfig::default());
        let state = ctx.install().await.expect("install succeeds");
        assert_eq!(state, WorkerState::Activated);
        ctx.network.reset_calls();
        ctx
    }

    pub async fn install(&self) -> Result<WorkerState> {
        let outcome = self.worker.handle(WorkerEvent::Install).await?;
        Ok(outcome.state().unwrap_or_else(|| self.worker.state()))
    }

    pub async fn activate(&self) -> Result<WorkerState> {
        let outcome = self.worker.handle(WorkerEvent::Activate).await?;
        Ok(outcome.state().unwrap_or_else(|| self.worker.state()))
    }

    pub async fn skip_waiting(&self) -> Result<WorkerState> {
        let outcome = self
            .worker
            .handle(WorkerEvent::Message(ClientMessage::SkipWaiting))
            .await?;
        Ok(outcome.state().unwrap_or_else(|| self.worker.state()))
    }

    pub async fn fetch(&self, request: Request) -> Result<FetchOutcome> {
        match self.worker.handle(WorkerEvent::Fetch(request)).await? {
            EventOutcome::Fetch(outcome) => Ok(outcome),
            other => panic!("fetch produced {:?}", other),
        }
    }

    /// A subresource GET for `path`.
    pub async fn get(&self, path: &str) -> Result<FetchOutcome> {
        self.fetch(Request::get(self.url(path))).await
    }

    /// A full-page load of `path`.
    pub async fn navigate(&self, path: &str) -> Result<FetchOutcome> {
        self.fetch(Request::navigate(self.url(path))).await
    }

    pub async fn request(&self, method: Method, path: &str) -> Result<FetchOutcome> {
        self.fetch(Request::new(method, self.url(path))).await
    }

    pub fn url(&self, path: &str) -> url::Url {
        self.config.resolve(path).expect("test path resolves")
    }
}
