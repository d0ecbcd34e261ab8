//! Test helper functions and utilities.

use async_trait::async_trait;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use tether_core::ports::Network;
use tether_core::{Error, Request, RequestKey, Response, Result};
use tether_edge::{AppState, EdgeConfig, build_app};
use tokio::net::TcpListener;

/// Start the edge server for testing and return its address.
pub async fn start_test_server() -> anyhow::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
    let app = build_app(Arc::new(AppState::new(EdgeConfig::default())));
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let handle = tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok((addr, handle))
}

/// A network whose responses are scripted per path and whose reachability
/// can be switched off. Every fetch attempt is recorded.
#[derive(Default)]
pub struct ScriptedNetwork {
    routes: Mutex<HashMap<String, Response>>,
    offline: AtomicBool,
    calls: Mutex<Vec<RequestKey>>,
}

impl ScriptedNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`ScriptedNetwork::set`].
    pub fn with_route(self, path: &str, response: Response) -> Self {
        self.set(path, response);
        self
    }

    /// Serve `response` for `path` from now on. Unscripted paths get a 404.
    pub fn set(&self, path: &str, response: Response) {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), response);
    }

    pub fn set_online(&self, online: bool) {
        self.offline.store(!online, Ordering::SeqCst);
    }

    /// Every fetch attempt so far, reachable or not.
    pub fn calls(&self) -> Vec<RequestKey> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, path: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|k| k.url.path() == path)
            .count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response> {
        self.calls.lock().unwrap().push(request.key());
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Network(format!("offline: {}", request.url)));
        }
        let response = self
            .routes
            .lock()
            .unwrap()
            .get(request.url.path())
            .cloned()
            .unwrap_or_else(|| {
                Response::new(404, "Not Found").with_header("content-type", "text/plain")
            });
        Ok(response)
    }
}
