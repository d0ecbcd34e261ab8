//! Registration: which worker controls the scope and which one is waiting.

use crate::worker::ServiceWorker;
use std::sync::Arc;
use tether_core::events::{EventOutcome, FetchOutcome, FetchStrategy, ResponseSource, WorkerEvent};
use tether_core::messages::ClientMessage;
use tether_core::ports::Network;
use tether_core::{Request, Result, WorkerState};
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Holds the active worker and at most one waiting worker for a scope.
pub struct Registration {
    network: Arc<dyn Network>,
    active: RwLock<Option<Arc<ServiceWorker>>>,
    waiting: RwLock<Option<Arc<ServiceWorker>>>,
}

impl Registration {
    /// `network` serves requests while no worker is active.
    pub fn new(network: Arc<dyn Network>) -> Self {
        Self {
            network,
            active: RwLock::new(None),
            waiting: RwLock::new(None),
        }
    }

    pub async fn active(&self) -> Option<Arc<ServiceWorker>> {
        self.active.read().await.clone()
    }

    pub async fn waiting(&self) -> Option<Arc<ServiceWorker>> {
        self.waiting.read().await.clone()
    }

    /// Install a new worker. A failed install leaves the current active
    /// worker in control.
    pub async fn update(&self, worker: Arc<ServiceWorker>) -> Result<WorkerState> {
        info!(worker_id = worker.id(), cache = %worker.config().cache_name, "Installing new worker");
        let outcome = match worker.handle(WorkerEvent::Install).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(worker_id = worker.id(), error = %e, "New worker failed to install; keeping current worker");
                return Err(e);
            }
        };

        let state = outcome.state().unwrap_or_else(|| worker.state());
        self.settle(worker, state).await;
        Ok(state)
    }

    /// Deliver a page message to the waiting worker, or the active one if none waits.
    pub async fn post_message(&self, message: ClientMessage) -> Result<Option<WorkerState>> {
        if let Some(waiting) = self.waiting().await {
            let state = match waiting.handle(WorkerEvent::Message(message)).await? {
                EventOutcome::Message(state) => state,
                _ => waiting.state(),
            };
            if state == WorkerState::Activated {
                self.settle(waiting, state).await;
            }
            return Ok(Some(state));
        }

        match self.active().await {
            Some(active) => Ok(active.handle(WorkerEvent::Message(message)).await?.state()),
            None => Ok(None),
        }
    }

    /// Route a page request through the active worker, or straight to the network.
    pub async fn fetch(&self, request: Request) -> Result<FetchOutcome> {
        match self.active().await {
            Some(active) => match active.handle(WorkerEvent::Fetch(request)).await? {
                EventOutcome::Fetch(outcome) => Ok(outcome),
                other => Err(tether_core::Error::Internal(format!(
                    "Unexpected fetch outcome: {:?}",
                    other
                ))),
            },
            None => Ok(FetchOutcome {
                strategy: FetchStrategy::Passthrough,
                source: ResponseSource::Network,
                response: self.network.fetch(&request).await?,
            }),
        }
    }

    async fn settle(&self, worker: Arc<ServiceWorker>, state: WorkerState) {
        match state {
            WorkerState::Activated => {
                let previous = self.active.write().await.replace(Arc::clone(&worker));
                if let Some(previous) = previous.filter(|p| p.id() != worker.id()) {
                    previous.retire();
                }
                let waiting = self.waiting.write().await.take();
                if let Some(waiting) = waiting.filter(|w| w.id() != worker.id()) {
                    waiting.retire();
                }
                info!(worker_id = worker.id(), "Worker now controls the scope");
            }
            WorkerState::Installed => {
                if let Some(stale) = self.waiting.write().await.replace(worker) {
                    stale.retire();
                }
            }
            _ => {}
        }
    }
}
