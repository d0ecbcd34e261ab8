//! The worker: one dispatch entry per event kind.

use crate::config::WorkerConfig;
use crate::lifecycle::LifecycleController;
use crate::policy::FetchPolicy;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tether_core::events::{EventOutcome, WorkerEvent};
use tether_core::messages::ClientMessage;
use tether_core::ports::{CacheStorage, Clients, Network};
use tether_core::{Request, Result, WorkerState};
use tokio::sync::watch;
use tracing::{debug, info};

/// A worker instance bound to one configuration.
pub struct ServiceWorker {
    id: u64,
    config: Arc<WorkerConfig>,
    lifecycle: LifecycleController,
    policy: FetchPolicy,
}

impl ServiceWorker {
    /// A freshly registered worker, waiting for its install event.
    pub fn new(
        config: WorkerConfig,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        clients: Arc<dyn Clients>,
    ) -> Self {
        let config = Arc::new(config);
        let lifecycle = LifecycleController::new(
            Arc::clone(&config),
            Arc::clone(&storage),
            Arc::clone(&network),
            clients,
        );
        Self::assemble(config, lifecycle, storage, network)
    }

    /// A worker restarted by the host after a previous activation.
    pub fn resumed(
        config: WorkerConfig,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        clients: Arc<dyn Clients>,
    ) -> Self {
        let config = Arc::new(config);
        let lifecycle = LifecycleController::resumed(
            Arc::clone(&config),
            Arc::clone(&storage),
            Arc::clone(&network),
            clients,
        );
        Self::assemble(config, lifecycle, storage, network)
    }

    fn assemble(
        config: Arc<WorkerConfig>,
        lifecycle: LifecycleController,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
    ) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
            lifecycle,
            policy: FetchPolicy::new(Arc::clone(&config), storage, network),
            config,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    pub fn state(&self) -> WorkerState {
        self.lifecycle.state()
    }

    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.lifecycle.subscribe()
    }

    /// Dispatch one event.
    pub async fn handle(&self, event: WorkerEvent) -> Result<EventOutcome> {
        debug!(worker_id = self.id, event = event.kind(), "Dispatching event");
        match event {
            WorkerEvent::Install => self.on_install().await,
            WorkerEvent::Activate => Ok(EventOutcome::Lifecycle(self.lifecycle.activate().await?)),
            WorkerEvent::Fetch(request) => self.on_fetch(&request).await,
            WorkerEvent::Message(message) => self.on_message(message).await,
        }
    }

    async fn on_install(&self) -> Result<EventOutcome> {
        let mut state = self.lifecycle.install().await?;
        if self.lifecycle.skip_waiting_requested() {
            state = self.lifecycle.activate_if_waiting().await?;
        }
        Ok(EventOutcome::Lifecycle(state))
    }

    async fn on_fetch(&self, request: &Request) -> Result<EventOutcome> {
        let outcome = if self.state().can_intercept_fetch() {
            self.policy.handle(request).await?
        } else {
            self.policy.passthrough(request).await?
        };
        debug!(
            worker_id = self.id,
            url = %request.url,
            strategy = %outcome.strategy,
            source = %outcome.source,
            status = outcome.response.status,
            "Fetch resolved"
        );
        Ok(EventOutcome::Fetch(outcome))
    }

    async fn on_message(&self, message: ClientMessage) -> Result<EventOutcome> {
        match message {
            ClientMessage::SkipWaiting => {
                info!(worker_id = self.id, "Skip waiting requested by page");
                Ok(EventOutcome::Message(self.lifecycle.skip_waiting().await?))
            }
        }
    }

    /// Mark the worker as superseded by a newer one.
    pub fn retire(&self) {
        self.lifecycle.retire();
    }
}
