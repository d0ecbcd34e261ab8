//! Worker lifecycle: install, activate and skip-waiting.

use crate::config::WorkerConfig;
use futures::future::try_join_all;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tether_core::ports::{CacheStorage, Clients, Network};
use tether_core::{Error, Request, RequestKey, Response, Result, WorkerState};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};
use url::Url;

/// Drives one worker through `installing → installed → activating → activated`.
pub struct LifecycleController {
    config: Arc<WorkerConfig>,
    storage: Arc<dyn CacheStorage>,
    network: Arc<dyn Network>,
    clients: Arc<dyn Clients>,
    state_tx: watch::Sender<WorkerState>,
    skip_waiting: AtomicBool,
}

impl LifecycleController {
    pub fn new(
        config: Arc<WorkerConfig>,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        clients: Arc<dyn Clients>,
    ) -> Self {
        let (state_tx, _) = watch::channel(WorkerState::Parsed);
        Self {
            config,
            storage,
            network,
            clients,
            state_tx,
            skip_waiting: AtomicBool::new(false),
        }
    }

    /// A controller for a worker the host restarted after it had already
    /// activated. No install or activate events are replayed.
    pub fn resumed(
        config: Arc<WorkerConfig>,
        storage: Arc<dyn CacheStorage>,
        network: Arc<dyn Network>,
        clients: Arc<dyn Clients>,
    ) -> Self {
        let controller = Self::new(config, storage, network, clients);
        controller.state_tx.send_replace(WorkerState::Activated);
        controller
    }

    /// Current state.
    pub fn state(&self) -> WorkerState {
        *self.state_tx.borrow()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<WorkerState> {
        self.state_tx.subscribe()
    }

    /// Whether the worker should activate without waiting.
    pub fn skip_waiting_requested(&self) -> bool {
        self.skip_waiting.load(Ordering::SeqCst)
    }

    /// Precache the shell. Every listed URL must fetch with a 2xx status or
    /// the install fails, nothing is stored and the worker becomes redundant.
    pub async fn install(&self) -> Result<WorkerState> {
        self.transition(WorkerState::Installing)?;
        info!(cache = %self.config.cache_name, urls = self.config.precache.len(), "Installing worker");

        match self.precache().await {
            Ok(count) => {
                self.transition(WorkerState::Installed)?;
                if self.config.skip_waiting_on_install {
                    self.skip_waiting.store(true, Ordering::SeqCst);
                }
                info!(cache = %self.config.cache_name, entries = count, "Worker installed");
                Ok(WorkerState::Installed)
            }
            Err(e) => {
                error!(cache = %self.config.cache_name, error = %e, "Install failed");
                let _ = self.transition(WorkerState::Redundant);
                Err(e)
            }
        }
    }

    async fn precache(&self) -> Result<usize> {
        let urls = self.config.precache_urls()?;
        let entries = try_join_all(urls.into_iter().map(|url| self.fetch_shell(url))).await?;

        let count = entries.len();
        let cache = self.storage.open(&self.config.cache_name).await?;
        cache.add_all(entries).await?;
        Ok(count)
    }

    async fn fetch_shell(&self, url: Url) -> Result<(RequestKey, Response)> {
        let request = Request::get(url.clone());
        let response = self
            .network
            .fetch(&request)
            .await
            .map_err(|e| Error::PrecacheFailed {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        if !response.ok() {
            return Err(Error::PrecacheFailed {
                url: url.to_string(),
                reason: format!("HTTP {}", response.status),
            });
        }
        debug!(url = %url, "Fetched shell resource");
        Ok((request.key(), response))
    }

    /// Delete every generation except the current one, then claim open pages.
    ///
    /// Eviction and claim failures are logged; they do not hold back activation.
    pub async fn activate(&self) -> Result<WorkerState> {
        self.transition(WorkerState::Activating)?;
        info!(cache = %self.config.cache_name, "Activating worker");

        match self.storage.keys().await {
            Ok(names) => {
                for name in names.iter().filter(|n| **n != self.config.cache_name) {
                    match self.storage.delete(name).await {
                        Ok(_) => info!(cache = %name, "Deleted stale cache generation"),
                        Err(e) => warn!(cache = %name, error = %e, "Failed to delete stale cache"),
                    }
                }
            }
            Err(e) => warn!(error = %e, "Failed to enumerate caches"),
        }

        match self.clients.claim().await {
            Ok(count) => debug!(pages = count, "Claimed pages"),
            Err(e) => warn!(error = %e, "Failed to claim pages"),
        }

        self.transition(WorkerState::Activated)?;
        info!(cache = %self.config.cache_name, "Worker activated");
        Ok(WorkerState::Activated)
    }

    /// Handle a `SKIP_WAITING` request: a waiting worker activates at once,
    /// one still installing activates as soon as install finishes.
    pub async fn skip_waiting(&self) -> Result<WorkerState> {
        self.skip_waiting.store(true, Ordering::SeqCst);
        self.activate_if_waiting().await
    }

    /// Activate if installed and waiting; otherwise report the current state.
    /// Losing a race against another activation is not an error.
    pub async fn activate_if_waiting(&self) -> Result<WorkerState> {
        match self.state() {
            WorkerState::Installed => match self.activate().await {
                Err(Error::InvalidState { actual, .. }) => {
                    debug!(state = %actual, "Worker already activating");
                    Ok(self.state())
                }
                result => result,
            },
            state => {
                debug!(state = %state, "Skip waiting recorded");
                Ok(state)
            }
        }
    }

    /// Mark the worker as superseded.
    pub fn retire(&self) {
        if self.transition(WorkerState::Redundant).is_ok() {
            info!("Worker retired");
        }
    }

    fn transition(&self, next: WorkerState) -> Result<()> {
        let mut rejected = None;
        self.state_tx.send_if_modified(|state| {
            if state.can_transition_to(next) {
                debug!(from = %state, to = %next, "Worker state changed");
                *state = next;
                true
            } else {
                rejected = Some(*state);
                false
            }
        });
        match rejected {
            None => Ok(()),
            Some(actual) => Err(Error::InvalidState {
                expected: format!("a state preceding {}", next),
                actual,
            }),
        }
    }
}
