//! Page-side status: connectivity and pending worker updates.

use crate::registration::Registration;
use std::sync::Arc;
use tether_core::messages::{ClientMessage, WorkerMessage};
use tether_core::{Result, WorkerState};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// What a page knows about itself: last connectivity signal and whether a
/// new worker is waiting to take over.
pub struct PageStatus {
    registration: Arc<Registration>,
    online_tx: watch::Sender<bool>,
    update_tx: watch::Sender<bool>,
}

impl PageStatus {
    pub fn new(registration: Arc<Registration>, online: bool) -> Self {
        let (online_tx, _) = watch::channel(online);
        let (update_tx, _) = watch::channel(false);
        Self {
            registration,
            online_tx,
            update_tx,
        }
    }

    /// `online` / `offline` event from the environment.
    pub fn set_online(&self, online: bool) {
        let changed = self.online_tx.send_if_modified(|current| {
            let changed = *current != online;
            *current = online;
            changed
        });
        if changed {
            info!(online, "Connectivity changed");
        }
    }

    pub fn is_online(&self) -> bool {
        *self.online_tx.borrow()
    }

    pub fn status_text(&self) -> &'static str {
        if self.is_online() { "Online" } else { "Offline" }
    }

    pub fn subscribe_online(&self) -> watch::Receiver<bool> {
        self.online_tx.subscribe()
    }

    pub fn update_available(&self) -> bool {
        *self.update_tx.borrow()
    }

    pub fn subscribe_update(&self) -> watch::Receiver<bool> {
        self.update_tx.subscribe()
    }

    /// Native state-change hook for a newly installing worker. A worker
    /// reaching `installed` while another one already controls the page
    /// means an update is available.
    pub async fn on_worker_state(&self, state: WorkerState) {
        match state {
            WorkerState::Installed if self.registration.active().await.is_some() => {
                info!("New worker installed, update available");
                self.update_tx.send_replace(true);
            }
            WorkerState::Activated => {
                self.update_tx.send_replace(false);
            }
            _ => {}
        }
    }

    /// Follow a worker's state changes until it settles.
    pub fn track(self: &Arc<Self>, mut states: watch::Receiver<WorkerState>) -> JoinHandle<()> {
        let page = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                let state = *states.borrow_and_update();
                page.on_worker_state(state).await;
                if matches!(state, WorkerState::Activated | WorkerState::Redundant) {
                    break;
                }
                if states.changed().await.is_err() {
                    break;
                }
            }
        })
    }

    /// Ask the waiting worker to take over now.
    pub async fn request_update(&self) -> Result<Option<WorkerState>> {
        info!("Requesting worker update");
        let state = self
            .registration
            .post_message(ClientMessage::SkipWaiting)
            .await?;
        if state == Some(WorkerState::Activated) {
            self.update_tx.send_replace(false);
        }
        Ok(state)
    }

    /// Message from the worker.
    pub fn on_message(&self, message: WorkerMessage) {
        debug!(?message, "Worker message received");
    }
}
