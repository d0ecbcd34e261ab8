//! Pages within the worker's scope.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tether_core::Result;
use tether_core::messages::WorkerMessage;
use tether_core::ports::Clients;
use tokio::sync::{RwLock, mpsc};
use tracing::{debug, info};

const CLIENT_CHANNEL_CAPACITY: usize = 16;

/// Identifier of a connected page.
pub type ClientId = u64;

struct ClientEntry {
    id: ClientId,
    controlled: bool,
    tx: mpsc::Sender<WorkerMessage>,
}

/// Tracks open pages and delivers worker messages to them.
#[derive(Default)]
pub struct ClientRegistry {
    next_id: AtomicU64,
    clients: RwLock<Vec<ClientEntry>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly opened page. It is not controlled until the next claim.
    pub async fn connect(&self) -> (ClientId, mpsc::Receiver<WorkerMessage>) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let (tx, rx) = mpsc::channel(CLIENT_CHANNEL_CAPACITY);
        self.clients.write().await.push(ClientEntry {
            id,
            controlled: false,
            tx,
        });
        debug!(client_id = id, "Page connected");
        (id, rx)
    }

    /// Forget a closed page.
    pub async fn disconnect(&self, id: ClientId) {
        self.clients.write().await.retain(|c| c.id != id);
    }

    pub async fn is_controlled(&self, id: ClientId) -> bool {
        self.clients
            .read()
            .await
            .iter()
            .any(|c| c.id == id && c.controlled)
    }
}

#[async_trait]
impl Clients for ClientRegistry {
    async fn claim(&self) -> Result<usize> {
        let mut clients = self.clients.write().await;
        clients.retain(|c| !c.tx.is_closed());
        for client in clients.iter_mut() {
            client.controlled = true;
        }
        info!(count = clients.len(), "Claimed open pages");
        Ok(clients.len())
    }

    async fn post_message(&self, message: WorkerMessage) -> Result<usize> {
        let mut clients = self.clients.write().await;
        clients.retain(|c| !c.tx.is_closed());
        let mut delivered = 0;
        for client in clients.iter().filter(|c| c.controlled) {
            if client.tx.try_send(message).is_ok() {
                delivered += 1;
            }
        }
        Ok(delivered)
    }

    async fn controlled(&self) -> usize {
        self.clients
            .read()
            .await
            .iter()
            .filter(|c| c.controlled && !c.tx.is_closed())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_claim_controls_open_pages() {
        let registry = ClientRegistry::new();
        let (a, _rx_a) = registry.connect().await;
        let (b, _rx_b) = registry.connect().await;
        assert_eq!(registry.controlled().await, 0);

        assert_eq!(registry.claim().await.unwrap(), 2);
        assert!(registry.is_controlled(a).await);
        assert!(registry.is_controlled(b).await);
    }

    #[tokio::test]
    async fn test_messages_reach_controlled_pages_only() {
        let registry = ClientRegistry::new();
        let (_a, mut rx_a) = registry.connect().await;
        registry.claim().await.unwrap();
        let (_b, mut rx_b) = registry.connect().await;

        let delivered = registry.post_message(WorkerMessage::CacheUpdated).await.unwrap();
        assert_eq!(delivered, 1);
        assert_eq!(rx_a.recv().await, Some(WorkerMessage::CacheUpdated));
        assert!(rx_b.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_closed_pages_are_dropped() {
        let registry = ClientRegistry::new();
        let (_a, rx_a) = registry.connect().await;
        drop(rx_a);
        assert_eq!(registry.claim().await.unwrap(), 0);
    }
}
