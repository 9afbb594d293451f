//! Connected page clients and fire-and-forget broadcast.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, mpsc};

use crate::message::WorkerMessage;

pub type ClientId = u64;

struct ClientSlot {
    tx: mpsc::UnboundedSender<WorkerMessage>,
    /// Worker version controlling this client, once claimed.
    controller: Option<String>,
}

/// A page instance's end of the channel.
pub struct ClientHandle {
    pub id: ClientId,
    pub rx: mpsc::UnboundedReceiver<WorkerMessage>,
}

/// The set of open page instances. Not persisted.
#[derive(Clone, Default)]
pub struct Clients {
    slots: Arc<RwLock<BTreeMap<ClientId, ClientSlot>>>,
    next_id: Arc<AtomicU64>,
}

impl Clients {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a newly opened page. It stays uncontrolled until the next claim.
    pub async fn connect(&self) -> ClientHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::unbounded_channel();
        self.slots.write().await.insert(id, ClientSlot { tx, controller: None });
        tracing::debug!(client = id, "client connected");
        ClientHandle { id, rx }
    }

    pub async fn disconnect(&self, id: ClientId) -> bool {
        self.slots.write().await.remove(&id).is_some()
    }

    /// Make `version` the controller of every open page. Returns how many
    /// clients changed controller.
    pub async fn claim(&self, version: &str) -> usize {
        let mut slots = self.slots.write().await;
        let mut claimed = 0;
        for slot in slots.values_mut() {
            if slot.controller.as_deref() != Some(version) {
                slot.controller = Some(version.to_string());
                claimed += 1;
            }
        }
        claimed
    }

    pub async fn controller(&self, id: ClientId) -> Option<String> {
        self.slots.read().await.get(&id).and_then(|slot| slot.controller.clone())
    }

    /// Clients controlled by any worker version.
    pub async fn controlled(&self) -> Vec<ClientId> {
        let slots = self.slots.read().await;
        slots
            .iter()
            .filter(|(_, slot)| slot.controller.is_some())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Send `message` to every controlled client. No acknowledgement; clients
    /// whose receiver is gone are dropped. Returns the number of deliveries.
    pub async fn broadcast(&self, message: WorkerMessage) -> usize {
        let mut slots = self.slots.write().await;
        let mut delivered = 0;
        slots.retain(|id, slot| {
            if slot.controller.is_none() {
                return true;
            }
            match slot.tx.send(message) {
                Ok(()) => {
                    delivered += 1;
                    true
                }
                Err(_) => {
                    tracing::debug!(client = id, "dropping closed client");
                    false
                }
            }
        });
        delivered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_broadcast_reaches_controlled_clients_only() {
        let clients = Clients::new();
        let mut a = clients.connect().await;
        let mut b = clients.connect().await;
        clients.claim("v1").await;
        let mut late = clients.connect().await;

        let delivered = clients.broadcast(WorkerMessage::CacheCleared).await;

        assert_eq!(delivered, 2);
        assert_eq!(a.rx.try_recv().unwrap(), WorkerMessage::CacheCleared);
        assert_eq!(b.rx.try_recv().unwrap(), WorkerMessage::CacheCleared);
        assert!(late.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_claim_switches_controller() {
        let clients = Clients::new();
        let page = clients.connect().await;

        assert_eq!(clients.claim("v1").await, 1);
        assert_eq!(clients.claim("v1").await, 0);
        assert_eq!(clients.claim("v2").await, 1);
        assert_eq!(clients.controller(page.id).await.as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_closed_clients_pruned() {
        let clients = Clients::new();
        let gone = clients.connect().await;
        let _kept = clients.connect().await;
        clients.claim("v1").await;
        drop(gone);

        assert_eq!(clients.broadcast(WorkerMessage::CacheCleared).await, 1);
        assert_eq!(clients.controlled().await.len(), 1);
    }

    #[tokio::test]
    async fn test_disconnect() {
        let clients = Clients::new();
        let page = clients.connect().await;
        assert!(clients.disconnect(page.id).await);
        assert!(!clients.disconnect(page.id).await);
    }
}
