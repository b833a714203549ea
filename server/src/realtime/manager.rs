use super::LiveEvent;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

/// Type alias for a live event sender
pub type LiveSender = mpsc::UnboundedSender<LiveEvent>;

/// Registry of open delivery channels, one entry per connected client.
///
/// Thread-safe via `Arc<RwLock<..>>`; a user with several open clients has
/// several senders. Send errors are ignored: a closed channel is cleaned up
/// when its stream unregisters.
#[derive(Clone, Default)]
pub struct ConnectionManager {
    connections: Arc<RwLock<HashMap<Uuid, Vec<(u64, LiveSender)>>>>,
    next_id: Arc<AtomicU64>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a channel for a user. The returned id targets `unregister`;
    /// the receiver gets a `connected` greeting immediately.
    pub async fn register(&self, user_id: Uuid) -> (u64, mpsc::UnboundedReceiver<LiveEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let connection_id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let _ = tx.send(LiveEvent::Connected);

        self.connections
            .write()
            .await
            .entry(user_id)
            .or_default()
            .push((connection_id, tx));

        (connection_id, rx)
    }

    /// Drop one client's channel; the user's entry disappears with its
    /// last channel.
    pub async fn unregister(&self, user_id: Uuid, connection_id: u64) {
        let mut connections = self.connections.write().await;
        if let Some(senders) = connections.get_mut(&user_id) {
            senders.retain(|(id, _)| *id != connection_id);
            if senders.is_empty() {
                connections.remove(&user_id);
            }
        }
    }

    /// Best-effort push to every open channel of one user.
    /// Returns false when the user has no live connection.
    pub async fn push(&self, user_id: Uuid, event: LiveEvent) -> bool {
        let connections = self.connections.read().await;
        match connections.get(&user_id) {
            Some(senders) if !senders.is_empty() => {
                for (_, sender) in senders {
                    let _ = sender.send(event.clone());
                }
                true
            }
            _ => false,
        }
    }

    /// Best-effort push to every connected user.
    pub async fn broadcast(&self, event: LiveEvent) {
        let connections = self.connections.read().await;
        for senders in connections.values() {
            for (_, sender) in senders {
                let _ = sender.send(event.clone());
            }
        }
    }

    pub async fn is_connected(&self, user_id: Uuid) -> bool {
        self.connections.read().await.contains_key(&user_id)
    }

    /// Total open channels across all users.
    pub async fn connection_count(&self) -> usize {
        self.connections
            .read()
            .await
            .values()
            .map(|senders| senders.len())
            .sum()
    }
}
