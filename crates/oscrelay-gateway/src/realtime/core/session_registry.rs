use axum::extract::ws::Message;
use dashmap::DashMap;
use tokio::sync::mpsc;

use std::sync::atomic::{AtomicU64, Ordering};

/// One subscriber's outbound queue sender.
#[derive(Clone)]
pub struct Connection {
    pub tx: mpsc::Sender<Message>,
}

/// Subscriber registry: `subscriber_id -> Connection`.
///
/// Ids are allocated from a monotonic sequence and never reused.
#[derive(Default)]
pub struct SubscriberRegistry {
    subscribers: DashMap<u64, Connection>,
    seq: AtomicU64,
}

impl SubscriberRegistry {
    pub fn new() -> Self {
        Self {
            subscribers: DashMap::new(),
            seq: AtomicU64::new(1),
        }
    }

    pub fn register(&self, conn: Connection) -> u64 {
        let id = self.seq.fetch_add(1, Ordering::Relaxed);
        self.subscribers.insert(id, conn);
        id
    }

    pub fn remove(&self, id: u64) -> Option<Connection> {
        self.subscribers.remove(&id).map(|(_, c)| c)
    }

    pub fn get(&self, id: u64) -> Option<Connection> {
        self.subscribers.get(&id).map(|r| r.value().clone())
    }

    pub fn len(&self) -> usize {
        self.subscribers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Copy of the current subscriber set; shard locks are released on return.
    pub fn snapshot(&self) -> Vec<(u64, Connection)> {
        self.subscribers
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect()
    }
}
