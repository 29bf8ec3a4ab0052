//! Live-update fan-out.
//!
//! Tracks the senders of all connected WebSocket listener sessions and pushes
//! the full collection snapshot to each of them after every mutation.
//! Delivery is at-least-effort: a listener whose push fails misses that
//! snapshot and is pruned from the registry; there is no retry or backlog.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::Book;

pub type ListenerId = u64;

/// Process-wide registry of connected live-update listeners.
///
/// Each listener is an unbounded sender whose receiving end is drained into
/// the listener's socket by its session task. The registry carries its own
/// synchronization (`DashMap`), distinct from the store lock.
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    next_id: AtomicU64,
    listeners: DashMap<ListenerId, mpsc::UnboundedSender<String>>,
}

impl ListenerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a connected listener and returns its handle id.
    pub fn register(&self, sender: mpsc::UnboundedSender<String>) -> ListenerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        self.listeners.insert(id, sender);
        debug!("listener {} registered ({} connected)", id, self.listeners.len());
        id
    }

    /// Removes a listener, typically on disconnect. Removing an already
    /// pruned id is a no-op.
    pub fn deregister(&self, id: ListenerId) {
        if self.listeners.remove(&id).is_some() {
            debug!("listener {} deregistered ({} connected)", id, self.listeners.len());
        }
    }

    /// Pushes one snapshot to a single listener, used for the initial sync
    /// on connect. A failed push prunes the listener.
    pub fn send_to(&self, id: ListenerId, books: &[Book]) {
        let Some(payload) = encode_snapshot(books) else {
            return;
        };
        let failed = match self.listeners.get(&id) {
            Some(sender) => sender.send(payload).is_err(),
            None => false,
        };
        if failed {
            warn!("initial sync to listener {} failed, pruning it", id);
            self.listeners.remove(&id);
        }
    }

    /// Pushes one snapshot to every registered listener and returns the
    /// number of successful deliveries.
    ///
    /// Failures are collected during the pass and pruned only after it
    /// completes; removal never happens while iterating the live set.
    pub fn broadcast(&self, books: &[Book]) -> usize {
        let Some(payload) = encode_snapshot(books) else {
            return 0;
        };

        let mut delivered = 0;
        let mut dead: Vec<ListenerId> = Vec::new();
        for entry in self.listeners.iter() {
            if entry.value().send(payload.clone()).is_ok() {
                delivered += 1;
            } else {
                dead.push(*entry.key());
            }
        }

        for id in dead {
            warn!("listener {} unreachable during broadcast, pruning it", id);
            self.listeners.remove(&id);
        }

        debug!("broadcast {} book(s) to {} listener(s)", books.len(), delivered);
        delivered
    }

    /// Number of currently registered listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

fn encode_snapshot(books: &[Book]) -> Option<String> {
    match serde_json::to_string(books) {
        Ok(payload) => Some(payload),
        Err(e) => {
            // Book serialization is infallible in practice; log and skip.
            error!("failed to encode snapshot: {}", e);
            None
        }
    }
}
