//! Change notifications for cache consumers.
//!
//! Discovery sessions open a [`Watch`] for their node and are woken with
//! the new snapshot whenever it, or the wildcard snapshot, is replaced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{debug, trace};
use xds_core::NodeHash;

use crate::Snapshot;

/// Unique identifier for a watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(u64);

impl WatchId {
    fn next() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Numeric value of this ID.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for WatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "watch-{}", self.0)
    }
}

/// Receiving end of a watch.
#[derive(Debug)]
pub struct Watch {
    id: WatchId,
    node_hash: NodeHash,
    receiver: mpsc::Receiver<Arc<Snapshot>>,
}

impl Watch {
    /// The watch ID.
    #[inline]
    pub fn id(&self) -> WatchId {
        self.id
    }

    /// The node this watch follows.
    #[inline]
    pub fn node_hash(&self) -> NodeHash {
        self.node_hash
    }

    /// Wait for the next update. `None` once the watch is cancelled.
    pub async fn recv(&mut self) -> Option<Arc<Snapshot>> {
        self.receiver.recv().await
    }

    /// Take a pending update without waiting.
    pub fn try_recv(&mut self) -> Result<Arc<Snapshot>, mpsc::error::TryRecvError> {
        self.receiver.try_recv()
    }
}

#[derive(Debug, Clone)]
struct WatchSender {
    node_hash: NodeHash,
    sender: mpsc::Sender<Arc<Snapshot>>,
}

/// Outcome of delivering one notification.
enum Delivery {
    Sent,
    Pending,
    Closed,
}

impl WatchSender {
    // A full channel already holds an update the receiver has not seen;
    // the receiver re-reads the cache when it wakes, so dropping is safe.
    fn deliver(&self, snapshot: Arc<Snapshot>) -> Delivery {
        match self.sender.try_send(snapshot) {
            Ok(()) => Delivery::Sent,
            Err(mpsc::error::TrySendError::Full(_)) => Delivery::Pending,
            Err(mpsc::error::TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

/// Registry of open watches.
#[derive(Debug)]
pub struct WatchManager {
    watches: DashMap<WatchId, WatchSender>,
    channel_buffer: usize,
}

impl Default for WatchManager {
    fn default() -> Self {
        Self::new()
    }
}

impl WatchManager {
    /// Create a manager with the default channel size.
    pub fn new() -> Self {
        Self::with_buffer_size(1)
    }

    /// Create a manager with a custom channel size.
    pub fn with_buffer_size(buffer_size: usize) -> Self {
        Self {
            watches: DashMap::new(),
            channel_buffer: buffer_size.max(1),
        }
    }

    /// Open a watch for a node.
    pub fn create_watch(&self, node_hash: NodeHash) -> Watch {
        let id = WatchId::next();
        let (sender, receiver) = mpsc::channel(self.channel_buffer);
        self.watches.insert(id, WatchSender { node_hash, sender });
        debug!(watch_id = %id, node = %node_hash, "created watch");
        Watch {
            id,
            node_hash,
            receiver,
        }
    }

    /// Close a watch.
    pub fn cancel_watch(&self, watch_id: WatchId) {
        if self.watches.remove(&watch_id).is_some() {
            debug!(watch_id = %watch_id, "cancelled watch");
        }
    }

    /// Notify the watches of `node_hash`. The wildcard node notifies every
    /// watch, since nodes without a snapshot of their own fall back to it.
    ///
    /// Returns the number of notifications delivered.
    pub fn notify(&self, node_hash: NodeHash, snapshot: Arc<Snapshot>) -> u64 {
        let targets: Vec<(WatchId, WatchSender)> = self
            .watches
            .iter()
            .filter(|entry| node_hash.is_wildcard() || entry.node_hash == node_hash)
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect();

        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, sender) in &targets {
            match sender.deliver(Arc::clone(&snapshot)) {
                Delivery::Sent => delivered += 1,
                Delivery::Pending => trace!(watch_id = %id, "watch already has a pending update"),
                Delivery::Closed => closed.push(*id),
            }
        }

        for id in &closed {
            self.watches.remove(id);
        }
        if !closed.is_empty() {
            debug!(count = closed.len(), "removed closed watches");
        }

        trace!(node = %node_hash, delivered, "notified watches");
        delivered
    }

    /// Number of open watches for a node.
    pub fn watch_count(&self, node_hash: NodeHash) -> usize {
        self.watches.iter().filter(|entry| entry.node_hash == node_hash).count()
    }

    /// Number of open watches.
    pub fn total_watch_count(&self) -> usize {
        self.watches.len()
    }
}
