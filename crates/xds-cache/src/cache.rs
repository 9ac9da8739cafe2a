//! Snapshot cache keyed by proxy node.
//!
//! The gateway publishes one snapshot for every proxy under the wildcard
//! node. Per-node snapshots override it for individual proxies.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, trace};
use xds_core::NodeHash;

use crate::snapshot::Snapshot;
use crate::stats::CacheStats;
use crate::watch::{Watch, WatchId, WatchManager};

/// Snapshot storage used by discovery sessions.
pub trait Cache: Send + Sync {
    /// The snapshot stored for exactly this node.
    fn get_snapshot(&self, node: NodeHash) -> Option<Arc<Snapshot>>;

    /// Store a snapshot and notify watches.
    fn set_snapshot(&self, node: NodeHash, snapshot: Snapshot);

    /// Remove a node's snapshot.
    fn clear_snapshot(&self, node: NodeHash);

    /// Number of stored snapshots.
    fn snapshot_count(&self) -> usize;

    /// The snapshot serving a node: its own, else the wildcard snapshot.
    fn snapshot_for(&self, node: NodeHash) -> Option<Arc<Snapshot>>;

    /// Open a change watch for a node.
    fn create_watch(&self, node: NodeHash) -> Watch;

    /// Close a change watch.
    fn cancel_watch(&self, watch_id: WatchId);
}

/// `DashMap`-backed [`Cache`].
///
/// No map guard is held while watches are notified, so readers never
/// wait on watch delivery.
#[derive(Debug)]
pub struct ShardedCache {
    snapshots: DashMap<NodeHash, Arc<Snapshot>>,
    watches: WatchManager,
    stats: CacheStats,
}

impl Default for ShardedCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ShardedCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        CacheBuilder::new().build()
    }

    /// Start building a cache.
    pub fn builder() -> CacheBuilder {
        CacheBuilder::new()
    }

    /// The watch registry.
    #[inline]
    pub fn watches(&self) -> &WatchManager {
        &self.watches
    }

    /// Cache statistics.
    #[inline]
    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    /// Nodes with a stored snapshot.
    pub fn nodes(&self) -> Vec<NodeHash> {
        self.snapshots.iter().map(|r| *r.key()).collect()
    }

    /// Whether a node has a snapshot of its own.
    pub fn has_snapshot(&self, node: NodeHash) -> bool {
        self.snapshots.contains_key(&node)
    }
}

impl Cache for ShardedCache {
    fn get_snapshot(&self, node: NodeHash) -> Option<Arc<Snapshot>> {
        let result = self.snapshots.get(&node).map(|r| Arc::clone(&*r));
        if result.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        trace!(node = %node, hit = result.is_some(), "snapshot lookup");
        result
    }

    fn set_snapshot(&self, node: NodeHash, snapshot: Snapshot) {
        let snapshot = Arc::new(snapshot);
        self.snapshots.insert(node, Arc::clone(&snapshot));
        self.stats.record_set();

        debug!(
            node = %node,
            version = %snapshot.version(),
            resources = snapshot.total_resources(),
            "set snapshot"
        );

        let delivered = self.watches.notify(node, snapshot);
        self.stats.record_notifications(delivered);
    }

    fn clear_snapshot(&self, node: NodeHash) {
        if self.snapshots.remove(&node).is_some() {
            self.stats.record_clear();
            debug!(node = %node, "cleared snapshot");
        }
    }

    fn snapshot_count(&self) -> usize {
        self.snapshots.len()
    }

    fn snapshot_for(&self, node: NodeHash) -> Option<Arc<Snapshot>> {
        if let Some(snapshot) = self.snapshots.get(&node).map(|r| Arc::clone(&*r)) {
            self.stats.record_hit();
            return Some(snapshot);
        }
        if !node.is_wildcard() {
            if let Some(snapshot) = self.snapshots.get(&NodeHash::wildcard()).map(|r| Arc::clone(&*r))
            {
                self.stats.record_fallback();
                trace!(node = %node, "serving wildcard snapshot");
                return Some(snapshot);
            }
        }
        self.stats.record_miss();
        None
    }

    fn create_watch(&self, node: NodeHash) -> Watch {
        self.watches.create_watch(node)
    }

    fn cancel_watch(&self, watch_id: WatchId) {
        self.watches.cancel_watch(watch_id)
    }
}

/// Builder for [`ShardedCache`].
#[derive(Debug, Default)]
pub struct CacheBuilder {
    capacity: Option<usize>,
    watch_buffer_size: Option<usize>,
}

impl CacheBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Initial node capacity.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Per-watch channel size.
    pub fn watch_buffer_size(mut self, size: usize) -> Self {
        self.watch_buffer_size = Some(size);
        self
    }

    /// Build the cache.
    pub fn build(self) -> ShardedCache {
        ShardedCache {
            snapshots: DashMap::with_capacity(self.capacity.unwrap_or(64)),
            watches: WatchManager::with_buffer_size(self.watch_buffer_size.unwrap_or(1)),
            stats: CacheStats::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn cache_basic_operations() {
        let cache = ShardedCache::new();
        let node = NodeHash::from_id("test-node");

        assert!(cache.get_snapshot(node).is_none());
        assert_eq!(cache.snapshot_count(), 0);

        cache.set_snapshot(node, Snapshot::builder().version("v1").build());
        assert!(cache.has_snapshot(node));
        assert_eq!(cache.nodes(), vec![node]);
        assert_eq!(cache.get_snapshot(node).map(|s| s.version().to_string()), Some("v1".into()));

        cache.clear_snapshot(node);
        assert!(!cache.has_snapshot(node));
        assert_eq!(cache.stats().snapshots_cleared(), 1);
    }

    #[test]
    fn snapshot_for_falls_back_to_wildcard() {
        let cache = ShardedCache::new();
        let node = NodeHash::from_id("proxy-1");

        assert!(cache.snapshot_for(node).is_none());
        assert_eq!(cache.stats().snapshot_misses(), 1);

        cache.set_snapshot(NodeHash::wildcard(), Snapshot::builder().version("shared").build());
        let served = cache.snapshot_for(node).expect("wildcard snapshot");
        assert_eq!(served.version(), "shared");
        assert_eq!(cache.stats().wildcard_fallbacks(), 1);

        cache.set_snapshot(node, Snapshot::builder().version("own").build());
        let served = cache.snapshot_for(node).expect("own snapshot");
        assert_eq!(served.version(), "own");
        assert!(cache.get_snapshot(NodeHash::from_id("proxy-2")).is_none());
    }

    #[tokio::test]
    async fn wildcard_set_notifies_node_watches() {
        let cache = ShardedCache::new();
        let mut watch = cache.create_watch(NodeHash::from_id("proxy-1"));

        cache.set_snapshot(NodeHash::wildcard(), Snapshot::builder().version("v1").build());

        let snapshot = watch.recv().await.expect("notification");
        assert_eq!(snapshot.version(), "v1");
        assert_eq!(cache.stats().notifications_sent(), 1);
    }

    #[test]
    fn cache_builder() {
        let cache = CacheBuilder::new().capacity(128).watch_buffer_size(4).build();
        assert_eq!(cache.snapshot_count(), 0);
    }

    #[test]
    fn cache_concurrent_writers_and_readers() {
        let cache = Arc::new(ShardedCache::new());
        let mut handles = vec![];

        for i in 0..8 {
            let cache = Arc::clone(&cache);
            handles.push(thread::spawn(move || {
                let node = NodeHash::from_id(&format!("node-{i}"));
                for v in 0..50 {
                    cache.set_snapshot(node, Snapshot::builder().version(format!("v{v}")).build());
                    assert!(cache.snapshot_for(node).is_some());
                }
            }));
        }

        for handle in handles {
            handle.join().expect("Thread panicked");
        }

        assert_eq!(cache.snapshot_count(), 8);
        assert_eq!(cache.stats().snapshots_set(), 400);
    }
}
