//! Cache statistics.

use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic counters for cache operations.
#[derive(Debug, Default)]
pub struct CacheStats {
    snapshots_set: AtomicU64,
    snapshot_hits: AtomicU64,
    wildcard_fallbacks: AtomicU64,
    snapshot_misses: AtomicU64,
    snapshots_cleared: AtomicU64,
    notifications_sent: AtomicU64,
}

impl CacheStats {
    /// Create zeroed statistics.
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_set(&self) {
        self.snapshots_set.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_hit(&self) {
        self.snapshot_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_fallback(&self) {
        self.wildcard_fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_miss(&self) {
        self.snapshot_misses.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_clear(&self) {
        self.snapshots_cleared.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_notifications(&self, count: u64) {
        self.notifications_sent.fetch_add(count, Ordering::Relaxed);
    }

    /// Snapshots stored.
    #[inline]
    pub fn snapshots_set(&self) -> u64 {
        self.snapshots_set.load(Ordering::Relaxed)
    }

    /// Lookups answered with the node's own snapshot.
    #[inline]
    pub fn snapshot_hits(&self) -> u64 {
        self.snapshot_hits.load(Ordering::Relaxed)
    }

    /// Lookups answered with the wildcard snapshot.
    #[inline]
    pub fn wildcard_fallbacks(&self) -> u64 {
        self.wildcard_fallbacks.load(Ordering::Relaxed)
    }

    /// Lookups with no snapshot at all.
    #[inline]
    pub fn snapshot_misses(&self) -> u64 {
        self.snapshot_misses.load(Ordering::Relaxed)
    }

    /// Snapshots cleared.
    #[inline]
    pub fn snapshots_cleared(&self) -> u64 {
        self.snapshots_cleared.load(Ordering::Relaxed)
    }

    /// Watch notifications delivered.
    #[inline]
    pub fn notifications_sent(&self) -> u64 {
        self.notifications_sent.load(Ordering::Relaxed)
    }

    /// Share of lookups that found a snapshot (own or wildcard).
    pub fn hit_rate(&self) -> f64 {
        let found = (self.snapshot_hits() + self.wildcard_fallbacks()) as f64;
        let total = found + self.snapshot_misses() as f64;
        if total == 0.0 {
            0.0
        } else {
            found / total
        }
    }
}
