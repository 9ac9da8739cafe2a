//! Subscription counters.
//!
//! Every counter is kept in memory for embedders and tests, and mirrored
//! to the `metrics` facade.

use std::sync::atomic::{AtomicU64, Ordering};

use metrics::counter;

/// Counters of one subscription.
#[derive(Debug, Default)]
pub struct EmitterStats {
    resources_in: AtomicU64,
    snapshots_out: AtomicU64,
    snapshots_missed: AtomicU64,
    snapshots_forced: AtomicU64,
}

impl EmitterStats {
    /// Create zeroed counters.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_resources_in(&self, namespace: &str, kind: &str) {
        self.resources_in.fetch_add(1, Ordering::Relaxed);
        counter!(
            "xds_sync_resources_in_total",
            "namespace" => namespace.to_string(),
            "resource" => kind.to_string()
        )
        .increment(1);
    }

    pub(crate) fn record_snapshot_out(&self) {
        self.snapshots_out.fetch_add(1, Ordering::Relaxed);
        counter!("xds_sync_snapshots_out_total").increment(1);
    }

    pub(crate) fn record_snapshot_missed(&self) {
        self.snapshots_missed.fetch_add(1, Ordering::Relaxed);
        counter!("xds_sync_snapshots_missed_total").increment(1);
    }

    pub(crate) fn record_snapshot_forced(&self) {
        self.snapshots_forced.fetch_add(1, Ordering::Relaxed);
        counter!("xds_sync_snapshots_forced_total").increment(1);
    }

    /// List updates received from watches.
    pub fn resources_in(&self) -> u64 {
        self.resources_in.load(Ordering::Relaxed)
    }

    /// Changed snapshots delivered on a resync tick.
    pub fn snapshots_out(&self) -> u64 {
        self.snapshots_out.load(Ordering::Relaxed)
    }

    /// Changed snapshots dropped because the consumer had not taken the
    /// previous one.
    pub fn snapshots_missed(&self) -> u64 {
        self.snapshots_missed.load(Ordering::Relaxed)
    }

    /// Snapshots delivered by a forced emit.
    pub fn snapshots_forced(&self) -> u64 {
        self.snapshots_forced.load(Ordering::Relaxed)
    }
}
