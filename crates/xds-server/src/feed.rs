//! Consistency gate between snapshot producers and the cache.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use xds_cache::{Cache, ShardedCache, Snapshot};
use xds_core::{NodeHash, XdsResult};

use crate::metrics::XdsMetrics;

/// Stores consistent snapshots as the wildcard snapshot of a cache.
///
/// Inconsistent snapshots are logged, counted and skipped; proxies keep
/// the last good configuration until a consistent one arrives.
#[derive(Debug, Clone)]
pub struct SnapshotFeed {
    cache: Arc<ShardedCache>,
    metrics: XdsMetrics,
}

impl SnapshotFeed {
    /// Create a feed into `cache`.
    pub fn new(cache: Arc<ShardedCache>, metrics: XdsMetrics) -> Self {
        Self { cache, metrics }
    }

    /// Check one snapshot and store it if consistent.
    pub fn apply(&self, snapshot: Snapshot) -> XdsResult<()> {
        if let Err(err) = snapshot.consistent() {
            warn!(version = %snapshot.version(), error = %err, "rejecting inconsistent snapshot");
            self.metrics.snapshot_rejected();
            return Err(err);
        }
        debug!(
            version = %snapshot.version(),
            resources = snapshot.total_resources(),
            "storing snapshot"
        );
        self.metrics.snapshot_accepted(snapshot.total_resources());
        self.cache.set_snapshot(NodeHash::wildcard(), snapshot);
        Ok(())
    }

    /// Apply snapshots until the channel closes or `cancel` fires.
    pub async fn run(self, mut snapshots: mpsc::Receiver<Snapshot>, cancel: CancellationToken) {
        info!("snapshot feed started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                snapshot = snapshots.recv() => match snapshot {
                    Some(snapshot) => {
                        let _ = self.apply(snapshot);
                    }
                    None => break,
                },
            }
        }
        info!(
            accepted = self.metrics.snapshots_accepted(),
            rejected = self.metrics.snapshots_rejected(),
            "snapshot feed stopped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use xds_core::{BoxResource, TypeUrl, XdsError};
    use xds_types::envoy::config::cluster::v3::cluster::{
        ClusterDiscoveryType, DiscoveryType, EdsClusterConfig,
    };
    use xds_types::envoy::config::cluster::v3::Cluster;
    use xds_types::envoy::config::core::v3::ConfigSource;
    use xds_types::envoy::config::endpoint::v3::ClusterLoadAssignment;
    use xds_types::EnvoyResource;

    fn eds_cluster(name: &str) -> BoxResource {
        Arc::new(EnvoyResource::Cluster(Cluster {
            name: name.to_string(),
            cluster_discovery_type: Some(ClusterDiscoveryType::Type(DiscoveryType::Eds as i32)),
            eds_cluster_config: Some(EdsClusterConfig {
                eds_config: Some(ConfigSource::ads()),
                service_name: String::new(),
            }),
            connect_timeout: None,
        }))
    }

    fn endpoints(cluster: &str) -> BoxResource {
        Arc::new(EnvoyResource::Endpoint(ClusterLoadAssignment {
            cluster_name: cluster.to_string(),
            endpoints: Vec::new(),
        }))
    }

    fn snapshot(clusters: Vec<BoxResource>, endpoints: Vec<BoxResource>) -> Snapshot {
        let mut snapshot = Snapshot::envoy();
        snapshot.set_resources(TypeUrl::CLUSTER, clusters);
        snapshot.set_resources(TypeUrl::ENDPOINT, endpoints);
        let fingerprint = snapshot.fingerprint().expect("fingerprint");
        snapshot.stamp(&fingerprint);
        snapshot
    }

    fn feed() -> SnapshotFeed {
        SnapshotFeed::new(Arc::new(ShardedCache::new()), XdsMetrics::new())
    }

    #[test]
    fn consistent_snapshot_becomes_wildcard() {
        let feed = feed();
        let good = snapshot(vec![eds_cluster("svcA")], vec![endpoints("svcA")]);
        let version = good.version().to_string();

        feed.apply(good).expect("consistent");
        let stored = feed.cache.get_snapshot(NodeHash::wildcard()).expect("stored");
        assert_eq!(stored.version(), version);
        assert_eq!(feed.metrics.snapshots_accepted(), 1);
    }

    #[test]
    fn inconsistent_snapshot_keeps_previous() {
        let feed = feed();
        let good = snapshot(vec![eds_cluster("svcA")], vec![endpoints("svcA")]);
        let version = good.version().to_string();
        feed.apply(good).expect("consistent");

        let dangling = snapshot(vec![eds_cluster("svcA"), eds_cluster("svcB")], vec![endpoints("svcA")]);
        let err = feed.apply(dangling).unwrap_err();
        assert!(matches!(err, XdsError::InconsistentReferences { .. }));

        let stored = feed.cache.get_snapshot(NodeHash::wildcard()).expect("stored");
        assert_eq!(stored.version(), version);
        assert_eq!(feed.metrics.snapshots_rejected(), 1);
    }

    #[tokio::test]
    async fn run_drains_channel_then_stops() {
        let feed = feed();
        let cache = Arc::clone(&feed.cache);
        let metrics = feed.metrics.clone();
        let (tx, rx) = mpsc::channel(4);

        tx.send(snapshot(Vec::new(), vec![endpoints("orphan")]))
            .await
            .expect("send");
        tx.send(snapshot(vec![eds_cluster("svcA")], vec![endpoints("svcA")]))
            .await
            .expect("send");
        drop(tx);

        feed.run(rx, CancellationToken::new()).await;
        assert_eq!(metrics.snapshots_rejected(), 1);
        assert_eq!(metrics.snapshots_accepted(), 1);
        assert_eq!(cache.snapshot_count(), 1);
    }

    #[tokio::test]
    async fn run_stops_on_cancel() {
        let (_tx, rx) = mpsc::channel::<Snapshot>(1);
        let cancel = CancellationToken::new();
        let task = tokio::spawn(feed().run(rx, cancel.clone()));

        cancel.cancel();
        task.await.expect("feed task");
    }
}
