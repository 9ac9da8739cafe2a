//! Subscription entry point.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use xds_cache::Snapshot;
use xds_core::{XdsError, XdsResult};

use crate::client::WatchOptions;
use crate::descriptor::WatchedResource;
use crate::multiplex::{self, Multiplexer};
use crate::publisher::Publisher;
use crate::stats::EmitterStats;

/// Emitter settings.
#[derive(Debug, Clone)]
pub struct EmitterConfig {
    /// Period of the change-detection tick.
    pub resync_interval: Duration,
    /// Capacity of the channel from watch tasks to the owner task.
    pub update_buffer: usize,
    /// Capacity of a subscription's error channel.
    pub error_buffer: usize,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            resync_interval: Duration::from_secs(1),
            update_buffer: 16,
            error_buffer: 16,
        }
    }
}

/// Per-subscription options.
#[derive(Debug, Clone, Default)]
pub struct SubscribeOptions {
    /// Stops the subscription when cancelled.
    pub cancel: CancellationToken,
    /// Label selector passed to every watch.
    pub selector: BTreeMap<String, String>,
}

/// A running subscription.
///
/// The first snapshot received is the initial snapshot built from the
/// start-up lists. The snapshot channel closes first on shutdown; the
/// error channel closes once every watch task has exited.
#[derive(Debug)]
pub struct Subscription {
    snapshots: mpsc::Receiver<Snapshot>,
    errors: mpsc::Receiver<XdsError>,
    stats: Arc<EmitterStats>,
    cancel: CancellationToken,
    task: JoinHandle<XdsResult<()>>,
}

impl Subscription {
    /// Wait for the next snapshot. `None` once the subscription stopped.
    pub async fn next_snapshot(&mut self) -> Option<Snapshot> {
        self.snapshots.recv().await
    }

    /// Wait for the next watch error. `None` once every watch task exited.
    pub async fn next_error(&mut self) -> Option<XdsError> {
        self.errors.recv().await
    }

    /// The snapshot channel.
    pub fn snapshots(&mut self) -> &mut mpsc::Receiver<Snapshot> {
        &mut self.snapshots
    }

    /// The error channel.
    pub fn errors(&mut self) -> &mut mpsc::Receiver<XdsError> {
        &mut self.errors
    }

    /// Counters of this subscription.
    pub fn stats(&self) -> &EmitterStats {
        &self.stats
    }

    /// Stop this subscription only.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Split into the snapshot channel, the error channel and the owner
    /// task handle.
    pub fn into_parts(
        self,
    ) -> (
        mpsc::Receiver<Snapshot>,
        mpsc::Receiver<XdsError>,
        JoinHandle<XdsResult<()>>,
    ) {
        (self.snapshots, self.errors, self.task)
    }

    /// Wait for the owner task and return its outcome.
    pub async fn join(self) -> XdsResult<()> {
        self.task
            .await
            .map_err(|e| XdsError::internal("snapshot publisher task failed", e))?
    }
}

/// Builds snapshots for a fixed set of resource types.
///
/// ```rust,ignore
/// let emitter = SnapshotEmitter::new(vec![
///     WatchedResource::new(GATEWAY_TYPE, "gateways", gateways),
///     WatchedResource::new(VIRTUAL_SERVICE_TYPE, "virtualServices", virtual_services),
/// ]);
/// emitter.register()?;
/// let mut subscription = emitter
///     .subscribe(["gloo-system", "apps"], SubscribeOptions::default())
///     .await?;
/// while let Some(snapshot) = subscription.next_snapshot().await {
///     translate(snapshot);
/// }
/// ```
#[derive(Debug)]
pub struct SnapshotEmitter {
    resources: Vec<WatchedResource>,
    config: EmitterConfig,
    force: watch::Sender<u64>,
}

impl SnapshotEmitter {
    /// Create an emitter for the given resource types.
    pub fn new(resources: Vec<WatchedResource>) -> Self {
        let (force, _) = watch::channel(0);
        Self {
            resources,
            config: EmitterConfig::default(),
            force,
        }
    }

    /// Replace the settings.
    #[must_use]
    pub fn with_config(mut self, config: EmitterConfig) -> Self {
        self.config = config;
        self
    }

    /// The watched resource types.
    pub fn resources(&self) -> &[WatchedResource] {
        &self.resources
    }

    /// Register every resource type with its client.
    pub fn register(&self) -> XdsResult<()> {
        for resource in &self.resources {
            resource.client().register()?;
        }
        Ok(())
    }

    /// Ask every subscription of this emitter to send its current snapshot
    /// now, changed or not. Requests made while one is pending coalesce.
    pub fn force_emit(&self) {
        self.force.send_modify(|generation| *generation = generation.wrapping_add(1));
    }

    /// Start a subscription.
    ///
    /// An empty namespace list watches every namespace. The all-namespaces
    /// sentinel `""` cannot be combined with named namespaces. Initial
    /// lists run before this returns, and their failures are returned here.
    pub async fn subscribe<I, S>(
        &self,
        namespaces: I,
        options: SubscribeOptions,
    ) -> XdsResult<Subscription>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let namespaces = validate_namespaces(namespaces.into_iter().map(Into::into).collect())?;
        self.validate_resources()?;

        let cancel = options.cancel.child_token();
        let watch_options = WatchOptions {
            cancel: cancel.clone(),
            selector: options.selector,
        };
        let (errors_tx, errors) = mpsc::channel(self.config.error_buffer.max(1));

        let Multiplexer {
            merges,
            updates,
            tasks,
        } = match multiplex::start(
            &self.resources,
            &namespaces,
            &watch_options,
            self.config.update_buffer,
            &errors_tx,
        )
        .await
        {
            Ok(multiplexer) => multiplexer,
            Err(err) => {
                cancel.cancel();
                return Err(err);
            }
        };

        let mut snapshot = Snapshot::default();
        for (resource, merge) in self.resources.iter().zip(&merges) {
            snapshot.set_resources(resource.type_url().clone(), merge.merged(resource.sort()));
        }

        let (snapshots_tx, snapshots) = mpsc::channel(1);
        let stats = Arc::new(EmitterStats::new());
        let publisher = Publisher {
            resources: self.resources.clone(),
            merges,
            snapshot,
            updates,
            force: self.force.subscribe(),
            snapshots: snapshots_tx,
            errors: errors_tx,
            tasks,
            cancel: cancel.clone(),
            stats: Arc::clone(&stats),
            resync_interval: self.config.resync_interval,
        };

        info!(
            namespaces = ?namespaces,
            types = self.resources.len(),
            "subscription started"
        );
        let task = tokio::spawn(publisher.run());

        Ok(Subscription {
            snapshots,
            errors,
            stats,
            cancel,
            task,
        })
    }

    fn validate_resources(&self) -> XdsResult<()> {
        if self.config.resync_interval.is_zero() {
            return Err(XdsError::Configuration(
                "resync interval must be greater than zero".to_string(),
            ));
        }
        let mut seen = BTreeSet::new();
        for resource in &self.resources {
            if !seen.insert(resource.type_url()) {
                return Err(XdsError::Configuration(format!(
                    "resource type {} is watched twice",
                    resource.type_url()
                )));
            }
        }
        Ok(())
    }
}

/// Normalize a namespace list: empty means `[""]`, duplicates are
/// dropped, and `""` combined with anything else is rejected.
pub fn validate_namespaces(namespaces: Vec<String>) -> XdsResult<Vec<String>> {
    if namespaces.is_empty() {
        debug!("no namespaces given, watching all namespaces");
        return Ok(vec![String::new()]);
    }
    if namespaces.len() > 1 && namespaces.iter().any(String::is_empty) {
        return Err(XdsError::InvalidNamespaces {
            reason: format!("got {namespaces:?}"),
        });
    }
    let mut seen = BTreeSet::new();
    Ok(namespaces
        .into_iter()
        .filter(|namespace| seen.insert(namespace.clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_namespaces_mean_all() {
        assert_eq!(validate_namespaces(Vec::new()).expect("valid"), vec![String::new()]);
        assert_eq!(validate_namespaces(vec![String::new()]).expect("valid"), vec![String::new()]);
    }

    #[test]
    fn all_namespaces_cannot_be_combined() {
        let err = validate_namespaces(vec![String::new(), "ns1".to_string()]).unwrap_err();
        assert!(matches!(err, XdsError::InvalidNamespaces { .. }));
        assert!(err.to_string().contains("watch all namespaces"));
    }

    #[test]
    fn duplicate_namespaces_are_dropped() {
        let namespaces = vec!["b".to_string(), "a".to_string(), "b".to_string()];
        assert_eq!(validate_namespaces(namespaces).expect("valid"), vec!["b", "a"]);
    }
}
