//! The owner task of a subscription.
//!
//! It is the only task that touches the snapshot under construction. It
//! applies merged updates as they arrive and, on every resync tick,
//! publishes the snapshot if its fingerprint moved since the last
//! delivery. Delivery never blocks: if the consumer still holds an
//! unread snapshot the new one is dropped and retried on the next tick,
//! with the baseline left where it was so the change is not forgotten.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};
use xds_cache::{Fingerprint, Snapshot};
use xds_core::{XdsError, XdsResult};

use crate::descriptor::WatchedResource;
use crate::multiplex::{NamespaceMerge, NamespacedList};
use crate::stats::EmitterStats;

pub(crate) struct Publisher {
    pub(crate) resources: Vec<WatchedResource>,
    pub(crate) merges: Vec<NamespaceMerge>,
    pub(crate) snapshot: Snapshot,
    pub(crate) updates: mpsc::Receiver<NamespacedList>,
    pub(crate) force: watch::Receiver<u64>,
    pub(crate) snapshots: mpsc::Sender<Snapshot>,
    pub(crate) errors: mpsc::Sender<XdsError>,
    pub(crate) tasks: JoinSet<()>,
    pub(crate) cancel: CancellationToken,
    pub(crate) stats: Arc<EmitterStats>,
    pub(crate) resync_interval: Duration,
}

/// Whether the owner loop keeps going after a step.
enum Flow {
    Continue,
    Stop,
}

impl Publisher {
    /// Publish until cancelled, then shut down in order: close the
    /// snapshot channel, stop and join every watch task, close the error
    /// channel.
    pub(crate) async fn run(mut self) -> XdsResult<()> {
        let result = self.publish().await;

        let Publisher {
            snapshots,
            errors,
            mut tasks,
            cancel,
            ..
        } = self;
        drop(snapshots);
        cancel.cancel();
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                if e.is_panic() {
                    warn!(error = %e, "watch task panicked");
                }
            }
        }
        drop(errors);

        info!(ok = result.is_ok(), "subscription stopped");
        result
    }

    async fn publish(&mut self) -> XdsResult<()> {
        let initial = self.fingerprint()?;
        let mut snapshot = self.snapshot.clone();
        snapshot.stamp(&initial);
        tokio::select! {
            _ = self.cancel.cancelled() => return Ok(()),
            sent = self.snapshots.send(snapshot) => if sent.is_err() {
                debug!("snapshot receiver dropped before the initial snapshot");
                return Ok(());
            },
        }
        debug!(version = %initial, "sent initial snapshot");

        let mut previous = initial;
        let mut ticker = interval_at(Instant::now() + self.resync_interval, self.resync_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut updates_open = true;
        let mut force_open = true;

        loop {
            let flow = tokio::select! {
                _ = self.cancel.cancelled() => Flow::Stop,
                _ = ticker.tick() => self.sync(&mut previous)?,
                changed = self.force.changed(), if force_open => match changed {
                    Ok(()) => self.force_emit().await?,
                    Err(_) => {
                        force_open = false;
                        Flow::Continue
                    }
                },
                update = self.updates.recv(), if updates_open => match update {
                    Some(update) => {
                        self.apply(update);
                        Flow::Continue
                    }
                    None => {
                        debug!("all watches closed");
                        updates_open = false;
                        Flow::Continue
                    }
                },
            };
            if let Flow::Stop = flow {
                return Ok(());
            }
        }
    }

    fn apply(&mut self, update: NamespacedList) {
        let resource = &self.resources[update.slot];
        self.stats.record_resources_in(&update.namespace, resource.kind());
        trace!(
            namespace = %update.namespace,
            kind = resource.kind(),
            count = update.items.len(),
            "applying list"
        );

        let merge = &mut self.merges[update.slot];
        merge.update(update.namespace, update.items);
        let merged = merge.merged(resource.sort());
        self.snapshot.set_resources(resource.type_url().clone(), merged);
    }

    fn sync(&mut self, previous: &mut Fingerprint) -> XdsResult<Flow> {
        let current = self.fingerprint()?;
        if current.as_u64() == previous.as_u64() {
            trace!(version = %current, "snapshot unchanged");
            return Ok(Flow::Continue);
        }

        let mut snapshot = self.snapshot.clone();
        snapshot.stamp(&current);
        match self.snapshots.try_send(snapshot) {
            Ok(()) => {
                debug!(version = %current, "sent snapshot");
                self.stats.record_snapshot_out();
                *previous = current;
                Ok(Flow::Continue)
            }
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!(version = %current, "consumer busy, retrying on next tick");
                self.stats.record_snapshot_missed();
                Ok(Flow::Continue)
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("snapshot receiver dropped");
                Ok(Flow::Stop)
            }
        }
    }

    // Forced emissions do not move the baseline, so the next tick still
    // compares against the last periodic delivery.
    async fn force_emit(&mut self) -> XdsResult<Flow> {
        let current = self.fingerprint()?;
        let mut snapshot = self.snapshot.clone();
        snapshot.stamp(&current);
        tokio::select! {
            _ = self.cancel.cancelled() => Ok(Flow::Stop),
            sent = self.snapshots.send(snapshot) => match sent {
                Ok(()) => {
                    debug!(version = %current, "sent forced snapshot");
                    self.stats.record_snapshot_forced();
                    Ok(Flow::Continue)
                }
                Err(_) => Ok(Flow::Stop),
            },
        }
    }

    // The report never waits on the consumer; the task result carries the
    // failure even when the error channel is full.
    fn fingerprint(&self) -> XdsResult<Fingerprint> {
        self.snapshot.fingerprint().map_err(|err| {
            error!(error = %err, "cannot fingerprint snapshot, stopping subscription");
            if let Err(mpsc::error::TrySendError::Full(_)) = self.errors.try_send(reported(&err)) {
                warn!("error channel full, fatal error not reported on it");
            }
            err
        })
    }
}

// The failure goes both to the error channel and to the task's result.
fn reported(err: &XdsError) -> XdsError {
    match err {
        XdsError::EncodingError { type_url, message } => XdsError::EncodingError {
            type_url: type_url.clone(),
            message: message.clone(),
        },
        other => XdsError::Internal {
            message: other.to_string(),
            source: None,
        },
    }
}
