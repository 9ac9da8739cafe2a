//! Fan-in of per-namespace watches.
//!
//! Each (namespace, resource type) pair gets an initial list and a watch.
//! Two forwarding tasks per pair move full lists to the publisher and
//! tagged errors to the subscription's error channel. The publisher keeps
//! a [`NamespaceMerge`] per type and rebuilds the merged list on every
//! update.

use std::collections::BTreeMap;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use xds_core::{BoxResource, XdsError, XdsResult};

use crate::client::{ResourceWatch, WatchOptions};
use crate::descriptor::{SortFn, WatchedResource};

/// A full list from one namespace of one resource type.
#[derive(Debug)]
pub(crate) struct NamespacedList {
    pub(crate) slot: usize,
    pub(crate) namespace: String,
    pub(crate) items: Vec<BoxResource>,
}

/// Latest list per namespace for one resource type.
///
/// The merged list does not depend on the order updates from different
/// namespaces arrive in.
///
/// ```rust
/// use xds_sync::{sort_by_name, NamespaceMerge};
///
/// let mut merge = NamespaceMerge::default();
/// merge.update("ns2", Vec::new());
/// merge.update("ns1", Vec::new());
/// assert!(merge.merged(sort_by_name).is_empty());
/// assert_eq!(merge.namespaces().count(), 2);
/// ```
#[derive(Debug, Default, Clone)]
pub struct NamespaceMerge {
    by_namespace: BTreeMap<String, Vec<BoxResource>>,
}

impl NamespaceMerge {
    /// Replace the list for a namespace.
    pub fn update(&mut self, namespace: impl Into<String>, items: Vec<BoxResource>) {
        self.by_namespace.insert(namespace.into(), items);
    }

    /// All lists concatenated in namespace order, then canonically sorted.
    pub fn merged(&self, sort: SortFn) -> Vec<BoxResource> {
        let mut merged: Vec<BoxResource> = self.by_namespace.values().flatten().cloned().collect();
        sort(&mut merged);
        merged
    }

    /// Namespaces that have reported a list.
    pub fn namespaces(&self) -> impl Iterator<Item = &str> {
        self.by_namespace.keys().map(String::as_str)
    }
}

/// Running watches of a subscription.
pub(crate) struct Multiplexer {
    pub(crate) merges: Vec<NamespaceMerge>,
    pub(crate) updates: mpsc::Receiver<NamespacedList>,
    pub(crate) tasks: JoinSet<()>,
}

/// List and watch every (namespace, resource) pair.
///
/// Any failure aborts the tasks already started and is returned tagged
/// with the namespace and type that failed.
pub(crate) async fn start(
    resources: &[WatchedResource],
    namespaces: &[String],
    options: &WatchOptions,
    update_buffer: usize,
    errors: &mpsc::Sender<XdsError>,
) -> XdsResult<Multiplexer> {
    let (updates_tx, updates) = mpsc::channel(update_buffer.max(1));
    let mut merges = vec![NamespaceMerge::default(); resources.len()];
    let mut tasks = JoinSet::new();

    for namespace in namespaces {
        for (slot, resource) in resources.iter().enumerate() {
            let client = resource.client();
            let initial = client.list(namespace, options).await.map_err(|source| {
                XdsError::InitialList {
                    type_url: resource.type_url().to_string(),
                    namespace: namespace.clone(),
                    source: Box::new(source),
                }
            })?;
            debug!(
                namespace = %namespace,
                kind = resource.kind(),
                count = initial.len(),
                "initial list"
            );
            merges[slot].update(namespace.clone(), initial);

            let ResourceWatch {
                lists,
                errors: watch_errors,
            } = client.watch(namespace, options).await.map_err(|source| {
                XdsError::WatchStart {
                    type_url: resource.type_url().to_string(),
                    namespace: namespace.clone(),
                    source: Box::new(source),
                }
            })?;

            tasks.spawn(forward_lists(
                slot,
                namespace.clone(),
                lists,
                updates_tx.clone(),
                options.cancel.clone(),
            ));
            tasks.spawn(forward_errors(
                ErrorTag {
                    type_url: resource.type_url().to_string(),
                    kind: resource.kind().to_string(),
                    namespace: namespace.clone(),
                },
                watch_errors,
                errors.clone(),
                options.cancel.clone(),
            ));
        }
    }

    Ok(Multiplexer {
        merges,
        updates,
        tasks,
    })
}

async fn forward_lists(
    slot: usize,
    namespace: String,
    mut lists: mpsc::Receiver<Vec<BoxResource>>,
    updates: mpsc::Sender<NamespacedList>,
    cancel: CancellationToken,
) {
    loop {
        let items = tokio::select! {
            _ = cancel.cancelled() => break,
            next = lists.recv() => match next {
                Some(items) => items,
                None => break,
            },
        };
        trace!(namespace = %namespace, slot, count = items.len(), "forwarding list");
        let update = NamespacedList {
            slot,
            namespace: namespace.clone(),
            items,
        };
        tokio::select! {
            _ = cancel.cancelled() => break,
            sent = updates.send(update) => if sent.is_err() { break },
        }
    }
    trace!(namespace = %namespace, slot, "list forwarder stopped");
}

struct ErrorTag {
    type_url: String,
    kind: String,
    namespace: String,
}

async fn forward_errors(
    tag: ErrorTag,
    mut watch_errors: mpsc::Receiver<XdsError>,
    errors: mpsc::Sender<XdsError>,
    cancel: CancellationToken,
) {
    loop {
        let source = tokio::select! {
            _ = cancel.cancelled() => break,
            next = watch_errors.recv() => match next {
                Some(err) => err,
                None => break,
            },
        };
        let err = XdsError::WatchStream {
            type_url: tag.type_url.clone(),
            kind: tag.kind.clone(),
            namespace: tag.namespace.clone(),
            source: Box::new(source),
        };
        debug!(error = %err, "watch error");
        tokio::select! {
            _ = cancel.cancelled() => break,
            sent = errors.send(err) => if sent.is_err() { break },
        }
    }
    trace!(namespace = %tag.namespace, kind = %tag.kind, "error forwarder stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::sort_by_name;
    use std::sync::Arc;
    use xds_core::AnyResource;

    fn item(name: &str) -> BoxResource {
        Arc::new(AnyResource::new(
            name,
            prost_types::Any {
                type_url: "type.googleapis.com/gateway.solo.io.Upstream".to_string(),
                value: name.as_bytes().to_vec(),
            },
        ))
    }

    fn names(items: &[BoxResource]) -> Vec<String> {
        items.iter().map(|i| i.name().to_string()).collect()
    }

    #[test]
    fn merged_is_sorted_concatenation() {
        let mut merge = NamespaceMerge::default();
        merge.update("b", vec![item("z"), item("a")]);
        merge.update("a", vec![item("m")]);

        assert_eq!(names(&merge.merged(sort_by_name)), vec!["a", "m", "z"]);
    }

    #[test]
    fn merge_is_order_independent() {
        let updates = [
            ("ns1", vec!["u1", "u2"]),
            ("ns2", vec!["u0"]),
            ("ns3", vec!["u9", "u3"]),
        ];
        let permutations = [[0, 1, 2], [0, 2, 1], [1, 0, 2], [1, 2, 0], [2, 0, 1], [2, 1, 0]];

        let mut results = permutations.iter().map(|order| {
            let mut merge = NamespaceMerge::default();
            for i in order {
                let (ns, items) = &updates[*i];
                merge.update(*ns, items.iter().map(|n| item(n)).collect());
            }
            names(&merge.merged(sort_by_name))
        });

        let first = results.next().expect("at least one permutation");
        assert_eq!(first, vec!["u0", "u1", "u2", "u3", "u9"]);
        assert!(results.all(|r| r == first));
    }

    #[test]
    fn last_write_per_namespace_wins() {
        let mut merge = NamespaceMerge::default();
        merge.update("ns1", vec![item("old")]);
        merge.update("ns2", vec![item("other")]);
        merge.update("ns1", vec![item("new")]);

        assert_eq!(names(&merge.merged(sort_by_name)), vec!["new", "other"]);
    }

    #[test]
    fn custom_sort_is_applied() {
        fn reverse(items: &mut Vec<BoxResource>) {
            items.sort_by(|a, b| b.name().cmp(a.name()));
        }
        let mut merge = NamespaceMerge::default();
        merge.update("", vec![item("a"), item("c"), item("b")]);
        assert_eq!(names(&merge.merged(reverse)), vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn forwarders_stop_on_cancel() {
        let cancel = CancellationToken::new();
        let (_lists_tx, lists_rx) = mpsc::channel(1);
        let (_watch_err_tx, watch_err_rx) = mpsc::channel(1);
        let (updates_tx, mut updates_rx) = mpsc::channel(1);
        let (errors_tx, mut errors_rx) = mpsc::channel(1);

        let mut tasks = JoinSet::new();
        tasks.spawn(forward_lists(0, "ns".into(), lists_rx, updates_tx, cancel.clone()));
        tasks.spawn(forward_errors(
            ErrorTag {
                type_url: "t".into(),
                kind: "upstreams".into(),
                namespace: "ns".into(),
            },
            watch_err_rx,
            errors_tx,
            cancel.clone(),
        ));

        cancel.cancel();
        while tasks.join_next().await.is_some() {}

        assert!(updates_rx.recv().await.is_none());
        assert!(errors_rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn errors_are_tagged() {
        let cancel = CancellationToken::new();
        let (watch_err_tx, watch_err_rx) = mpsc::channel(1);
        let (errors_tx, mut errors_rx) = mpsc::channel(1);
        let task = tokio::spawn(forward_errors(
            ErrorTag {
                type_url: "t".into(),
                kind: "virtualServices".into(),
                namespace: "ns1".into(),
            },
            watch_err_rx,
            errors_tx,
            cancel.clone(),
        ));

        watch_err_tx.send(XdsError::client("boom")).await.expect("send");
        let err = errors_rx.recv().await.expect("tagged error");
        assert!(err.to_string().starts_with("ns1-virtualServices"));

        drop(watch_err_tx);
        task.await.expect("forwarder");
        assert!(errors_rx.recv().await.is_none());
    }
}
