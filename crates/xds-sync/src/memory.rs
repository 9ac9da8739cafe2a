//! An in-memory [`ResourceClient`].
//!
//! Backs tests and single-process deployments. Every [`InMemoryClient::set`]
//! pushes the namespace's new full list to the watches open on that
//! namespace and to all-namespaces watches. A watch whose consumer lags
//! gets the lists coalesced: intermediate ones may be skipped, the latest
//! one always arrives.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::trace;
use xds_core::{BoxResource, XdsError, XdsResult};

use crate::client::{ResourceClient, ResourceWatch, WatchOptions};

struct OpenWatch {
    id: u64,
    namespace: String,
    latest: watch::Sender<Vec<BoxResource>>,
    errors: mpsc::Sender<XdsError>,
}

impl OpenWatch {
    fn is_open(&self) -> bool {
        self.latest.receiver_count() > 0
    }
}

#[derive(Default)]
struct Store {
    lists: BTreeMap<String, Vec<BoxResource>>,
    watches: Vec<OpenWatch>,
    next_watch: u64,
    fail_list: Option<String>,
    fail_watch: Option<String>,
}

impl Store {
    fn snapshot_of(&self, namespace: &str) -> Vec<BoxResource> {
        if namespace.is_empty() {
            self.lists.values().flatten().cloned().collect()
        } else {
            self.lists.get(namespace).cloned().unwrap_or_default()
        }
    }
}

/// Shared in-memory resource store. Clones share the same store.
#[derive(Clone)]
pub struct InMemoryClient {
    store: Arc<Mutex<Store>>,
    buffer: usize,
}

impl std::fmt::Debug for InMemoryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let store = self.lock();
        f.debug_struct("InMemoryClient")
            .field("namespaces", &store.lists.keys().collect::<Vec<_>>())
            .field("watches", &store.watches.len())
            .finish()
    }
}

impl Default for InMemoryClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryClient {
    /// Create an empty store whose watch channels hold 16 lists.
    pub fn new() -> Self {
        Self::with_buffer(16)
    }

    /// Create an empty store with the given watch channel capacity.
    pub fn with_buffer(buffer: usize) -> Self {
        Self {
            store: Arc::default(),
            buffer: buffer.max(1),
        }
    }

    /// Replace the list of a namespace and notify the open watches.
    ///
    /// Never blocks. A watch that has not picked up its previous list yet
    /// has it replaced by this one.
    pub fn set(&self, namespace: &str, items: Vec<BoxResource>) {
        let mut store = self.lock();
        store.lists.insert(namespace.to_string(), items);
        let store = &mut *store;
        let lists = &store.lists;
        store.watches.retain(|watch| {
            if !watch.namespace.is_empty() && watch.namespace != namespace {
                return watch.is_open();
            }
            let list = if watch.namespace.is_empty() {
                lists.values().flatten().cloned().collect()
            } else {
                lists.get(namespace).cloned().unwrap_or_default()
            };
            watch.latest.send(list).is_ok()
        });
    }

    /// Current list of a namespace. `""` returns every namespace.
    pub fn get(&self, namespace: &str) -> Vec<BoxResource> {
        self.lock().snapshot_of(namespace)
    }

    /// Report an error on every open watch of a namespace.
    pub fn fail_watches(&self, namespace: &str, message: &str) {
        let store = self.lock();
        for watch in store.watches.iter().filter(|w| w.namespace == namespace) {
            let _ = watch.errors.try_send(XdsError::client(message));
        }
    }

    /// Make the next `list` calls on a namespace fail.
    pub fn fail_list(&self, namespace: &str) {
        self.lock().fail_list = Some(namespace.to_string());
    }

    /// Make the next `watch` calls on a namespace fail.
    pub fn fail_watch(&self, namespace: &str) {
        self.lock().fail_watch = Some(namespace.to_string());
    }

    /// Number of watches whose receiver is still alive.
    pub fn open_watches(&self) -> usize {
        self.lock()
            .watches
            .iter()
            .filter(|w| w.is_open())
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ResourceClient for InMemoryClient {
    async fn list(&self, namespace: &str, _options: &WatchOptions) -> XdsResult<Vec<BoxResource>> {
        let store = self.lock();
        if store.fail_list.as_deref() == Some(namespace) {
            return Err(XdsError::client(format!("list failed in {namespace:?}")));
        }
        Ok(store.snapshot_of(namespace))
    }

    async fn watch(&self, namespace: &str, options: &WatchOptions) -> XdsResult<ResourceWatch> {
        let (lists_tx, lists) = mpsc::channel(self.buffer);
        let (errors_tx, errors) = mpsc::channel(self.buffer);
        let (latest_tx, latest) = watch::channel(Vec::new());
        let id = {
            let mut store = self.lock();
            if store.fail_watch.as_deref() == Some(namespace) {
                return Err(XdsError::client(format!("watch failed in {namespace:?}")));
            }
            let id = store.next_watch;
            store.next_watch += 1;
            store.watches.push(OpenWatch {
                id,
                namespace: namespace.to_string(),
                latest: latest_tx,
                errors: errors_tx,
            });
            id
        };

        tokio::spawn(forward_latest(
            Arc::clone(&self.store),
            id,
            latest,
            lists_tx,
            options.cancel.clone(),
        ));

        Ok(ResourceWatch { lists, errors })
    }
}

// Moves the latest list of one watch into its bounded channel, waiting for
// capacity. Lists replaced while waiting are never sent. On exit the watch
// leaves the store before the list sender drops, so receivers that see end
// of stream also see the watch gone.
async fn forward_latest(
    store: Arc<Mutex<Store>>,
    id: u64,
    mut latest: watch::Receiver<Vec<BoxResource>>,
    lists: mpsc::Sender<Vec<BoxResource>>,
    cancel: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = lists.closed() => break,
            changed = latest.changed() => {
                if changed.is_err() {
                    break;
                }
                let list = latest.borrow_and_update().clone();
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    sent = lists.send(list) => if sent.is_err() { break },
                }
            }
        }
    }
    trace!(watch = id, "in-memory watch closed");
    drop(latest);
    let mut store = store.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    store.watches.retain(|w| w.id != id);
    drop(store);
    drop(lists);
}
