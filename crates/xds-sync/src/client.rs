//! The per-resource-type client capability the emitter consumes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use xds_core::{BoxResource, XdsError, XdsResult};

/// Options passed to every `list` and `watch` call of a subscription.
#[derive(Debug, Clone, Default)]
pub struct WatchOptions {
    /// Cancelled when the subscription stops. Clients should close their
    /// watch channels once it fires.
    pub cancel: CancellationToken,
    /// Label selector restricting the watched resources.
    pub selector: BTreeMap<String, String>,
}

/// An open watch on one namespace.
///
/// Every value on `lists` is the complete current list for the namespace,
/// not a delta.
#[derive(Debug)]
pub struct ResourceWatch {
    /// Full lists, one per change.
    pub lists: mpsc::Receiver<Vec<BoxResource>>,
    /// Asynchronous watch failures.
    pub errors: mpsc::Receiver<XdsError>,
}

/// List/watch access to one resource type.
///
/// The namespace `""` means every namespace.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Ensure the backing resource type exists in the store.
    fn register(&self) -> XdsResult<()> {
        Ok(())
    }

    /// List the resources currently in a namespace.
    async fn list(&self, namespace: &str, options: &WatchOptions) -> XdsResult<Vec<BoxResource>>;

    /// Open a watch on a namespace.
    async fn watch(&self, namespace: &str, options: &WatchOptions) -> XdsResult<ResourceWatch>;
}
