//! Declarative descriptions of the resource types a snapshot carries.

use std::fmt;
use std::sync::Arc;

use xds_core::{BoxResource, TypeUrl};

use crate::client::ResourceClient;

/// Puts a merged list into canonical order. Must be deterministic.
pub type SortFn = fn(&mut Vec<BoxResource>);

/// Stable sort by resource name.
pub fn sort_by_name(items: &mut Vec<BoxResource>) {
    items.sort_by(|a, b| a.name().cmp(b.name()));
}

/// One resource type of a snapshot: where its collection lives, how it is
/// labelled in errors and metrics, where it is read from, and how merged
/// lists are ordered.
///
/// ```rust,ignore
/// let virtual_services = WatchedResource::new(
///     "type.googleapis.com/gateway.solo.io.VirtualService",
///     "virtualServices",
///     Arc::new(virtual_service_client),
/// );
/// ```
#[derive(Clone)]
pub struct WatchedResource {
    type_url: TypeUrl,
    kind: String,
    client: Arc<dyn ResourceClient>,
    sort: SortFn,
}

impl WatchedResource {
    /// Describe a resource type, ordered by name.
    pub fn new(
        type_url: impl Into<TypeUrl>,
        kind: impl Into<String>,
        client: Arc<dyn ResourceClient>,
    ) -> Self {
        Self {
            type_url: type_url.into(),
            kind: kind.into(),
            client,
            sort: sort_by_name,
        }
    }

    /// Replace the canonical ordering.
    #[must_use]
    pub fn with_sort(mut self, sort: SortFn) -> Self {
        self.sort = sort;
        self
    }

    /// Snapshot collection this type fills.
    pub fn type_url(&self) -> &TypeUrl {
        &self.type_url
    }

    /// Label used in error tags and metrics.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// The backing client.
    pub fn client(&self) -> &Arc<dyn ResourceClient> {
        &self.client
    }

    /// The canonical ordering.
    pub fn sort(&self) -> SortFn {
        self.sort
    }
}

impl fmt::Debug for WatchedResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchedResource")
            .field("type_url", &self.type_url)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}
