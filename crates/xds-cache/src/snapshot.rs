//! Snapshot: a versioned set of resource collections.
//!
//! A snapshot maps type URLs to [`SnapshotResources`]. Both levels are
//! ordered maps, so iterating a snapshot always visits collections by type
//! URL and resources by name. Fingerprints and discovery responses rely on
//! that order.
//!
//! [`Snapshot::envoy`] lays out the eight collections the gateway serves:
//! endpoints, clusters, routes and listeners for the v3 API plus the same
//! four for legacy v2 proxies.

use std::collections::BTreeMap;
use std::time::Instant;

use xds_core::{BoxResource, TypeUrl};

/// Type URLs of the collections created by [`Snapshot::envoy`].
pub const ENVOY_TYPES: [&str; 8] = [
    TypeUrl::ENDPOINT,
    TypeUrl::CLUSTER,
    TypeUrl::ROUTE,
    TypeUrl::LISTENER,
    TypeUrl::ENDPOINT_V2,
    TypeUrl::CLUSTER_V2,
    TypeUrl::ROUTE_V2,
    TypeUrl::LISTENER_V2,
];

/// Resources of one type, keyed by name.
#[derive(Debug, Clone, Default)]
pub struct SnapshotResources {
    version: String,
    resources: BTreeMap<String, BoxResource>,
}

impl SnapshotResources {
    /// Create an empty collection.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            resources: BTreeMap::new(),
        }
    }

    /// Build a collection from items; a later item replaces an earlier one
    /// of the same name.
    pub fn from_items(
        version: impl Into<String>,
        items: impl IntoIterator<Item = BoxResource>,
    ) -> Self {
        let mut collection = Self::new(version);
        collection.extend(items);
        collection
    }

    /// Version of this collection.
    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    pub(crate) fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// Number of resources.
    #[inline]
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    /// Whether the collection is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Look up a resource by name.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&BoxResource> {
        self.resources.get(name)
    }

    /// Whether a resource with this name exists.
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.resources.contains_key(name)
    }

    /// Iterate resources in name order.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = (&String, &BoxResource)> {
        self.resources.iter()
    }

    /// Resource names in order.
    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &String> {
        self.resources.keys()
    }

    /// Resources in name order.
    pub fn to_vec(&self) -> Vec<BoxResource> {
        self.resources.values().cloned().collect()
    }

    fn extend(&mut self, items: impl IntoIterator<Item = BoxResource>) {
        for item in items {
            self.resources.insert(item.name().to_string(), item);
        }
    }
}

/// A versioned set of resource collections.
///
/// Cloning is shallow: resources are shared handles.
#[derive(Debug, Clone)]
pub struct Snapshot {
    version: String,
    resources: BTreeMap<TypeUrl, SnapshotResources>,
    created_at: Instant,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: String::new(),
            resources: BTreeMap::new(),
            created_at: Instant::now(),
        }
    }
}

impl Snapshot {
    /// Create a new snapshot builder.
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::new()
    }

    /// An unversioned snapshot with an empty collection for each of
    /// [`ENVOY_TYPES`].
    pub fn envoy() -> Self {
        ENVOY_TYPES
            .iter()
            .fold(Self::builder(), |builder, type_url| {
                builder.resources(TypeUrl::new(*type_url), Vec::new())
            })
            .build()
    }

    /// Global version.
    #[inline]
    pub fn version(&self) -> &str {
        &self.version
    }

    pub(crate) fn set_version(&mut self, version: impl Into<String>) {
        self.version = version.into();
    }

    /// Creation instant.
    #[inline]
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Collection for a type URL. Legacy type URLs select the v2 shadow
    /// collections; unknown type URLs give `None`.
    #[inline]
    pub fn get_resources(&self, type_url: &str) -> Option<&SnapshotResources> {
        self.resources.get(type_url)
    }

    pub(crate) fn get_resources_mut(&mut self, type_url: &str) -> Option<&mut SnapshotResources> {
        self.resources.get_mut(type_url)
    }

    /// Version of one collection.
    #[inline]
    pub fn get_version(&self, type_url: &str) -> Option<&str> {
        self.resources.get(type_url).map(SnapshotResources::version)
    }

    /// Whether a collection for this type exists.
    #[inline]
    pub fn contains_type(&self, type_url: &str) -> bool {
        self.resources.contains_key(type_url)
    }

    /// Replace the contents of a collection, creating it if needed. The
    /// collection keeps its previous version until the snapshot is stamped.
    pub fn set_resources(
        &mut self,
        type_url: impl Into<TypeUrl>,
        items: impl IntoIterator<Item = BoxResource>,
    ) {
        let type_url = type_url.into();
        let version = self
            .resources
            .get(type_url.as_str())
            .map(|c| c.version.clone())
            .unwrap_or_default();
        self.resources
            .insert(type_url, SnapshotResources::from_items(version, items));
    }

    /// Type URLs in order.
    pub fn type_urls(&self) -> impl Iterator<Item = &TypeUrl> {
        self.resources.keys()
    }

    /// Collections in type URL order.
    pub fn iter(&self) -> impl Iterator<Item = (&TypeUrl, &SnapshotResources)> {
        self.resources.iter()
    }

    /// Total number of resources across all types.
    pub fn total_resources(&self) -> usize {
        self.resources.values().map(SnapshotResources::len).sum()
    }

    /// Whether no collection holds a resource.
    pub fn is_empty(&self) -> bool {
        self.resources.values().all(SnapshotResources::is_empty)
    }
}

/// Builder for snapshots with explicit versions.
#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    version: String,
    resources: BTreeMap<TypeUrl, SnapshotResources>,
}

impl SnapshotBuilder {
    /// Create a new snapshot builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the global version. Collections added afterwards default to it.
    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    /// Add a collection versioned with the global version.
    pub fn resources(
        self,
        type_url: TypeUrl,
        resources: impl IntoIterator<Item = BoxResource>,
    ) -> Self {
        let version = self.version.clone();
        self.resources_with_version(type_url, version, resources)
    }

    /// Add a collection with its own version.
    pub fn resources_with_version(
        mut self,
        type_url: TypeUrl,
        version: impl Into<String>,
        resources: impl IntoIterator<Item = BoxResource>,
    ) -> Self {
        self.resources
            .insert(type_url, SnapshotResources::from_items(version, resources));
        self
    }

    /// Add a single resource to its type's collection.
    pub fn resource(mut self, resource: BoxResource) -> Self {
        let version = self.version.clone();
        self.resources
            .entry(TypeUrl::new(resource.type_url()))
            .or_insert_with(|| SnapshotResources::new(version))
            .extend([resource]);
        self
    }

    /// Build the snapshot.
    pub fn build(self) -> Snapshot {
        Snapshot {
            version: self.version,
            resources: self.resources,
            created_at: Instant::now(),
        }
    }
}
