//! Resource trait, resource references and the type registry.
//!
//! [`Resource`] is the capability interface every snapshot item
//! implements. Besides encoding, a resource reports the other resources
//! it depends on as [`ResourceRef`]s so snapshots can be checked for
//! referential consistency.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::type_url::{api_version_of, ApiVersion};
use crate::TypeUrl;

/// Identity of a resource: its type URL and name.
///
/// Used as the key for dependency tracking between collections.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceRef {
    /// Type URL of the referenced resource.
    pub type_url: String,
    /// Name of the referenced resource.
    pub name: String,
}

impl ResourceRef {
    /// Create a new reference.
    #[must_use]
    pub fn new(type_url: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            type_url: type_url.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.type_url, self.name)
    }
}

/// Trait for snapshot resources.
///
/// # Example
///
/// ```rust
/// use xds_core::{Resource, ResourceRef, TypeUrl};
/// use prost_types::Any;
/// use std::any::Any as StdAny;
///
/// #[derive(Debug)]
/// struct EdsCluster {
///     name: String,
/// }
///
/// impl Resource for EdsCluster {
///     fn type_url(&self) -> &str {
///         TypeUrl::CLUSTER
///     }
///
///     fn name(&self) -> &str {
///         &self.name
///     }
///
///     fn encode(&self) -> Result<Any, Box<dyn std::error::Error + Send + Sync>> {
///         Ok(Any {
///             type_url: self.type_url().to_string(),
///             value: self.name.as_bytes().to_vec(),
///         })
///     }
///
///     fn references(&self) -> Vec<ResourceRef> {
///         vec![ResourceRef::new(TypeUrl::ENDPOINT, &self.name)]
///     }
///
///     fn as_any(&self) -> &dyn StdAny {
///         self
///     }
/// }
/// ```
pub trait Resource: Send + Sync + fmt::Debug {
    /// Get the type URL for this resource.
    fn type_url(&self) -> &str;

    /// Get the resource name.
    fn name(&self) -> &str;

    /// Encode the resource to a protobuf Any message.
    fn encode(&self) -> Result<prost_types::Any, Box<dyn std::error::Error + Send + Sync>>;

    /// Resources this one depends on, across all collections.
    ///
    /// Extraction never fails: configuration that cannot be decoded
    /// contributes no reference.
    fn references(&self) -> Vec<ResourceRef> {
        Vec::new()
    }

    /// Get the resource version, if known.
    fn version(&self) -> Option<&str> {
        None
    }

    /// Convert to Any for downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Shared handle to a resource. Resources are immutable once built, so
/// cloning the handle is as good as cloning the resource.
pub type BoxResource = Arc<dyn Resource>;

/// A pre-encoded protobuf `Any` stored as a resource.
///
/// Useful for resource kinds this crate has no typed model for.
#[derive(Debug, Clone)]
pub struct AnyResource {
    name: String,
    version: Option<String>,
    any: prost_types::Any,
}

impl AnyResource {
    /// Wrap an encoded message under the given name.
    #[must_use]
    pub fn new(name: impl Into<String>, any: prost_types::Any) -> Self {
        Self {
            name: name.into(),
            version: None,
            any,
        }
    }

    /// Attach a version.
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// Get the inner Any message.
    #[must_use]
    pub fn inner(&self) -> &prost_types::Any {
        &self.any
    }
}

impl Resource for AnyResource {
    fn type_url(&self) -> &str {
        &self.any.type_url
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn encode(&self) -> Result<prost_types::Any, Box<dyn std::error::Error + Send + Sync>> {
        Ok(self.any.clone())
    }

    fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Information about a registered resource type.
#[derive(Debug, Clone)]
pub struct ResourceTypeInfo {
    /// The type URL.
    pub type_url: String,
    /// Short name for the type.
    pub short_name: String,
    /// Description of the resource type.
    pub description: String,
    /// API major version, if the type belongs to the Envoy APIs.
    pub api_version: Option<ApiVersion>,
}

impl ResourceTypeInfo {
    /// Describe a type URL, deriving the short name and API version.
    #[must_use]
    pub fn new(type_url: &str, description: impl Into<String>) -> Self {
        Self {
            type_url: type_url.to_string(),
            short_name: TypeUrl::new(type_url).short_name().to_string(),
            description: description.into(),
            api_version: api_version_of(type_url),
        }
    }
}

/// Registry of the resource types a server is willing to serve.
#[derive(Debug, Default, Clone)]
pub struct ResourceRegistry {
    types: BTreeMap<String, ResourceTypeInfo>,
}

impl ResourceRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the v3 Envoy types and their legacy v2
    /// counterparts.
    #[must_use]
    pub fn with_envoy_types() -> Self {
        let mut registry = Self::new();
        for (type_url, description) in [
            (TypeUrl::CLUSTER, "Cluster Discovery Service (CDS)"),
            (TypeUrl::ENDPOINT, "Endpoint Discovery Service (EDS)"),
            (TypeUrl::LISTENER, "Listener Discovery Service (LDS)"),
            (TypeUrl::ROUTE, "Route Discovery Service (RDS)"),
            (TypeUrl::SECRET, "Secret Discovery Service (SDS)"),
            (TypeUrl::RUNTIME, "Runtime Discovery Service (RTDS)"),
            (TypeUrl::CLUSTER_V2, "Legacy Cluster Discovery Service"),
            (TypeUrl::ENDPOINT_V2, "Legacy Endpoint Discovery Service"),
            (TypeUrl::LISTENER_V2, "Legacy Listener Discovery Service"),
            (TypeUrl::ROUTE_V2, "Legacy Route Discovery Service"),
            (TypeUrl::SECRET_V2, "Legacy Secret Discovery Service"),
            (TypeUrl::RUNTIME_V2, "Legacy Runtime Discovery Service"),
        ] {
            registry.register(ResourceTypeInfo::new(type_url, description));
        }
        registry
    }

    /// Register a new resource type.
    pub fn register(&mut self, info: ResourceTypeInfo) {
        self.types.insert(info.type_url.clone(), info);
    }

    /// Get information about a resource type by type URL.
    #[must_use]
    pub fn get(&self, type_url: &str) -> Option<&ResourceTypeInfo> {
        self.types.get(type_url)
    }

    /// Check if a type URL is registered.
    #[must_use]
    pub fn contains(&self, type_url: &str) -> bool {
        self.types.contains_key(type_url)
    }

    /// Check that a type URL is registered for the given API version.
    #[must_use]
    pub fn supports(&self, type_url: &str, version: ApiVersion) -> bool {
        self.get(type_url).is_some_and(|info| info.api_version == Some(version))
    }

    /// Registered type URLs, sorted.
    #[must_use]
    pub fn type_urls(&self) -> Vec<&str> {
        self.types.keys().map(String::as_str).collect()
    }

    /// Get the number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
