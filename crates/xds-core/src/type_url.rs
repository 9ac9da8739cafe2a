//! Type URL handling for xDS resources.
//!
//! Carries the v3 type URLs, the deprecated v2 type URLs still served to
//! legacy proxies, and the aggregated "any type" used by ADS.

use std::borrow::Borrow;
use std::fmt;

/// Major version of the discovery API a type URL belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ApiVersion {
    /// Deprecated `envoy.api.v2` API.
    V2,
    /// Current `envoy.config.*.v3` API.
    V3,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::V2 => f.write_str("v2"),
            Self::V3 => f.write_str("v3"),
        }
    }
}

/// Type URL wrapper for xDS resource types.
///
/// Type URLs order lexicographically so snapshot collections iterate in a
/// stable order.
///
/// # Example
///
/// ```rust
/// use xds_core::{ApiVersion, TypeUrl};
///
/// let cluster_type = TypeUrl::new(TypeUrl::CLUSTER);
/// assert_eq!(cluster_type.short_name(), "Cluster");
/// assert_eq!(cluster_type.api_version(), Some(ApiVersion::V3));
///
/// let legacy = TypeUrl::new(TypeUrl::CLUSTER_V2);
/// assert_eq!(legacy.api_version(), Some(ApiVersion::V2));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeUrl(String);

impl TypeUrl {
    /// Type URL for Cluster (CDS).
    pub const CLUSTER: &'static str = "type.googleapis.com/envoy.config.cluster.v3.Cluster";

    /// Type URL for ClusterLoadAssignment (EDS).
    pub const ENDPOINT: &'static str =
        "type.googleapis.com/envoy.config.endpoint.v3.ClusterLoadAssignment";

    /// Type URL for Listener (LDS).
    pub const LISTENER: &'static str = "type.googleapis.com/envoy.config.listener.v3.Listener";

    /// Type URL for RouteConfiguration (RDS).
    pub const ROUTE: &'static str =
        "type.googleapis.com/envoy.config.route.v3.RouteConfiguration";

    /// Type URL for Secret (SDS).
    pub const SECRET: &'static str =
        "type.googleapis.com/envoy.extensions.transport_sockets.tls.v3.Secret";

    /// Type URL for Runtime (RTDS).
    pub const RUNTIME: &'static str = "type.googleapis.com/envoy.service.runtime.v3.Runtime";

    /// Legacy v2 Cluster.
    pub const CLUSTER_V2: &'static str = "type.googleapis.com/envoy.api.v2.Cluster";

    /// Legacy v2 ClusterLoadAssignment.
    pub const ENDPOINT_V2: &'static str =
        "type.googleapis.com/envoy.api.v2.ClusterLoadAssignment";

    /// Legacy v2 Listener.
    pub const LISTENER_V2: &'static str = "type.googleapis.com/envoy.api.v2.Listener";

    /// Legacy v2 RouteConfiguration.
    pub const ROUTE_V2: &'static str = "type.googleapis.com/envoy.api.v2.RouteConfiguration";

    /// Legacy v2 Secret.
    pub const SECRET_V2: &'static str = "type.googleapis.com/envoy.api.v2.auth.Secret";

    /// Legacy v2 Runtime.
    pub const RUNTIME_V2: &'static str =
        "type.googleapis.com/envoy.service.discovery.v2.Runtime";

    /// The aggregated "any type". Only valid on ADS streams, where the
    /// concrete type comes from each request.
    pub const ANY: &'static str = "";

    /// Create a new type URL from a string.
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self(url.into())
    }

    /// Get the type URL as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Extract the short name from the type URL.
    ///
    /// For example, `type.googleapis.com/envoy.config.cluster.v3.Cluster`
    /// returns `Cluster`.
    #[must_use]
    pub fn short_name(&self) -> &str {
        self.0.rsplit('/').next().and_then(|s| s.rsplit('.').next()).unwrap_or(&self.0)
    }

    /// Check if this is a valid xDS type URL.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.0.starts_with("type.googleapis.com/")
    }

    /// Whether this is the aggregated "any type".
    #[must_use]
    pub fn is_any(&self) -> bool {
        self.0 == Self::ANY
    }

    /// The API major version of a well-known type URL.
    ///
    /// Returns `None` for the "any type" and for URLs outside the
    /// `envoy.*` namespaces.
    #[must_use]
    pub fn api_version(&self) -> Option<ApiVersion> {
        api_version_of(&self.0)
    }

    /// Consume and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

/// The API major version of a raw type URL string.
#[must_use]
pub fn api_version_of(type_url: &str) -> Option<ApiVersion> {
    let message = type_url.strip_prefix("type.googleapis.com/")?;
    if message.starts_with("envoy.api.v2.") || message.starts_with("envoy.service.discovery.v2.")
    {
        Some(ApiVersion::V2)
    } else if message.starts_with("envoy.") && message.contains(".v3.") {
        Some(ApiVersion::V3)
    } else {
        None
    }
}

impl fmt::Display for TypeUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TypeUrl {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TypeUrl {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<TypeUrl> for String {
    fn from(t: TypeUrl) -> Self {
        t.0
    }
}

impl AsRef<str> for TypeUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for TypeUrl {
    fn borrow(&self) -> &str {
        &self.0
    }
}
