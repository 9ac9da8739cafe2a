//! Well-known filter names and extension type URLs.

/// Name of the HTTP connection manager network filter.
pub const HTTP_CONNECTION_MANAGER: &str = "envoy.filters.network.http_connection_manager";

/// Type URL of the v3 HTTP connection manager config.
pub const HTTP_CONNECTION_MANAGER_V3: &str = "type.googleapis.com/envoy.extensions.filters.network.http_connection_manager.v3.HttpConnectionManager";

/// Type URL of the v2 HTTP connection manager config.
pub const HTTP_CONNECTION_MANAGER_V2: &str =
    "type.googleapis.com/envoy.config.filter.network.http_connection_manager.v2.HttpConnectionManager";
