//! # xds-server
//!
//! Discovery protocol layer of the gateway control plane.
//!
//! - [`DiscoveryHandler`] runs state-of-the-world sessions and fetches
//!   against a [`ShardedCache`], independent of the API version.
//! - [`services::v3`] and [`services::v2`] declare the per-type and
//!   aggregated discovery services and implement them on
//!   [`EnvoyServerV3`] and [`EnvoyServerV2`]. Incremental methods answer
//!   `unimplemented`.
//! - [`SnapshotFeed`] stores only referentially consistent snapshots.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use xds_cache::ShardedCache;
//! use xds_server::XdsServer;
//!
//! # fn main() -> xds_core::XdsResult<()> {
//! let server = XdsServer::builder()
//!     .cache(Arc::new(ShardedCache::new()))
//!     .build()?;
//!
//! let v3 = server.v3();
//! let v2 = server.v2()?;
//! let feed = server.feed();
//! # let _ = (v3, v2, feed);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod builder;
mod config;
mod feed;
mod handler;
pub mod metrics;
mod session;
mod sotw;
mod stream;
mod utils;

pub mod services;

pub use builder::XdsServerBuilder;
pub use config::ServerConfig;
pub use feed::SnapshotFeed;
pub use handler::DiscoveryHandler;
pub use crate::metrics::{StreamTracker, XdsMetrics};
pub use services::v2::EnvoyServerV2;
pub use services::v3::EnvoyServerV3;
pub use session::SessionState;
pub use sotw::{build_response, SotwRequest, SotwResponse};
pub use stream::{StreamContext, StreamId};
pub use utils::generate_nonce;

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::info;
use xds_cache::ShardedCache;
use xds_core::{ApiVersion, ResourceRegistry, XdsError, XdsResult};

/// The discovery server: shared cache, registry and configuration, from
/// which the versioned service implementations are created.
#[derive(Debug)]
pub struct XdsServer {
    cache: Arc<ShardedCache>,
    registry: Arc<ResourceRegistry>,
    config: Arc<ServerConfig>,
    metrics: XdsMetrics,
    shutdown: CancellationToken,
}

impl XdsServer {
    pub(crate) fn new(
        cache: Arc<ShardedCache>,
        registry: Arc<ResourceRegistry>,
        config: ServerConfig,
    ) -> Self {
        Self {
            cache,
            registry,
            config: Arc::new(config),
            metrics: XdsMetrics::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Create a new builder for configuring the server.
    pub fn builder() -> XdsServerBuilder {
        XdsServerBuilder::new()
    }

    /// Get a reference to the cache.
    #[inline]
    pub fn cache(&self) -> &Arc<ShardedCache> {
        &self.cache
    }

    /// Get a reference to the resource registry.
    #[inline]
    pub fn registry(&self) -> &Arc<ResourceRegistry> {
        &self.registry
    }

    /// Get the server configuration.
    #[inline]
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Metrics shared by every service and the feed.
    #[inline]
    pub fn metrics(&self) -> &XdsMetrics {
        &self.metrics
    }

    /// A handler for `version`.
    pub fn handler(&self, version: ApiVersion) -> DiscoveryHandler {
        DiscoveryHandler::new(
            Arc::clone(&self.cache),
            Arc::clone(&self.registry),
            version,
            Arc::clone(&self.config),
            self.metrics.clone(),
            self.shutdown.child_token(),
        )
    }

    /// The v3 discovery services.
    pub fn v3(&self) -> EnvoyServerV3 {
        EnvoyServerV3::new(self.handler(ApiVersion::V3))
    }

    /// The legacy v2 discovery services.
    ///
    /// # Errors
    ///
    /// Returns [`XdsError::Configuration`] when legacy v2 is disabled.
    pub fn v2(&self) -> XdsResult<EnvoyServerV2> {
        if !self.config.enable_legacy_v2 {
            return Err(XdsError::Configuration("legacy v2 services are disabled".into()));
        }
        Ok(EnvoyServerV2::new(self.handler(ApiVersion::V2)))
    }

    /// A consistency-gated feed into the cache.
    pub fn feed(&self) -> SnapshotFeed {
        SnapshotFeed::new(Arc::clone(&self.cache), self.metrics.clone())
    }

    /// Close every open discovery stream.
    pub fn shutdown(&self) {
        info!(active_streams = self.metrics.active_streams(), "shutting down discovery server");
        self.shutdown.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn server(legacy: bool) -> XdsServer {
        XdsServerBuilder::new()
            .cache(Arc::new(ShardedCache::new()))
            .enable_legacy_v2(legacy)
            .build()
            .expect("build")
    }

    #[test]
    fn versions_get_their_own_handler() {
        let server = server(true);
        assert_eq!(server.v3().handler().api_version(), ApiVersion::V3);
        assert_eq!(server.v2().expect("v2").handler().api_version(), ApiVersion::V2);
    }

    #[test]
    fn disabled_legacy_has_no_v2_services() {
        let server = server(false);
        assert!(matches!(server.v2(), Err(XdsError::Configuration(_))));
    }

    #[test]
    fn services_share_the_cache() {
        let server = server(true);
        assert!(Arc::ptr_eq(server.v3().handler().cache(), server.cache()));
        assert!(Arc::ptr_eq(server.v2().expect("v2").handler().cache(), server.cache()));
    }
}
