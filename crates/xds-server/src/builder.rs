//! Server builder.

use std::sync::Arc;

use xds_cache::ShardedCache;
use xds_core::{ResourceRegistry, XdsError, XdsResult};

use crate::config::ServerConfig;
use crate::XdsServer;

/// Builder for an [`XdsServer`].
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use xds_cache::ShardedCache;
/// use xds_server::XdsServerBuilder;
///
/// let server = XdsServerBuilder::new()
///     .cache(Arc::new(ShardedCache::new()))
///     .response_buffer_size(32)
///     .control_plane_id("gloo")
///     .build()
///     .unwrap();
/// assert_eq!(server.config().response_buffer_size, 32);
/// ```
#[derive(Debug, Default)]
pub struct XdsServerBuilder {
    cache: Option<Arc<ShardedCache>>,
    registry: Option<Arc<ResourceRegistry>>,
    config: ServerConfig,
}

impl XdsServerBuilder {
    /// Create a new server builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the cache to serve from. Required.
    pub fn cache(mut self, cache: Arc<ShardedCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Set the resource registry.
    ///
    /// Defaults to every Envoy type, legacy v2 types included.
    pub fn registry(mut self, registry: Arc<ResourceRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Responses buffered per stream.
    pub fn response_buffer_size(mut self, size: usize) -> Self {
        self.config.response_buffer_size = size;
        self
    }

    /// Serve the v2 discovery services (enabled by default).
    pub fn enable_legacy_v2(mut self, enable: bool) -> Self {
        self.config.enable_legacy_v2 = enable;
        self
    }

    /// Identifier reported to proxies as the control plane.
    pub fn control_plane_id(mut self, id: impl Into<String>) -> Self {
        self.config.control_plane_id = Some(id.into());
        self
    }

    /// Build the server.
    ///
    /// # Errors
    ///
    /// Returns [`XdsError::Configuration`] if no cache was provided or the
    /// response buffer size is zero.
    pub fn build(self) -> XdsResult<XdsServer> {
        let cache = self
            .cache
            .ok_or_else(|| XdsError::Configuration("cache is required".into()))?;
        if self.config.response_buffer_size == 0 {
            return Err(XdsError::Configuration(
                "response buffer size must be positive".into(),
            ));
        }
        let registry = self
            .registry
            .unwrap_or_else(|| Arc::new(ResourceRegistry::with_envoy_types()));

        Ok(XdsServer::new(cache, registry, self.config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_is_required() {
        let err = XdsServerBuilder::new().build().unwrap_err();
        assert!(matches!(err, XdsError::Configuration(_)));
    }

    #[test]
    fn zero_buffer_is_rejected() {
        let err = XdsServerBuilder::new()
            .cache(Arc::new(ShardedCache::new()))
            .response_buffer_size(0)
            .build()
            .unwrap_err();
        assert!(matches!(err, XdsError::Configuration(_)));
    }

    #[test]
    fn defaults_serve_every_envoy_type() {
        let server = XdsServerBuilder::new()
            .cache(Arc::new(ShardedCache::new()))
            .build()
            .expect("build");
        assert_eq!(server.registry().len(), ResourceRegistry::with_envoy_types().len());
        assert!(server.config().enable_legacy_v2);
        assert!(server.config().control_plane_id.is_none());
    }
}
