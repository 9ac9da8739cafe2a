//! # gateway-xds
//!
//! Envoy control-plane core of the API gateway.
//!
//! Resources stored in namespaced collections are watched, merged into
//! versioned snapshots, checked for referential consistency and served to
//! proxies over the v3 and legacy v2 discovery protocols.
//!
//! ## Architecture
//!
//! - `xds-core` - errors, type URLs, the `Resource` trait and registry
//! - `xds-types` - discovery messages and proxy resource kinds
//! - `xds-cache` - snapshots, fingerprints, consistency, the watched cache
//! - `xds-sync` - the namespace-multiplexed snapshot emitter
//! - `xds-server` - discovery sessions, fetches and service traits
//!
//! This crate re-exports them for convenience.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use gateway_xds::prelude::*;
//!
//! # async fn run(clusters: InMemoryClient) -> XdsResult<()> {
//! let emitter = SnapshotEmitter::new(vec![WatchedResource::new(
//!     TypeUrl::CLUSTER,
//!     "clusters",
//!     Arc::new(clusters),
//! )]);
//! let server = XdsServer::builder()
//!     .cache(Arc::new(ShardedCache::new()))
//!     .build()?;
//!
//! let subscription = emitter
//!     .subscribe(["gloo-system"], SubscribeOptions::default())
//!     .await?;
//! let (snapshots, _errors, _task) = subscription.into_parts();
//! server.feed().run(snapshots, Default::default()).await;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

pub use xds_cache as cache;
pub use xds_core as core;
pub use xds_server as server;
pub use xds_sync as sync;
pub use xds_types as types;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use xds_core::{
        ApiVersion, BoxResource, NodeHash, Resource, ResourceRef, ResourceRegistry, TypeUrl,
        XdsError, XdsResult,
    };

    pub use xds_cache::{check_consistency, Cache, ShardedCache, Snapshot, Watch};

    pub use xds_sync::{
        EmitterConfig, InMemoryClient, ResourceClient, SnapshotEmitter, SubscribeOptions,
        Subscription, WatchOptions, WatchedResource,
    };

    pub use xds_server::{
        DiscoveryHandler, EnvoyServerV2, EnvoyServerV3, ServerConfig, SnapshotFeed, XdsServer,
        XdsServerBuilder,
    };

    pub use xds_types::EnvoyResource;
}

/// Version information for this crate.
pub mod version {
    /// Crate version.
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");

    /// Get version info as a string.
    pub fn version_string() -> String {
        format!("gateway-xds {VERSION}")
    }
}
