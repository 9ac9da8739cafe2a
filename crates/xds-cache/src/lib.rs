//! # xds-cache
//!
//! Snapshot model and cache for the gateway control plane.
//!
//! - [`Snapshot`] - ordered, versioned resource collections
//! - [`Fingerprint`] - content hash used for change detection and versions
//! - [`Snapshot::consistent`] - cross-collection reference validation
//! - [`ShardedCache`] - `DashMap` store with wildcard fallback and watches
//!
//! ## Example
//!
//! ```rust
//! use xds_cache::{Cache, ShardedCache, Snapshot};
//! use xds_core::NodeHash;
//!
//! let mut snapshot = Snapshot::envoy();
//! let fingerprint = snapshot.fingerprint().expect("empty snapshot encodes");
//! snapshot.stamp(&fingerprint);
//! snapshot.consistent().expect("empty snapshot is consistent");
//!
//! let cache = ShardedCache::new();
//! cache.set_snapshot(NodeHash::wildcard(), snapshot);
//! assert!(cache.snapshot_for(NodeHash::from_id("proxy-1")).is_some());
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod cache;
mod consistency;
mod fingerprint;
mod snapshot;
mod stats;
mod watch;

pub use cache::{Cache, CacheBuilder, ShardedCache};
pub use consistency::{check_consistency, DEPENDENCIES};
pub use fingerprint::Fingerprint;
pub use snapshot::{Snapshot, SnapshotBuilder, SnapshotResources, ENVOY_TYPES};
pub use stats::CacheStats;
pub use watch::{Watch, WatchId, WatchManager};
