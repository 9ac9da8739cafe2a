//! # xds-sync
//!
//! Turns watched resource stores into a stream of versioned snapshots.
//!
//! - [`WatchedResource`] - a resource type, its client and its ordering
//! - [`SnapshotEmitter`] - starts subscriptions over a set of namespaces
//! - [`Subscription`] - snapshot and error channels of one subscription
//! - [`InMemoryClient`] - a [`ResourceClient`] backed by process memory
//!
//! A subscription lists every (namespace, type) pair once, publishes the
//! result as its initial snapshot, then merges watch updates and publishes
//! a new snapshot on each resync tick where the content fingerprint moved.
//! A consumer that falls behind sees the newest state on a later tick,
//! never a queue of stale ones.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use xds_sync::{InMemoryClient, SnapshotEmitter, SubscribeOptions, WatchedResource};
//!
//! # async fn run() -> xds_core::XdsResult<()> {
//! let upstreams = InMemoryClient::new();
//! let emitter = SnapshotEmitter::new(vec![WatchedResource::new(
//!     "type.googleapis.com/gloo.solo.io.Upstream",
//!     "upstreams",
//!     Arc::new(upstreams.clone()),
//! )]);
//!
//! let mut subscription = emitter
//!     .subscribe(["gloo-system"], SubscribeOptions::default())
//!     .await?;
//! while let Some(snapshot) = subscription.next_snapshot().await {
//!     println!("snapshot {}", snapshot.version());
//! }
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod descriptor;
mod emitter;
mod memory;
mod multiplex;
mod publisher;
mod stats;


pub use client::{ResourceClient, ResourceWatch, WatchOptions};
pub use descriptor::{sort_by_name, SortFn, WatchedResource};
pub use emitter::{validate_namespaces, EmitterConfig, SnapshotEmitter, SubscribeOptions, Subscription};
pub use memory::InMemoryClient;
pub use multiplex::NamespaceMerge;
pub use stats::EmitterStats;
