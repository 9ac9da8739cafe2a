//! # xds-core
//!
//! Shared vocabulary for the gateway control plane:
//!
//! - [`XdsError`] - error type with gRPC status mapping
//! - [`TypeUrl`] / [`ApiVersion`] - v3, legacy v2 and ADS type URLs
//! - [`Resource`] / [`ResourceRef`] - snapshot items and their dependencies
//! - [`ResourceRegistry`] - the resource types a server serves
//! - [`NodeHash`] - proxy node cache keys
//!
//! ## Example
//!
//! ```rust
//! use xds_core::{NodeHash, ResourceRef, TypeUrl};
//!
//! let node = NodeHash::from_id("gateway-proxy");
//! assert!(!node.is_wildcard());
//!
//! let dependency = ResourceRef::new(TypeUrl::ROUTE, "listener-80-routes");
//! assert_eq!(dependency.name, "listener-80-routes");
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod node;
mod resource;
mod type_url;

pub use error::XdsError;
pub use node::NodeHash;
pub use resource::{AnyResource, BoxResource, Resource, ResourceRef, ResourceRegistry, ResourceTypeInfo};
pub use type_url::{api_version_of, ApiVersion, TypeUrl};

/// Result type alias using [`XdsError`].
pub type Result<T> = std::result::Result<T, XdsError>;

/// Alias of [`Result`] used across the workspace.
pub type XdsResult<T> = Result<T>;
