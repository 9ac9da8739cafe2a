//! # xds-types
//!
//! Protobuf messages for the Envoy discovery protocol and the proxy
//! resources the control plane serves.
//!
//! Messages are declared with `prost` derives and keep the upstream field
//! tags, so they interoperate with proxies on the wire. Only the fields
//! the control plane reads are modelled.
//!
//! [`EnvoyResource`] wraps the v3 and legacy v2 resource kinds behind the
//! [`xds_core::Resource`] trait and extracts their cross-resource
//! references.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub use prost::Message;
pub use prost_types::Any;

pub mod envoy;
pub mod google;
pub mod wellknown;

mod resource;

pub use resource::EnvoyResource;
