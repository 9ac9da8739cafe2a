//! Envoy protobuf packages, laid out as the upstream proto packages are.

pub mod api;
pub mod config;
pub mod extensions;
pub mod service;
