//! End-to-end tests for gateway-xds.
//!
//! [`fixtures`] builds proxy resources with real cross references; the
//! test modules drive the emitter, feed, cache and discovery services
//! together.

pub mod fixtures;

#[cfg(test)]
mod consistency_tests;
#[cfg(test)]
mod pipeline_tests;
