//! Stream identification and per-stream counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use xds_core::NodeHash;

/// Unique identifier for a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StreamId(u64);

impl StreamId {
    /// Generate a new unique stream ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the numeric value.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for StreamId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for StreamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "stream-{}", self.0)
    }
}

/// Context of one discovery stream.
///
/// Owned by the session task; the node is fixed by the first request.
#[derive(Debug)]
pub struct StreamContext {
    id: StreamId,
    service: String,
    node_hash: Option<NodeHash>,
    node_id: Option<String>,
    created_at: Instant,
    requests: u64,
    responses: u64,
    acks: u64,
    nacks: u64,
}

impl StreamContext {
    /// Create a context for a stream of the given service.
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            id: StreamId::new(),
            service: service.into(),
            node_hash: None,
            node_id: None,
            created_at: Instant::now(),
            requests: 0,
            responses: 0,
            acks: 0,
            nacks: 0,
        }
    }

    /// Get the stream ID.
    #[inline]
    pub fn id(&self) -> StreamId {
        self.id
    }

    /// Service label, `ads` or the short name of the served type.
    #[inline]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Get the node hash if set.
    #[inline]
    pub fn node_hash(&self) -> Option<NodeHash> {
        self.node_hash
    }

    /// Get the node ID if set.
    #[inline]
    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    /// Set the node information.
    pub fn set_node(&mut self, node_id: Option<String>, node_hash: NodeHash) {
        self.node_id = node_id;
        self.node_hash = Some(node_hash);
    }

    /// Get stream duration.
    #[inline]
    pub fn duration(&self) -> Duration {
        self.created_at.elapsed()
    }

    pub(crate) fn record_request(&mut self) {
        self.requests += 1;
    }

    pub(crate) fn record_response(&mut self) {
        self.responses += 1;
    }

    pub(crate) fn record_ack(&mut self) {
        self.acks += 1;
    }

    pub(crate) fn record_nack(&mut self) {
        self.nacks += 1;
    }

    /// Requests received.
    #[inline]
    pub fn request_count(&self) -> u64 {
        self.requests
    }

    /// Responses sent.
    #[inline]
    pub fn response_count(&self) -> u64 {
        self.responses
    }

    /// Acknowledged responses.
    #[inline]
    pub fn ack_count(&self) -> u64 {
        self.acks
    }

    /// Rejected responses.
    #[inline]
    pub fn nack_count(&self) -> u64 {
        self.nacks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_id_unique() {
        let id1 = StreamId::new();
        let id2 = StreamId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn stream_context_counting() {
        let mut ctx = StreamContext::new("ads");
        ctx.record_request();
        ctx.record_request();
        ctx.record_response();
        ctx.record_nack();

        assert_eq!(ctx.request_count(), 2);
        assert_eq!(ctx.response_count(), 1);
        assert_eq!(ctx.ack_count(), 0);
        assert_eq!(ctx.nack_count(), 1);
        assert_eq!(ctx.service(), "ads");
    }

    #[test]
    fn stream_context_node() {
        let mut ctx = StreamContext::new("Cluster");
        assert!(ctx.node_hash().is_none());

        let hash = NodeHash::from_id("gateway-proxy");
        ctx.set_node(Some("gateway-proxy".to_string()), hash);
        assert_eq!(ctx.node_id(), Some("gateway-proxy"));
        assert_eq!(ctx.node_hash(), Some(hash));
    }
}
