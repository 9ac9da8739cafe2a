//! Server metrics.
//!
//! Counters go to the `metrics` facade; the embedder installs whichever
//! recorder it exports with. Active streams are also tracked in memory.
//!
//! ```rust
//! use xds_server::XdsMetrics;
//!
//! let metrics = XdsMetrics::new();
//! metrics.stream_opened("ads");
//! metrics.record_request("type.googleapis.com/envoy.config.cluster.v3.Cluster");
//! assert_eq!(metrics.active_streams(), 1);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, gauge, histogram};

/// Metrics of the discovery server. Clones share the same counters.
#[derive(Debug, Clone, Default)]
pub struct XdsMetrics {
    inner: Arc<XdsMetricsInner>,
}

#[derive(Debug, Default)]
struct XdsMetricsInner {
    active_streams: AtomicU64,
    snapshots_accepted: AtomicU64,
    snapshots_rejected: AtomicU64,
}

impl XdsMetrics {
    /// Create a new metrics instance.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an incoming request.
    pub fn record_request(&self, type_url: &str) {
        counter!("xds_requests_total", "type_url" => type_url.to_string()).increment(1);
    }

    /// Record a response sent.
    pub fn record_response(&self, type_url: &str, resources: usize) {
        counter!("xds_responses_total", "type_url" => type_url.to_string()).increment(1);
        histogram!("xds_response_resources", "type_url" => type_url.to_string())
            .record(resources as f64);
    }

    /// Record a NACK (negative acknowledgment).
    pub fn record_nack(&self, type_url: &str) {
        counter!("xds_nacks_total", "type_url" => type_url.to_string()).increment(1);
    }

    /// Record an ACK (acknowledgment).
    pub fn record_ack(&self, type_url: &str) {
        counter!("xds_acks_total", "type_url" => type_url.to_string()).increment(1);
    }

    /// Record a stream opened.
    pub fn stream_opened(&self, service: &str) {
        let count = self.inner.active_streams.fetch_add(1, Ordering::Relaxed) + 1;
        counter!("xds_streams_opened_total", "service" => service.to_string()).increment(1);
        gauge!("xds_active_streams").set(count as f64);
    }

    /// Record a stream closed.
    pub fn stream_closed(&self, service: &str, duration: Duration) {
        let count = self
            .inner
            .active_streams
            .fetch_sub(1, Ordering::Relaxed)
            .saturating_sub(1);
        counter!("xds_streams_closed_total", "service" => service.to_string()).increment(1);
        gauge!("xds_active_streams").set(count as f64);
        histogram!("xds_stream_duration_seconds", "service" => service.to_string())
            .record(duration.as_secs_f64());
    }

    /// Record a snapshot stored in the cache.
    pub fn snapshot_accepted(&self, resources: usize) {
        self.inner.snapshots_accepted.fetch_add(1, Ordering::Relaxed);
        counter!("xds_snapshots_accepted_total").increment(1);
        gauge!("xds_snapshot_resources").set(resources as f64);
    }

    /// Record a snapshot refused by the consistency check.
    pub fn snapshot_rejected(&self) {
        self.inner.snapshots_rejected.fetch_add(1, Ordering::Relaxed);
        counter!("xds_snapshots_rejected_total").increment(1);
    }

    /// Get the current number of active streams.
    pub fn active_streams(&self) -> u64 {
        self.inner.active_streams.load(Ordering::Relaxed)
    }

    /// Snapshots stored in the cache so far.
    pub fn snapshots_accepted(&self) -> u64 {
        self.inner.snapshots_accepted.load(Ordering::Relaxed)
    }

    /// Snapshots refused so far.
    pub fn snapshots_rejected(&self) -> u64 {
        self.inner.snapshots_rejected.load(Ordering::Relaxed)
    }
}

/// Stream duration tracker.
///
/// Records the stream as opened on creation and as closed when dropped.
#[derive(Debug)]
pub struct StreamTracker {
    start: Instant,
    service: String,
    metrics: XdsMetrics,
}

impl StreamTracker {
    /// Create a new stream tracker.
    pub fn new(metrics: XdsMetrics, service: impl Into<String>) -> Self {
        let service = service.into();
        metrics.stream_opened(&service);
        Self {
            start: Instant::now(),
            service,
            metrics,
        }
    }
}

impl Drop for StreamTracker {
    fn drop(&mut self) {
        self.metrics
            .stream_closed(&self.service, self.start.elapsed());
    }
}
