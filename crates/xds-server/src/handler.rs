//! Version-generic discovery request handling.

use std::sync::Arc;

use futures::Stream;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tonic::Status;
use tracing::{debug, instrument};
use xds_cache::{Cache, ShardedCache};
use xds_core::{ApiVersion, NodeHash, ResourceRegistry};

use crate::config::ServerConfig;
use crate::metrics::XdsMetrics;
use crate::session::{check_type, Session};
use crate::sotw::{build_response, SotwRequest, SotwResponse};

/// Serves discovery streams and fetches for one API major version.
///
/// Every service method of a version delegates here with its own type URL
/// constant; the aggregated service passes [`xds_core::TypeUrl::ANY`].
#[derive(Debug, Clone)]
pub struct DiscoveryHandler {
    cache: Arc<ShardedCache>,
    registry: Arc<ResourceRegistry>,
    api_version: ApiVersion,
    config: Arc<ServerConfig>,
    metrics: XdsMetrics,
    shutdown: CancellationToken,
}

impl DiscoveryHandler {
    /// Create a handler for the given API version.
    pub fn new(
        cache: Arc<ShardedCache>,
        registry: Arc<ResourceRegistry>,
        api_version: ApiVersion,
        config: Arc<ServerConfig>,
        metrics: XdsMetrics,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            cache,
            registry,
            api_version,
            config,
            metrics,
            shutdown,
        }
    }

    /// The API version served.
    #[inline]
    pub fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    /// The cache responses are built from.
    #[inline]
    pub fn cache(&self) -> &Arc<ShardedCache> {
        &self.cache
    }

    /// Serve a bidirectional stream.
    ///
    /// `default_type` is the type of a per-type service, or `""` for the
    /// aggregated service. The session runs in its own task and ends when
    /// the client closes its side, the returned stream is dropped, or the
    /// server shuts down.
    pub fn stream<S, Req, Resp>(
        &self,
        requests: S,
        default_type: &str,
    ) -> ReceiverStream<Result<Resp, Status>>
    where
        S: Stream<Item = Result<Req, Status>> + Send + 'static,
        Req: Into<SotwRequest> + Send + 'static,
        Resp: From<SotwResponse> + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(self.config.response_buffer_size.max(1));
        let session = Session::new(
            default_type,
            self.api_version,
            Arc::clone(&self.cache),
            Arc::clone(&self.registry),
            self.metrics.clone(),
            self.config.control_plane_id.clone(),
            tx,
        );
        tokio::spawn(session.run(Box::pin(requests), self.shutdown.child_token()));
        ReceiverStream::new(rx)
    }

    /// Answer a one-shot fetch for `type_url`.
    ///
    /// The request's own type URL is ignored. A client that already holds
    /// the current version gets `unavailable`, as does a fetch made before
    /// any snapshot exists.
    #[allow(clippy::result_large_err)]
    #[instrument(skip(self, request), fields(version = %self.api_version))]
    pub fn fetch<Req, Resp>(&self, request: Option<Req>, type_url: &str) -> Result<Resp, Status>
    where
        Req: Into<SotwRequest>,
        Resp: From<SotwResponse>,
    {
        let Some(request) = request else {
            return Err(Status::unavailable("empty request"));
        };
        let mut request: SotwRequest = request.into();
        request.type_url = type_url.to_string();
        self.metrics.record_request(type_url);
        check_type(&self.registry, self.api_version, type_url)?;

        let node = NodeHash::from_optional_id(request.node_id.as_deref());
        let snapshot = self
            .cache
            .snapshot_for(node)
            .ok_or_else(|| Status::unavailable("no snapshot available"))?;
        let version = snapshot
            .get_version(type_url)
            .ok_or_else(|| Status::unavailable(format!("no {type_url} resources available")))?;
        if request.version_info == version {
            debug!(node = %node, version, "fetch skipped, client is up to date");
            return Err(Status::unavailable("skip fetch: version up to date"));
        }

        let mut response = build_response(&snapshot, type_url, &request.resource_names)
            .map_err(|e| Status::internal(e.to_string()))?
            .ok_or_else(|| Status::unavailable(format!("no {type_url} resources available")))?;
        response.control_plane = self.config.control_plane_id.clone();

        debug!(
            node = %node,
            version = %response.version_info,
            count = response.resources.len(),
            "answering fetch"
        );
        self.metrics.record_response(type_url, response.resources.len());
        Ok(Resp::from(response))
    }

    /// Close every open stream of this handler.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }
}
