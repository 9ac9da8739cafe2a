//! Per-stream discovery sessions.
//!
//! A session moves through `Init -> Streaming -> (Closed | Error)`. The
//! first request fixes the node and opens a cache watch. From then on every
//! requested type has its own ACK/NACK bookkeeping, and a type with an
//! outstanding request is answered as soon as the snapshot holds a version
//! the client does not have.

use std::collections::BTreeMap;
use std::pin::Pin;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tonic::Status;
use tracing::{debug, error, info, trace, warn};
use xds_cache::{Cache, ShardedCache, Snapshot, Watch};
use xds_core::{api_version_of, ApiVersion, NodeHash, ResourceRegistry, TypeUrl, XdsError};

use crate::metrics::{StreamTracker, XdsMetrics};
use crate::sotw::{build_response, SotwRequest, SotwResponse};
use crate::stream::StreamContext;

/// Lifecycle of a discovery stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for the first request.
    Init,
    /// Node known, serving requests.
    Streaming,
    /// Ended without error.
    Closed,
    /// Ended after sending an error status.
    Error,
}

/// Bookkeeping for one requested type.
#[derive(Debug, Default)]
struct TypeState {
    resource_names: Vec<String>,
    nonce: Option<String>,
    sent_version: Option<String>,
    known_version: String,
    rejected_version: Option<String>,
    names_changed: bool,
    pending: bool,
}

enum Step {
    Continue,
    Close(&'static str),
    Fail(Status),
}

/// Check that a type URL is served by a server of the given version.
pub(crate) fn check_type(
    registry: &ResourceRegistry,
    version: ApiVersion,
    type_url: &str,
) -> Result<(), Status> {
    if registry.supports(type_url, version) {
        return Ok(());
    }
    let reason = match api_version_of(type_url) {
        Some(other) if other != version => {
            format!("{other} type cannot be served by the {version} discovery service")
        }
        _ => "unsupported resource type".to_string(),
    };
    Err(XdsError::InvalidTypeUrl {
        type_url: type_url.to_string(),
        reason,
    }
    .into())
}

pub(crate) struct Session<Resp> {
    ctx: StreamContext,
    state: SessionState,
    default_type: String,
    api_version: ApiVersion,
    cache: Arc<ShardedCache>,
    registry: Arc<ResourceRegistry>,
    metrics: XdsMetrics,
    control_plane: Option<String>,
    node: NodeHash,
    watch: Option<Watch>,
    types: BTreeMap<String, TypeState>,
    responses: mpsc::Sender<Result<Resp, Status>>,
}

impl<Resp> Session<Resp>
where
    Resp: From<SotwResponse> + Send + 'static,
{
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        default_type: &str,
        api_version: ApiVersion,
        cache: Arc<ShardedCache>,
        registry: Arc<ResourceRegistry>,
        metrics: XdsMetrics,
        control_plane: Option<String>,
        responses: mpsc::Sender<Result<Resp, Status>>,
    ) -> Self {
        let service = if default_type.is_empty() {
            "ads".to_string()
        } else {
            TypeUrl::new(default_type).short_name().to_string()
        };
        Self {
            ctx: StreamContext::new(service),
            state: SessionState::Init,
            default_type: default_type.to_string(),
            api_version,
            cache,
            registry,
            metrics,
            control_plane,
            node: NodeHash::wildcard(),
            watch: None,
            types: BTreeMap::new(),
            responses,
        }
    }

    /// Serve the stream until it closes or fails. Returns the final state.
    pub(crate) async fn run<S, Req>(
        mut self,
        mut requests: Pin<Box<S>>,
        cancel: CancellationToken,
    ) -> SessionState
    where
        S: Stream<Item = Result<Req, Status>> + Send + ?Sized,
        Req: Into<SotwRequest> + Send,
    {
        let _tracker = StreamTracker::new(self.metrics.clone(), self.ctx.service());
        info!(
            stream = %self.ctx.id(),
            service = %self.ctx.service(),
            version = %self.api_version,
            "stream started"
        );

        loop {
            let step = tokio::select! {
                _ = cancel.cancelled() => Step::Close("server shutting down"),
                _ = self.responses.closed() => Step::Close("response receiver dropped"),
                notified = next_notification(&mut self.watch) => match notified {
                    Some(_) => self.on_snapshot().await,
                    None => {
                        debug!(stream = %self.ctx.id(), "cache watch closed");
                        self.watch = None;
                        Step::Continue
                    }
                },
                request = requests.next() => match request {
                    Some(Ok(request)) => self.on_request(request.into()).await,
                    Some(Err(status)) => {
                        debug!(stream = %self.ctx.id(), error = %status, "client stream error");
                        Step::Close("client stream error")
                    }
                    None => Step::Close("client closed the stream"),
                },
            };

            match step {
                Step::Continue => {}
                Step::Close(reason) => {
                    debug!(stream = %self.ctx.id(), reason, "closing stream");
                    self.state = SessionState::Closed;
                    break;
                }
                Step::Fail(status) => {
                    warn!(stream = %self.ctx.id(), error = %status, "stream failed");
                    self.state = SessionState::Error;
                    let _ = self.responses.send(Err(status)).await;
                    break;
                }
            }
        }

        if let Some(watch) = self.watch.take() {
            self.cache.cancel_watch(watch.id());
        }
        info!(
            stream = %self.ctx.id(),
            node = ?self.ctx.node_id(),
            duration = ?self.ctx.duration(),
            requests = self.ctx.request_count(),
            responses = self.ctx.response_count(),
            acks = self.ctx.ack_count(),
            nacks = self.ctx.nack_count(),
            state = ?self.state,
            "stream ended"
        );
        self.state
    }

    fn resolve_type(&self, requested: &str) -> Result<String, Status> {
        let type_url = if self.default_type.is_empty() {
            if requested.is_empty() {
                return Err(Status::invalid_argument(
                    "type URL is required on aggregated streams",
                ));
            }
            requested
        } else if requested.is_empty() || requested == self.default_type {
            self.default_type.as_str()
        } else {
            return Err(Status::invalid_argument(format!(
                "type URL {requested} does not match stream type {}",
                self.default_type
            )));
        };
        check_type(&self.registry, self.api_version, type_url)?;
        Ok(type_url.to_string())
    }

    fn open(&mut self, request: &SotwRequest) {
        self.node = NodeHash::from_optional_id(request.node_id.as_deref());
        self.ctx.set_node(request.node_id.clone(), self.node);
        self.watch = Some(self.cache.create_watch(self.node));
        self.state = SessionState::Streaming;
        debug!(
            stream = %self.ctx.id(),
            node = %self.node,
            node_id = ?request.node_id,
            "node identified"
        );
    }

    async fn on_request(&mut self, request: SotwRequest) -> Step {
        self.ctx.record_request();
        let type_url = match self.resolve_type(&request.type_url) {
            Ok(type_url) => type_url,
            Err(status) => return Step::Fail(status),
        };
        self.metrics.record_request(&type_url);
        if self.state == SessionState::Init {
            self.open(&request);
        }

        let state = self.types.entry(type_url.clone()).or_default();
        // Nonces are only checked once this stream has sent one; a proxy
        // reconnecting carries the nonce of its previous stream.
        let nonce_checked = !request.response_nonce.is_empty() && state.nonce.is_some();
        if nonce_checked && state.nonce.as_deref() != Some(request.response_nonce.as_str()) {
            debug!(
                stream = %self.ctx.id(),
                type_url = %type_url,
                nonce = %request.response_nonce,
                "ignoring request with stale nonce"
            );
            return Step::Continue;
        }

        if let Some(detail) = &request.error_detail {
            warn!(
                stream = %self.ctx.id(),
                type_url = %type_url,
                nonce = %request.response_nonce,
                version = %request.version_info,
                error = %detail,
                "received NACK"
            );
            self.ctx.record_nack();
            self.metrics.record_nack(&type_url);
            state.rejected_version = state.sent_version.clone();
        } else if nonce_checked {
            trace!(
                stream = %self.ctx.id(),
                type_url = %type_url,
                version = %request.version_info,
                "received ACK"
            );
            self.ctx.record_ack();
            self.metrics.record_ack(&type_url);
            state.rejected_version = None;
        }

        state.known_version = request.version_info;
        if state.resource_names != request.resource_names {
            state.resource_names = request.resource_names;
            state.names_changed = state.nonce.is_some();
        }
        state.pending = true;

        self.respond(&type_url).await
    }

    async fn on_snapshot(&mut self) -> Step {
        let pending: Vec<String> = self
            .types
            .iter()
            .filter(|(_, state)| state.pending)
            .map(|(type_url, _)| type_url.clone())
            .collect();
        for type_url in pending {
            match self.respond(&type_url).await {
                Step::Continue => {}
                other => return other,
            }
        }
        Step::Continue
    }

    async fn respond(&mut self, type_url: &str) -> Step {
        let Some(state) = self.types.get_mut(type_url) else {
            return Step::Continue;
        };
        if !state.pending {
            return Step::Continue;
        }
        let Some(snapshot) = self.cache.snapshot_for(self.node) else {
            trace!(stream = %self.ctx.id(), node = %self.node, "no snapshot yet");
            return Step::Continue;
        };
        if !needs_response(&snapshot, type_url, state) {
            trace!(stream = %self.ctx.id(), type_url, "client is up to date");
            return Step::Continue;
        }

        let mut response = match build_response(&snapshot, type_url, &state.resource_names) {
            Ok(Some(response)) => response,
            Ok(None) => return Step::Continue,
            Err(err) => {
                error!(stream = %self.ctx.id(), type_url, error = %err, "cannot encode response");
                return Step::Fail(Status::internal(err.to_string()));
            }
        };
        response.control_plane = self.control_plane.clone();

        state.nonce = Some(response.nonce.clone());
        state.sent_version = Some(response.version_info.clone());
        state.names_changed = false;
        state.pending = false;

        let count = response.resources.len();
        debug!(
            stream = %self.ctx.id(),
            type_url,
            version = %response.version_info,
            nonce = %response.nonce,
            count,
            "sending response"
        );
        if self.responses.send(Ok(Resp::from(response))).await.is_err() {
            return Step::Close("response receiver dropped");
        }
        self.ctx.record_response();
        self.metrics.record_response(type_url, count);
        Step::Continue
    }
}

fn needs_response(snapshot: &Snapshot, type_url: &str, state: &TypeState) -> bool {
    let Some(version) = snapshot.get_version(type_url) else {
        return false;
    };
    if state.names_changed {
        return true;
    }
    version != state.known_version && state.rejected_version.as_deref() != Some(version)
}

async fn next_notification(watch: &mut Option<Watch>) -> Option<Arc<Snapshot>> {
    match watch {
        Some(watch) => watch.recv().await,
        None => std::future::pending().await,
    }
}
