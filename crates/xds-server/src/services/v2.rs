//! Legacy `envoy.api.v2` discovery services.
//!
//! Served next to v3 for proxies that have not migrated. The two versions
//! share the cache but not their streams, and each rejects the other's
//! type URLs.

use async_trait::async_trait;
use futures::Stream;
use tonic::{Request, Response, Status};
use tracing::instrument;
use xds_core::{ApiVersion, TypeUrl};
use xds_types::envoy::api::v2::{
    DeltaDiscoveryRequest, DeltaDiscoveryResponse, DiscoveryRequest, DiscoveryResponse,
};

use super::{delta_unimplemented, discovery_service, RequestStream, ResponseStream};
use crate::handler::DiscoveryHandler;

/// Serves every v2 discovery service from one handler.
#[derive(Debug, Clone)]
pub struct EnvoyServerV2 {
    handler: DiscoveryHandler,
}

impl EnvoyServerV2 {
    /// Wrap a v2 handler.
    pub fn new(handler: DiscoveryHandler) -> Self {
        debug_assert_eq!(handler.api_version(), ApiVersion::V2);
        Self { handler }
    }

    /// The underlying handler.
    pub fn handler(&self) -> &DiscoveryHandler {
        &self.handler
    }
}

discovery_service! {
    /// `envoy.api.v2.EndpointDiscoveryService`.
    pub trait EndpointDiscoveryService for EnvoyServerV2 {
        type_url: TypeUrl::ENDPOINT_V2,
        messages: (DiscoveryRequest, DiscoveryResponse, DeltaDiscoveryRequest, DeltaDiscoveryResponse),
        stream: stream_endpoints -> StreamEndpointsStream,
        delta: delta_endpoints -> DeltaEndpointsStream,
        fetch: fetch_endpoints,
    }
}

discovery_service! {
    /// `envoy.api.v2.ClusterDiscoveryService`.
    pub trait ClusterDiscoveryService for EnvoyServerV2 {
        type_url: TypeUrl::CLUSTER_V2,
        messages: (DiscoveryRequest, DiscoveryResponse, DeltaDiscoveryRequest, DeltaDiscoveryResponse),
        stream: stream_clusters -> StreamClustersStream,
        delta: delta_clusters -> DeltaClustersStream,
        fetch: fetch_clusters,
    }
}

discovery_service! {
    /// `envoy.api.v2.RouteDiscoveryService`.
    pub trait RouteDiscoveryService for EnvoyServerV2 {
        type_url: TypeUrl::ROUTE_V2,
        messages: (DiscoveryRequest, DiscoveryResponse, DeltaDiscoveryRequest, DeltaDiscoveryResponse),
        stream: stream_routes -> StreamRoutesStream,
        delta: delta_routes -> DeltaRoutesStream,
        fetch: fetch_routes,
    }
}

discovery_service! {
    /// `envoy.api.v2.ListenerDiscoveryService`.
    pub trait ListenerDiscoveryService for EnvoyServerV2 {
        type_url: TypeUrl::LISTENER_V2,
        messages: (DiscoveryRequest, DiscoveryResponse, DeltaDiscoveryRequest, DeltaDiscoveryResponse),
        stream: stream_listeners -> StreamListenersStream,
        delta: delta_listeners -> DeltaListenersStream,
        fetch: fetch_listeners,
    }
}

/// `envoy.service.discovery.v2.AggregatedDiscoveryService`.
#[async_trait]
pub trait AggregatedDiscoveryService: Send + Sync + 'static {
    /// Response stream of `stream_aggregated_resources`.
    type StreamAggregatedResourcesStream: Stream<Item = Result<DiscoveryResponse, Status>>
        + Send
        + 'static;

    /// Response stream of `delta_aggregated_resources`.
    type DeltaAggregatedResourcesStream: Stream<Item = Result<DeltaDiscoveryResponse, Status>>
        + Send
        + 'static;

    /// Every resource type over one stream.
    async fn stream_aggregated_resources(
        &self,
        request: Request<RequestStream<DiscoveryRequest>>,
    ) -> Result<Response<Self::StreamAggregatedResourcesStream>, Status>;

    /// Incremental aggregated stream. Not supported.
    async fn delta_aggregated_resources(
        &self,
        request: Request<RequestStream<DeltaDiscoveryRequest>>,
    ) -> Result<Response<Self::DeltaAggregatedResourcesStream>, Status>;
}

#[async_trait]
impl AggregatedDiscoveryService for EnvoyServerV2 {
    type StreamAggregatedResourcesStream = ResponseStream<DiscoveryResponse>;
    type DeltaAggregatedResourcesStream = ResponseStream<DeltaDiscoveryResponse>;

    #[instrument(skip_all, name = "ads_v2_stream")]
    async fn stream_aggregated_resources(
        &self,
        request: Request<RequestStream<DiscoveryRequest>>,
    ) -> Result<Response<Self::StreamAggregatedResourcesStream>, Status> {
        Ok(Response::new(
            self.handler.stream(request.into_inner(), TypeUrl::ANY),
        ))
    }

    async fn delta_aggregated_resources(
        &self,
        _request: Request<RequestStream<DeltaDiscoveryRequest>>,
    ) -> Result<Response<Self::DeltaAggregatedResourcesStream>, Status> {
        Err(delta_unimplemented())
    }
}
