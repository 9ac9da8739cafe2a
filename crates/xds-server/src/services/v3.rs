//! `envoy.service.*.v3` discovery services.

use async_trait::async_trait;
use futures::Stream;
use tonic::{Request, Response, Status};
use tracing::instrument;
use xds_core::{ApiVersion, TypeUrl};
use xds_types::envoy::service::discovery::v3::{
    DeltaDiscoveryRequest, DeltaDiscoveryResponse, DiscoveryRequest, DiscoveryResponse,
};

use super::{delta_unimplemented, discovery_service, RequestStream, ResponseStream};
use crate::handler::DiscoveryHandler;

/// Serves every v3 discovery service from one handler.
#[derive(Debug, Clone)]
pub struct EnvoyServerV3 {
    handler: DiscoveryHandler,
}

impl EnvoyServerV3 {
    /// Wrap a v3 handler.
    ///
    /// # Panics
    ///
    /// Debug builds assert that the handler serves v3.
    pub fn new(handler: DiscoveryHandler) -> Self {
        debug_assert_eq!(handler.api_version(), ApiVersion::V3);
        Self { handler }
    }

    /// The underlying handler.
    pub fn handler(&self) -> &DiscoveryHandler {
        &self.handler
    }
}

discovery_service! {
    /// `envoy.service.endpoint.v3.EndpointDiscoveryService`.
    pub trait EndpointDiscoveryService for EnvoyServerV3 {
        type_url: TypeUrl::ENDPOINT,
        messages: (DiscoveryRequest, DiscoveryResponse, DeltaDiscoveryRequest, DeltaDiscoveryResponse),
        stream: stream_endpoints -> StreamEndpointsStream,
        delta: delta_endpoints -> DeltaEndpointsStream,
        fetch: fetch_endpoints,
    }
}

discovery_service! {
    /// `envoy.service.cluster.v3.ClusterDiscoveryService`.
    pub trait ClusterDiscoveryService for EnvoyServerV3 {
        type_url: TypeUrl::CLUSTER,
        messages: (DiscoveryRequest, DiscoveryResponse, DeltaDiscoveryRequest, DeltaDiscoveryResponse),
        stream: stream_clusters -> StreamClustersStream,
        delta: delta_clusters -> DeltaClustersStream,
        fetch: fetch_clusters,
    }
}

discovery_service! {
    /// `envoy.service.route.v3.RouteDiscoveryService`.
    pub trait RouteDiscoveryService for EnvoyServerV3 {
        type_url: TypeUrl::ROUTE,
        messages: (DiscoveryRequest, DiscoveryResponse, DeltaDiscoveryRequest, DeltaDiscoveryResponse),
        stream: stream_routes -> StreamRoutesStream,
        delta: delta_routes -> DeltaRoutesStream,
        fetch: fetch_routes,
    }
}

discovery_service! {
    /// `envoy.service.listener.v3.ListenerDiscoveryService`.
    pub trait ListenerDiscoveryService for EnvoyServerV3 {
        type_url: TypeUrl::LISTENER,
        messages: (DiscoveryRequest, DiscoveryResponse, DeltaDiscoveryRequest, DeltaDiscoveryResponse),
        stream: stream_listeners -> StreamListenersStream,
        delta: delta_listeners -> DeltaListenersStream,
        fetch: fetch_listeners,
    }
}

/// `envoy.service.discovery.v3.AggregatedDiscoveryService`.
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

    /// Every resource type over one stream. Each request names its type.
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
impl AggregatedDiscoveryService for EnvoyServerV3 {
    type StreamAggregatedResourcesStream = ResponseStream<DiscoveryResponse>;
    type DeltaAggregatedResourcesStream = ResponseStream<DeltaDiscoveryResponse>;

    #[instrument(skip_all, name = "ads_stream")]
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use tokio_stream::StreamExt;
    use tokio_util::sync::CancellationToken;
    use xds_cache::{Cache, ShardedCache, Snapshot};
    use xds_core::{AnyResource, NodeHash, ResourceRegistry};

    use crate::config::ServerConfig;
    use crate::metrics::XdsMetrics;

    fn server() -> EnvoyServerV3 {
        let handler = DiscoveryHandler::new(
            Arc::new(ShardedCache::new()),
            Arc::new(ResourceRegistry::with_envoy_types()),
            ApiVersion::V3,
            Arc::new(ServerConfig {
                control_plane_id: Some("gloo".to_string()),
                ..ServerConfig::default()
            }),
            XdsMetrics::new(),
            CancellationToken::new(),
        );
        EnvoyServerV3::new(handler)
    }

    fn publish(server: &EnvoyServerV3) {
        let mut snapshot = Snapshot::envoy();
        for (type_url, name) in [(TypeUrl::CLUSTER, "svc"), (TypeUrl::ENDPOINT, "svc")] {
            snapshot.set_resources(
                type_url,
                vec![Arc::new(AnyResource::new(
                    name,
                    prost_types::Any {
                        type_url: type_url.to_string(),
                        value: Vec::new(),
                    },
                )) as xds_core::BoxResource],
            );
        }
        let fingerprint = snapshot.fingerprint().expect("fingerprint");
        snapshot.stamp(&fingerprint);
        server
            .handler()
            .cache()
            .set_snapshot(NodeHash::wildcard(), snapshot);
    }

    fn requests(items: Vec<DiscoveryRequest>) -> Request<RequestStream<DiscoveryRequest>> {
        let stream: RequestStream<DiscoveryRequest> =
            Box::pin(tokio_stream::iter(items.into_iter().map(Ok)).chain(futures::stream::pending()));
        Request::new(stream)
    }

    #[tokio::test]
    async fn per_type_stream_uses_its_own_type() {
        let server = server();
        publish(&server);

        let mut responses = server
            .stream_endpoints(requests(vec![DiscoveryRequest::default()]))
            .await
            .expect("stream")
            .into_inner();
        let response = responses.next().await.expect("open").expect("response");
        assert_eq!(response.type_url, TypeUrl::ENDPOINT);
        assert_eq!(
            response.control_plane.map(|c| c.identifier).as_deref(),
            Some("gloo")
        );
    }

    #[tokio::test]
    async fn aggregated_stream_follows_request_types() {
        let server = server();
        publish(&server);

        let request = DiscoveryRequest {
            type_url: TypeUrl::CLUSTER.to_string(),
            ..DiscoveryRequest::default()
        };
        let mut responses = server
            .stream_aggregated_resources(requests(vec![request]))
            .await
            .expect("stream")
            .into_inner();
        let response = responses.next().await.expect("open").expect("response");
        assert_eq!(response.type_url, TypeUrl::CLUSTER);
    }

    #[tokio::test]
    async fn fetch_routes_without_routes_is_unavailable() {
        let server = server();
        publish(&server);

        let status = server
            .fetch_routes(Request::new(DiscoveryRequest::default()))
            .await
            .unwrap_err();
        assert_eq!(status.code(), tonic::Code::Unavailable);
    }

    #[tokio::test]
    async fn fetch_clusters_returns_snapshot_collection() {
        let server = server();
        publish(&server);

        let response = server
            .fetch_clusters(Request::new(DiscoveryRequest::default()))
            .await
            .expect("fetch")
            .into_inner();
        assert_eq!(response.type_url, TypeUrl::CLUSTER);
        assert_eq!(response.resources.len(), 1);
    }

    #[tokio::test]
    async fn delta_methods_are_not_implemented() {
        let server = server();
        let empty = || {
            let stream: RequestStream<DeltaDiscoveryRequest> = Box::pin(futures::stream::empty());
            Request::new(stream)
        };

        let results = [
            server.delta_endpoints(empty()).await.map(|_| ()),
            server.delta_clusters(empty()).await.map(|_| ()),
            server.delta_routes(empty()).await.map(|_| ()),
            server.delta_listeners(empty()).await.map(|_| ()),
            server.delta_aggregated_resources(empty()).await.map(|_| ()),
        ];
        for result in results {
            let status = result.unwrap_err();
            assert_eq!(status.code(), tonic::Code::Unimplemented);
            assert_eq!(status.message(), "not implemented");
        }
    }
}
