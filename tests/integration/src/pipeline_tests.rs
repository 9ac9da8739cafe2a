//! Watched stores to proxy: emitter, feed, cache and discovery streams.

use std::sync::Arc;
use std::time::Duration;

use gateway_xds::prelude::*;
use gateway_xds::server::services::v3::{AggregatedDiscoveryService, ClusterDiscoveryService};
use gateway_xds::server::services::RequestStream;
use gateway_xds::types::envoy::config::core::v3::Node;
use gateway_xds::types::envoy::service::discovery::v3::{DiscoveryRequest, DiscoveryResponse};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tokio_util::sync::CancellationToken;
use tonic::{Request, Status};

use crate::fixtures::{eds_cluster, endpoints};

const NAMESPACE: &str = "gloo-system";

struct Pipeline {
    clusters: InMemoryClient,
    endpoints: InMemoryClient,
    emitter: SnapshotEmitter,
    server: XdsServer,
    cancel: CancellationToken,
    publisher: JoinHandle<XdsResult<()>>,
    feed: JoinHandle<()>,
    _errors: tokio::sync::mpsc::Receiver<XdsError>,
}

impl Pipeline {
    async fn start() -> Self {
        let clusters = InMemoryClient::new();
        let endpoints = InMemoryClient::new();
        clusters.set(NAMESPACE, vec![eds_cluster("svcA")]);
        endpoints.set(NAMESPACE, vec![self::endpoints("svcA")]);

        let emitter = SnapshotEmitter::new(vec![
            WatchedResource::new(TypeUrl::CLUSTER, "clusters", Arc::new(clusters.clone())),
            WatchedResource::new(TypeUrl::ENDPOINT, "endpoints", Arc::new(endpoints.clone())),
        ]);
        let server = XdsServer::builder()
            .cache(Arc::new(ShardedCache::new()))
            .control_plane_id("gloo")
            .build()
            .expect("server");

        let cancel = CancellationToken::new();
        let subscription = emitter
            .subscribe(
                [NAMESPACE],
                SubscribeOptions {
                    cancel: cancel.clone(),
                    ..SubscribeOptions::default()
                },
            )
            .await
            .expect("subscribe");
        let (snapshots, errors, publisher) = subscription.into_parts();
        let feed = tokio::spawn(server.feed().run(snapshots, cancel.clone()));

        Self {
            clusters,
            endpoints,
            emitter,
            server,
            cancel,
            publisher,
            feed,
            _errors: errors,
        }
    }

    async fn wait_for_snapshot(&self) {
        for _ in 0..100 {
            if self.server.cache().get_snapshot(NodeHash::wildcard()).is_some() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("no snapshot reached the cache");
    }
}

struct Proxy {
    requests: mpsc::Sender<Result<DiscoveryRequest, Status>>,
    responses: ReceiverStream<Result<DiscoveryResponse, Status>>,
}

impl Proxy {
    async fn clusters(server: &XdsServer) -> Self {
        let (requests, rx) = mpsc::channel(8);
        let stream: RequestStream<DiscoveryRequest> = Box::pin(ReceiverStream::new(rx));
        let responses = server
            .v3()
            .stream_clusters(Request::new(stream))
            .await
            .expect("stream")
            .into_inner();
        Self {
            requests,
            responses,
        }
    }

    async fn aggregated(server: &XdsServer) -> Self {
        let (requests, rx) = mpsc::channel(8);
        let stream: RequestStream<DiscoveryRequest> = Box::pin(ReceiverStream::new(rx));
        let responses = server
            .v3()
            .stream_aggregated_resources(Request::new(stream))
            .await
            .expect("stream")
            .into_inner();
        Self {
            requests,
            responses,
        }
    }

    async fn request(&self, type_url: &str, previous: Option<&DiscoveryResponse>) {
        let request = DiscoveryRequest {
            node: Some(Node {
                id: "gateway-proxy~10.0.0.1".to_string(),
                ..Node::default()
            }),
            type_url: type_url.to_string(),
            version_info: previous.map(|r| r.version_info.clone()).unwrap_or_default(),
            response_nonce: previous.map(|r| r.nonce.clone()).unwrap_or_default(),
            ..DiscoveryRequest::default()
        };
        self.requests.send(Ok(request)).await.expect("stream open");
    }

    async fn next(&mut self) -> Result<DiscoveryResponse, Status> {
        tokio::time::timeout(Duration::from_secs(5), self.responses.next())
            .await
            .expect("response within 5s")
            .expect("stream open")
    }

    async fn expect_quiet(&mut self) {
        let next = tokio::time::timeout(Duration::from_secs(3), self.responses.next()).await;
        assert!(next.is_err(), "unexpected response: {next:?}");
    }
}

fn cluster_names(response: &DiscoveryResponse) -> Vec<String> {
    response
        .resources
        .iter()
        .map(|any| match EnvoyResource::decode(any).expect("decode") {
            EnvoyResource::Cluster(cluster) => cluster.name,
            other => panic!("not a cluster: {other:?}"),
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn initial_state_reaches_the_proxy() {
    let pipeline = Pipeline::start().await;
    pipeline.wait_for_snapshot().await;

    let mut proxy = Proxy::clusters(&pipeline.server).await;
    proxy.request("", None).await;
    let response = proxy.next().await.expect("response");

    assert_eq!(cluster_names(&response), vec!["svcA"]);
    assert_eq!(
        response.control_plane.map(|c| c.identifier).as_deref(),
        Some("gloo")
    );
}

#[tokio::test(start_paused = true)]
async fn store_change_is_pushed_to_acked_proxy() {
    let pipeline = Pipeline::start().await;
    pipeline.wait_for_snapshot().await;

    let mut proxy = Proxy::clusters(&pipeline.server).await;
    proxy.request(TypeUrl::CLUSTER, None).await;
    let first = proxy.next().await.expect("response");
    proxy.request(TypeUrl::CLUSTER, Some(&first)).await;

    pipeline
        .clusters
        .set(NAMESPACE, vec![eds_cluster("svcA"), eds_cluster("svcB")]);
    pipeline
        .endpoints
        .set(NAMESPACE, vec![endpoints("svcA"), endpoints("svcB")]);

    let second = proxy.next().await.expect("response");
    assert_ne!(second.version_info, first.version_info);
    assert_eq!(cluster_names(&second), vec!["svcA", "svcB"]);
}

#[tokio::test(start_paused = true)]
async fn dangling_cluster_is_held_back_until_endpoints_exist() {
    let pipeline = Pipeline::start().await;
    pipeline.wait_for_snapshot().await;

    let mut proxy = Proxy::clusters(&pipeline.server).await;
    proxy.request(TypeUrl::CLUSTER, None).await;
    let first = proxy.next().await.expect("response");
    proxy.request(TypeUrl::CLUSTER, Some(&first)).await;

    pipeline
        .clusters
        .set(NAMESPACE, vec![eds_cluster("svcA"), eds_cluster("svcB")]);
    proxy.expect_quiet().await;
    assert_eq!(pipeline.server.metrics().snapshots_rejected(), 1);

    pipeline
        .endpoints
        .set(NAMESPACE, vec![endpoints("svcA"), endpoints("svcB")]);
    let second = proxy.next().await.expect("response");
    assert_eq!(cluster_names(&second), vec!["svcA", "svcB"]);
}

#[tokio::test(start_paused = true)]
async fn forced_emission_is_stored_but_not_resent() {
    let pipeline = Pipeline::start().await;
    pipeline.wait_for_snapshot().await;

    let mut proxy = Proxy::clusters(&pipeline.server).await;
    proxy.request(TypeUrl::CLUSTER, None).await;
    let first = proxy.next().await.expect("response");
    proxy.request(TypeUrl::CLUSTER, Some(&first)).await;

    pipeline.emitter.force_emit();
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(pipeline.server.metrics().snapshots_accepted(), 2);
    proxy.expect_quiet().await;
}

#[tokio::test(start_paused = true)]
async fn aggregated_stream_serves_clusters_and_endpoints() {
    let pipeline = Pipeline::start().await;
    pipeline.wait_for_snapshot().await;

    let mut proxy = Proxy::aggregated(&pipeline.server).await;
    proxy.request(TypeUrl::CLUSTER, None).await;
    let clusters = proxy.next().await.expect("clusters");
    proxy.request(TypeUrl::ENDPOINT, None).await;
    let endpoints = proxy.next().await.expect("endpoints");

    assert_eq!(clusters.type_url, TypeUrl::CLUSTER);
    assert_eq!(endpoints.type_url, TypeUrl::ENDPOINT);
    assert_eq!(endpoints.resources.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn v3_aggregated_stream_refuses_legacy_types() {
    let pipeline = Pipeline::start().await;

    let mut proxy = Proxy::aggregated(&pipeline.server).await;
    proxy.request(TypeUrl::CLUSTER_V2, None).await;
    let status = proxy.next().await.unwrap_err();
    assert_eq!(status.code(), tonic::Code::InvalidArgument);
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_publisher_and_feed() {
    let pipeline = Pipeline::start().await;
    pipeline.wait_for_snapshot().await;

    pipeline.cancel.cancel();
    pipeline
        .publisher
        .await
        .expect("publisher task")
        .expect("clean shutdown");
    pipeline.feed.await.expect("feed task");
}
