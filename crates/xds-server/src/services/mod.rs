//! Discovery service traits and their implementations.
//!
//! Each major API version has its own module with the per-type services
//! (endpoints, clusters, routes, listeners) and the aggregated service.
//! The traits mirror the shape of tonic-generated server traits so a
//! transport binding only has to box its request streams.

use std::pin::Pin;

use futures::Stream;
use tokio_stream::wrappers::ReceiverStream;
use tonic::Status;

pub mod v2;
pub mod v3;

/// Inbound message stream of a bidirectional method.
pub type RequestStream<T> = Pin<Box<dyn Stream<Item = Result<T, Status>> + Send + 'static>>;

/// Outbound message stream of a bidirectional method.
pub type ResponseStream<T> = ReceiverStream<Result<T, Status>>;

pub(crate) fn delta_unimplemented() -> Status {
    Status::unimplemented("not implemented")
}

/// Declares a per-type discovery service trait and implements it for a
/// server by delegating to its handler with a fixed type URL.
macro_rules! discovery_service {
    (
        $(#[$meta:meta])*
        pub trait $service:ident for $server:ident {
            type_url: $type_url:expr,
            messages: ($req:ty, $resp:ty, $delta_req:ty, $delta_resp:ty),
            stream: $stream:ident -> $stream_ty:ident,
            delta: $delta:ident -> $delta_ty:ident,
            fetch: $fetch:ident,
        }
    ) => {
        $(#[$meta])*
        #[async_trait::async_trait]
        pub trait $service: Send + Sync + 'static {
            #[doc = concat!("Response stream of `", stringify!($stream), "`.")]
            type $stream_ty: futures::Stream<Item = Result<$resp, tonic::Status>> + Send + 'static;

            #[doc = concat!("Response stream of `", stringify!($delta), "`.")]
            type $delta_ty: futures::Stream<Item = Result<$delta_resp, tonic::Status>>
                + Send
                + 'static;

            /// State-of-the-world stream.
            async fn $stream(
                &self,
                request: tonic::Request<$crate::services::RequestStream<$req>>,
            ) -> Result<tonic::Response<Self::$stream_ty>, tonic::Status>;

            /// Incremental stream. Not supported.
            async fn $delta(
                &self,
                request: tonic::Request<$crate::services::RequestStream<$delta_req>>,
            ) -> Result<tonic::Response<Self::$delta_ty>, tonic::Status>;

            /// One-shot fetch.
            async fn $fetch(
                &self,
                request: tonic::Request<$req>,
            ) -> Result<tonic::Response<$resp>, tonic::Status>;
        }

        #[async_trait::async_trait]
        impl $service for $server {
            type $stream_ty = $crate::services::ResponseStream<$resp>;
            type $delta_ty = $crate::services::ResponseStream<$delta_resp>;

            #[tracing::instrument(skip_all)]
            async fn $stream(
                &self,
                request: tonic::Request<$crate::services::RequestStream<$req>>,
            ) -> Result<tonic::Response<Self::$stream_ty>, tonic::Status> {
                Ok(tonic::Response::new(
                    self.handler.stream(request.into_inner(), $type_url),
                ))
            }

            async fn $delta(
                &self,
                _request: tonic::Request<$crate::services::RequestStream<$delta_req>>,
            ) -> Result<tonic::Response<Self::$delta_ty>, tonic::Status> {
                Err($crate::services::delta_unimplemented())
            }

            #[tracing::instrument(skip_all)]
            async fn $fetch(
                &self,
                request: tonic::Request<$req>,
            ) -> Result<tonic::Response<$resp>, tonic::Status> {
                self.handler
                    .fetch(Some(request.into_inner()), $type_url)
                    .map(tonic::Response::new)
            }
        }
    };
}

pub(crate) use discovery_service;
