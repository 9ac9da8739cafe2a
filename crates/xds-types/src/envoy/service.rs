//! `envoy.service.*` packages.

pub mod discovery {
    //! Discovery service messages.

    pub mod v3 {
        //! `envoy.service.discovery.v3`.

        use crate::envoy::config::core::v3::{ControlPlane, Node};
        use crate::google::rpc::Status;

        /// State-of-the-world discovery request.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct DiscoveryRequest {
            /// Version the client last applied; empty on the first request.
            #[prost(string, tag = "1")]
            pub version_info: ::prost::alloc::string::String,
            /// Requesting node.
            #[prost(message, optional, tag = "2")]
            pub node: ::core::option::Option<Node>,
            /// Requested resource names; empty means every resource.
            #[prost(string, repeated, tag = "3")]
            pub resource_names: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
            /// Requested resource type.
            #[prost(string, tag = "4")]
            pub type_url: ::prost::alloc::string::String,
            /// Nonce of the response this request answers.
            #[prost(string, tag = "5")]
            pub response_nonce: ::prost::alloc::string::String,
            /// Set when the previous response was rejected.
            #[prost(message, optional, tag = "6")]
            pub error_detail: ::core::option::Option<Status>,
        }

        /// State-of-the-world discovery response.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct DiscoveryResponse {
            /// Version of the resources in this response.
            #[prost(string, tag = "1")]
            pub version_info: ::prost::alloc::string::String,
            /// Encoded resources.
            #[prost(message, repeated, tag = "2")]
            pub resources: ::prost::alloc::vec::Vec<::prost_types::Any>,
            /// Canary flag.
            #[prost(bool, tag = "3")]
            pub canary: bool,
            /// Type of the resources.
            #[prost(string, tag = "4")]
            pub type_url: ::prost::alloc::string::String,
            /// Response nonce.
            #[prost(string, tag = "5")]
            pub nonce: ::prost::alloc::string::String,
            /// Management server identity.
            #[prost(message, optional, tag = "6")]
            pub control_plane: ::core::option::Option<ControlPlane>,
        }

        /// Incremental discovery request.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct DeltaDiscoveryRequest {
            /// Requesting node.
            #[prost(message, optional, tag = "1")]
            pub node: ::core::option::Option<Node>,
            /// Requested resource type.
            #[prost(string, tag = "2")]
            pub type_url: ::prost::alloc::string::String,
            /// Names to add to the subscription.
            #[prost(string, repeated, tag = "3")]
            pub resource_names_subscribe:
                ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
            /// Names to remove from the subscription.
            #[prost(string, repeated, tag = "4")]
            pub resource_names_unsubscribe:
                ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
            /// Versions the client already holds.
            #[prost(map = "string, string", tag = "5")]
            pub initial_resource_versions: ::std::collections::HashMap<
                ::prost::alloc::string::String,
                ::prost::alloc::string::String,
            >,
            /// Nonce of the response this request answers.
            #[prost(string, tag = "6")]
            pub response_nonce: ::prost::alloc::string::String,
            /// Set when the previous response was rejected.
            #[prost(message, optional, tag = "7")]
            pub error_detail: ::core::option::Option<Status>,
        }

        /// Incremental discovery response.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct DeltaDiscoveryResponse {
            /// System-wide version.
            #[prost(string, tag = "1")]
            pub system_version_info: ::prost::alloc::string::String,
            /// Added or updated resources.
            #[prost(message, repeated, tag = "2")]
            pub resources: ::prost::alloc::vec::Vec<Resource>,
            /// Type of the resources.
            #[prost(string, tag = "4")]
            pub type_url: ::prost::alloc::string::String,
            /// Response nonce.
            #[prost(string, tag = "5")]
            pub nonce: ::prost::alloc::string::String,
            /// Removed resource names.
            #[prost(string, repeated, tag = "6")]
            pub removed_resources: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        }

        /// Resource wrapper used by incremental discovery.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Resource {
            /// Resource version.
            #[prost(string, tag = "1")]
            pub version: ::prost::alloc::string::String,
            /// Encoded resource.
            #[prost(message, optional, tag = "2")]
            pub resource: ::core::option::Option<::prost_types::Any>,
            /// Resource name.
            #[prost(string, tag = "3")]
            pub name: ::prost::alloc::string::String,
        }
    }
}
