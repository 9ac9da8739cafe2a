//! Deprecated `envoy.api.v2` packages, still served to legacy proxies.

pub mod v2 {
    //! `envoy.api.v2`.

    use crate::google::rpc::Status;

    pub mod core {
        //! `envoy.api.v2.core`.
        //!
        //! The modelled fields are wire-identical to their v3 counterparts.

        pub use crate::envoy::config::core::v3::{
            config_source, Address, AggregatedConfigSource, ConfigSource, ControlPlane, Node,
            SocketAddress,
        };
    }

    pub mod endpoint {
        //! `envoy.api.v2.endpoint`.

        pub use crate::envoy::config::endpoint::v3::{Endpoint, LbEndpoint, LocalityLbEndpoints};
    }

    pub mod route {
        //! `envoy.api.v2.route`.

        pub use crate::envoy::config::route::v3::VirtualHost;
    }

    pub mod listener {
        //! `envoy.api.v2.listener`.

        /// Filter chain.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct FilterChain {
            /// Network filters, applied in order.
            #[prost(message, repeated, tag = "3")]
            pub filters: ::prost::alloc::vec::Vec<Filter>,
        }

        /// Network filter. Unlike v3, configuration may still be given as
        /// an untyped `Struct`.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Filter {
            /// Filter name.
            #[prost(string, tag = "1")]
            pub name: ::prost::alloc::string::String,
            /// Filter configuration.
            #[prost(oneof = "filter::ConfigType", tags = "2, 4")]
            pub config_type: ::core::option::Option<filter::ConfigType>,
        }

        /// Nested types of [`Filter`].
        pub mod filter {
            /// Filter configuration.
            #[derive(Clone, PartialEq, ::prost::Oneof)]
            pub enum ConfigType {
                /// Untyped configuration.
                #[prost(message, tag = "2")]
                Config(::prost_types::Struct),
                /// Typed configuration.
                #[prost(message, tag = "4")]
                TypedConfig(::prost_types::Any),
            }
        }
    }

    /// Upstream cluster (v2).
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Cluster {
        /// Cluster name.
        #[prost(string, tag = "1")]
        pub name: ::prost::alloc::string::String,
        /// Discovery mechanism for cluster members.
        #[prost(oneof = "cluster::ClusterDiscoveryType", tags = "2")]
        pub cluster_discovery_type: ::core::option::Option<cluster::ClusterDiscoveryType>,
        /// EDS settings, used when the discovery type is `EDS`.
        #[prost(message, optional, tag = "3")]
        pub eds_cluster_config: ::core::option::Option<cluster::EdsClusterConfig>,
    }

    /// Nested types of [`Cluster`].
    pub mod cluster {
        pub use crate::envoy::config::cluster::v3::cluster::{
            ClusterDiscoveryType, DiscoveryType, EdsClusterConfig,
        };
    }

    impl Cluster {
        /// Whether members are discovered through EDS.
        #[must_use]
        pub fn is_eds(&self) -> bool {
            matches!(
                self.cluster_discovery_type,
                Some(cluster::ClusterDiscoveryType::Type(t)) if t == cluster::DiscoveryType::Eds as i32
            )
        }
    }

    /// Endpoints of one cluster (v2).
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ClusterLoadAssignment {
        /// Name of the cluster (or EDS service name) these endpoints serve.
        #[prost(string, tag = "1")]
        pub cluster_name: ::prost::alloc::string::String,
        /// Endpoints grouped by locality.
        #[prost(message, repeated, tag = "2")]
        pub endpoints: ::prost::alloc::vec::Vec<endpoint::LocalityLbEndpoints>,
    }

    /// Named route table (v2).
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct RouteConfiguration {
        /// Route table name.
        #[prost(string, tag = "1")]
        pub name: ::prost::alloc::string::String,
        /// Virtual hosts.
        #[prost(message, repeated, tag = "2")]
        pub virtual_hosts: ::prost::alloc::vec::Vec<route::VirtualHost>,
    }

    /// Listener (v2).
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Listener {
        /// Listener name.
        #[prost(string, tag = "1")]
        pub name: ::prost::alloc::string::String,
        /// Bind address.
        #[prost(message, optional, tag = "2")]
        pub address: ::core::option::Option<self::core::Address>,
        /// Filter chains.
        #[prost(message, repeated, tag = "3")]
        pub filter_chains: ::prost::alloc::vec::Vec<listener::FilterChain>,
    }

    /// State-of-the-world discovery request (v2).
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DiscoveryRequest {
        /// Version the client last applied.
        #[prost(string, tag = "1")]
        pub version_info: ::prost::alloc::string::String,
        /// Requesting node.
        #[prost(message, optional, tag = "2")]
        pub node: ::core::option::Option<self::core::Node>,
        /// Requested resource names.
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

    /// State-of-the-world discovery response (v2).
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
        pub control_plane: ::core::option::Option<self::core::ControlPlane>,
    }

    /// Incremental discovery request (v2).
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DeltaDiscoveryRequest {
        /// Requesting node.
        #[prost(message, optional, tag = "1")]
        pub node: ::core::option::Option<self::core::Node>,
        /// Requested resource type.
        #[prost(string, tag = "2")]
        pub type_url: ::prost::alloc::string::String,
        /// Names to add to the subscription.
        #[prost(string, repeated, tag = "3")]
        pub resource_names_subscribe: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        /// Names to remove from the subscription.
        #[prost(string, repeated, tag = "4")]
        pub resource_names_unsubscribe: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        /// Nonce of the response this request answers.
        #[prost(string, tag = "6")]
        pub response_nonce: ::prost::alloc::string::String,
        /// Set when the previous response was rejected.
        #[prost(message, optional, tag = "7")]
        pub error_detail: ::core::option::Option<Status>,
    }

    /// Incremental discovery response (v2).
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct DeltaDiscoveryResponse {
        /// System-wide version.
        #[prost(string, tag = "1")]
        pub system_version_info: ::prost::alloc::string::String,
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
}
