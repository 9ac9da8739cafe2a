//! `envoy.config.*` packages.
//!
//! Only the fields the control plane reads or writes are modelled. Field
//! tags match the upstream protos, so unknown fields from richer
//! encoders are skipped on decode.

pub mod core {
    //! Core shared types.

    pub mod v3 {
        //! `envoy.config.core.v3`.

        /// Identifies a proxy instance to the management server.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Node {
            /// Opaque node identifier.
            #[prost(string, tag = "1")]
            pub id: ::prost::alloc::string::String,
            /// Local service cluster name.
            #[prost(string, tag = "2")]
            pub cluster: ::prost::alloc::string::String,
            /// Free-form node metadata.
            #[prost(message, optional, tag = "3")]
            pub metadata: ::core::option::Option<::prost_types::Struct>,
            /// Name of the proxy binary.
            #[prost(string, tag = "6")]
            pub user_agent_name: ::prost::alloc::string::String,
        }

        /// Identity of the management server, echoed in responses.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ControlPlane {
            /// Control plane identifier.
            #[prost(string, tag = "1")]
            pub identifier: ::prost::alloc::string::String,
        }

        /// Network address.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Address {
            /// Socket address.
            #[prost(message, optional, tag = "1")]
            pub socket_address: ::core::option::Option<SocketAddress>,
        }

        /// IP address and port.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct SocketAddress {
            /// Host address.
            #[prost(string, tag = "2")]
            pub address: ::prost::alloc::string::String,
            /// Port number.
            #[prost(uint32, tag = "3")]
            pub port_value: u32,
        }

        /// Marker telling a proxy to fetch a resource over ADS.
        #[derive(Clone, Copy, PartialEq, ::prost::Message)]
        pub struct AggregatedConfigSource {}

        /// Where a proxy obtains a dynamically configured resource.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ConfigSource {
            /// Configuration source.
            #[prost(oneof = "config_source::ConfigSourceSpecifier", tags = "3")]
            pub config_source_specifier:
                ::core::option::Option<config_source::ConfigSourceSpecifier>,
        }

        /// Nested types of [`ConfigSource`].
        pub mod config_source {
            /// Configuration source.
            #[derive(Clone, PartialEq, ::prost::Oneof)]
            pub enum ConfigSourceSpecifier {
                /// Aggregated discovery.
                #[prost(message, tag = "3")]
                Ads(super::AggregatedConfigSource),
            }
        }

        impl ConfigSource {
            /// A config source pointing at the aggregated discovery stream.
            #[must_use]
            pub fn ads() -> Self {
                Self {
                    config_source_specifier: Some(config_source::ConfigSourceSpecifier::Ads(
                        AggregatedConfigSource {},
                    )),
                }
            }
        }
    }
}

pub mod cluster {
    //! Cluster types.

    pub mod v3 {
        //! `envoy.config.cluster.v3`.

        use super::super::core::v3::ConfigSource;

        /// Upstream cluster.
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
            /// Upstream connect timeout.
            #[prost(message, optional, tag = "4")]
            pub connect_timeout: ::core::option::Option<::prost_types::Duration>,
        }

        /// Nested types of [`Cluster`].
        pub mod cluster {
            use super::ConfigSource;

            /// Service discovery type.
            #[derive(
                Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration,
            )]
            #[repr(i32)]
            pub enum DiscoveryType {
                /// Static host list.
                Static = 0,
                /// Strict DNS.
                StrictDns = 1,
                /// Logical DNS.
                LogicalDns = 2,
                /// Endpoint discovery service.
                Eds = 3,
                /// Original destination.
                OriginalDst = 4,
            }

            /// EDS configuration of a cluster.
            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct EdsClusterConfig {
                /// Where to fetch the endpoints from.
                #[prost(message, optional, tag = "1")]
                pub eds_config: ::core::option::Option<ConfigSource>,
                /// Endpoint resource name, when it differs from the cluster name.
                #[prost(string, tag = "2")]
                pub service_name: ::prost::alloc::string::String,
            }

            /// Discovery mechanism.
            #[derive(Clone, PartialEq, ::prost::Oneof)]
            pub enum ClusterDiscoveryType {
                /// Built-in discovery type.
                #[prost(enumeration = "DiscoveryType", tag = "2")]
                Type(i32),
            }
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
    }
}

pub mod endpoint {
    //! Endpoint types.

    pub mod v3 {
        //! `envoy.config.endpoint.v3`.

        use super::super::core::v3::Address;

        /// Endpoints of one cluster.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct ClusterLoadAssignment {
            /// Name of the cluster (or EDS service name) these endpoints serve.
            #[prost(string, tag = "1")]
            pub cluster_name: ::prost::alloc::string::String,
            /// Endpoints grouped by locality.
            #[prost(message, repeated, tag = "2")]
            pub endpoints: ::prost::alloc::vec::Vec<LocalityLbEndpoints>,
        }

        /// Endpoints of one locality.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct LocalityLbEndpoints {
            /// Endpoints.
            #[prost(message, repeated, tag = "2")]
            pub lb_endpoints: ::prost::alloc::vec::Vec<LbEndpoint>,
            /// Priority of this locality.
            #[prost(uint32, tag = "5")]
            pub priority: u32,
        }

        /// A load-balanced endpoint.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct LbEndpoint {
            /// Upstream host.
            #[prost(message, optional, tag = "1")]
            pub endpoint: ::core::option::Option<Endpoint>,
        }

        /// Upstream host.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Endpoint {
            /// Host address.
            #[prost(message, optional, tag = "1")]
            pub address: ::core::option::Option<Address>,
        }
    }
}

pub mod route {
    //! Route types.

    pub mod v3 {
        //! `envoy.config.route.v3`.

        /// Named route table.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct RouteConfiguration {
            /// Route table name, referenced by listeners through RDS.
            #[prost(string, tag = "1")]
            pub name: ::prost::alloc::string::String,
            /// Virtual hosts.
            #[prost(message, repeated, tag = "2")]
            pub virtual_hosts: ::prost::alloc::vec::Vec<VirtualHost>,
        }

        /// Virtual host.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct VirtualHost {
            /// Virtual host name.
            #[prost(string, tag = "1")]
            pub name: ::prost::alloc::string::String,
            /// Domains served by this host.
            #[prost(string, repeated, tag = "2")]
            pub domains: ::prost::alloc::vec::Vec<::prost::alloc::string::String>,
        }
    }
}

pub mod listener {
    //! Listener types.

    pub mod v3 {
        //! `envoy.config.listener.v3`.

        use super::super::core::v3::Address;

        /// Listener.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Listener {
            /// Listener name.
            #[prost(string, tag = "1")]
            pub name: ::prost::alloc::string::String,
            /// Bind address.
            #[prost(message, optional, tag = "2")]
            pub address: ::core::option::Option<Address>,
            /// Filter chains.
            #[prost(message, repeated, tag = "3")]
            pub filter_chains: ::prost::alloc::vec::Vec<FilterChain>,
        }

        /// Filter chain.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct FilterChain {
            /// Network filters, applied in order.
            #[prost(message, repeated, tag = "3")]
            pub filters: ::prost::alloc::vec::Vec<Filter>,
        }

        /// Network filter.
        #[derive(Clone, PartialEq, ::prost::Message)]
        pub struct Filter {
            /// Filter name.
            #[prost(string, tag = "1")]
            pub name: ::prost::alloc::string::String,
            /// Filter configuration.
            #[prost(oneof = "filter::ConfigType", tags = "4")]
            pub config_type: ::core::option::Option<filter::ConfigType>,
        }

        /// Nested types of [`Filter`].
        pub mod filter {
            /// Filter configuration.
            #[derive(Clone, PartialEq, ::prost::Oneof)]
            pub enum ConfigType {
                /// Typed configuration.
                #[prost(message, tag = "4")]
                TypedConfig(::prost_types::Any),
            }
        }
    }
}

pub mod filter {
    //! Legacy v2 filter configuration.

    pub mod network {
        //! Network filters.

        pub mod http_connection_manager {
            //! HTTP connection manager.

            pub mod v2 {
                //! `envoy.config.filter.network.http_connection_manager.v2`.

                use crate::envoy::api::v2::core::ConfigSource;

                /// HTTP connection manager (v2).
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct HttpConnectionManager {
                    /// Statistics prefix.
                    #[prost(string, tag = "2")]
                    pub stat_prefix: ::prost::alloc::string::String,
                    /// Route source.
                    #[prost(oneof = "http_connection_manager::RouteSpecifier", tags = "3, 4")]
                    pub route_specifier:
                        ::core::option::Option<http_connection_manager::RouteSpecifier>,
                }

                /// Nested types of [`HttpConnectionManager`].
                pub mod http_connection_manager {
                    /// Route source.
                    #[derive(Clone, PartialEq, ::prost::Oneof)]
                    pub enum RouteSpecifier {
                        /// Routes fetched over RDS.
                        #[prost(message, tag = "3")]
                        Rds(super::Rds),
                        /// Inline route table.
                        #[prost(message, tag = "4")]
                        RouteConfig(crate::envoy::api::v2::RouteConfiguration),
                    }
                }

                /// RDS settings.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct Rds {
                    /// Where to fetch the route table from.
                    #[prost(message, optional, tag = "1")]
                    pub config_source: ::core::option::Option<ConfigSource>,
                    /// Route table name.
                    #[prost(string, tag = "2")]
                    pub route_config_name: ::prost::alloc::string::String,
                }
            }
        }
    }
}
