//! `envoy.extensions.*` packages.

pub mod filters {
    //! Filter extensions.

    pub mod network {
        //! Network filter extensions.

        pub mod http_connection_manager {
            //! HTTP connection manager.

            pub mod v3 {
                //! `envoy.extensions.filters.network.http_connection_manager.v3`.

                use crate::envoy::config::core::v3::ConfigSource;
                use crate::envoy::config::route::v3::RouteConfiguration;

                /// HTTP connection manager network filter.
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct HttpConnectionManager {
                    /// Codec selection.
                    #[prost(int32, tag = "1")]
                    pub codec_type: i32,
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
                        RouteConfig(super::RouteConfiguration),
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
