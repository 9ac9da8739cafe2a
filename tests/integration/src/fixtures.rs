//! Proxy resource builders.

use gateway_xds::prelude::*;
use gateway_xds::types::envoy::config::cluster::v3::cluster::{
    ClusterDiscoveryType, DiscoveryType, EdsClusterConfig,
};
use gateway_xds::types::envoy::config::cluster::v3::Cluster;
use gateway_xds::types::envoy::config::core::v3::ConfigSource;
use gateway_xds::types::envoy::config::endpoint::v3::ClusterLoadAssignment;
use gateway_xds::types::envoy::config::listener::v3::filter::ConfigType;
use gateway_xds::types::envoy::config::listener::v3::{Filter, FilterChain, Listener};
use gateway_xds::types::envoy::config::route::v3::RouteConfiguration;
use gateway_xds::types::envoy::extensions::filters::network::http_connection_manager::v3 as hcm;
use gateway_xds::types::wellknown;
use prost::Message;

/// An EDS cluster whose endpoints are named after the cluster.
pub fn eds_cluster(name: &str) -> BoxResource {
    EnvoyResource::Cluster(Cluster {
        name: name.to_string(),
        cluster_discovery_type: Some(ClusterDiscoveryType::Type(DiscoveryType::Eds as i32)),
        eds_cluster_config: Some(EdsClusterConfig {
            eds_config: Some(ConfigSource::ads()),
            service_name: String::new(),
        }),
        connect_timeout: None,
    })
    .into_resource()
}

/// Endpoints for a cluster, without hosts.
pub fn endpoints(cluster: &str) -> BoxResource {
    EnvoyResource::Endpoint(ClusterLoadAssignment {
        cluster_name: cluster.to_string(),
        endpoints: Vec::new(),
    })
    .into_resource()
}

/// A listener whose HTTP connection manager loads `route` over RDS.
pub fn listener(name: &str, route: &str) -> BoxResource {
    let manager = hcm::HttpConnectionManager {
        codec_type: 0,
        stat_prefix: name.to_string(),
        route_specifier: Some(hcm::http_connection_manager::RouteSpecifier::Rds(hcm::Rds {
            config_source: Some(ConfigSource::ads()),
            route_config_name: route.to_string(),
        })),
    };
    EnvoyResource::Listener(Listener {
        name: name.to_string(),
        address: None,
        filter_chains: vec![FilterChain {
            filters: vec![Filter {
                name: wellknown::HTTP_CONNECTION_MANAGER.to_string(),
                config_type: Some(ConfigType::TypedConfig(prost_types::Any {
                    type_url: wellknown::HTTP_CONNECTION_MANAGER_V3.to_string(),
                    value: manager.encode_to_vec(),
                })),
            }],
        }],
    })
    .into_resource()
}

/// An empty route table.
pub fn route(name: &str) -> BoxResource {
    EnvoyResource::Route(RouteConfiguration {
        name: name.to_string(),
        virtual_hosts: Vec::new(),
    })
    .into_resource()
}

/// A snapshot of the given collections, versioned by content.
pub fn snapshot(collections: Vec<(&str, Vec<BoxResource>)>) -> XdsResult<Snapshot> {
    let mut snapshot = Snapshot::envoy();
    for (type_url, resources) in collections {
        snapshot.set_resources(type_url, resources);
    }
    let fingerprint = snapshot.fingerprint()?;
    snapshot.stamp(&fingerprint);
    Ok(snapshot)
}
