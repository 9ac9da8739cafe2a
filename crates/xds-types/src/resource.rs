//! Typed snapshot resources and reference extraction.

use std::any::Any;
use std::collections::BTreeSet;
use std::sync::Arc;

use prost::Message;
use prost_types::value::Kind;
use tracing::trace;
use xds_core::{BoxResource, Resource, ResourceRef, TypeUrl, XdsError, XdsResult};

use crate::envoy::api::v2;
use crate::envoy::config::cluster::v3::Cluster;
use crate::envoy::config::endpoint::v3::ClusterLoadAssignment;
use crate::envoy::config::filter::network::http_connection_manager::v2 as hcm_v2;
use crate::envoy::config::listener::v3::{filter::ConfigType, Listener};
use crate::envoy::config::route::v3::RouteConfiguration;
use crate::envoy::extensions::filters::network::http_connection_manager::v3 as hcm_v3;
use crate::wellknown;

/// A proxy resource of one of the kinds the control plane serves.
///
/// The v2 variants back the legacy shadow collections of a snapshot.
#[derive(Clone, Debug, PartialEq)]
pub enum EnvoyResource {
    /// v3 endpoints.
    Endpoint(ClusterLoadAssignment),
    /// v3 cluster.
    Cluster(Cluster),
    /// v3 route table.
    Route(RouteConfiguration),
    /// v3 listener.
    Listener(Listener),
    /// v2 endpoints.
    EndpointV2(v2::ClusterLoadAssignment),
    /// v2 cluster.
    ClusterV2(v2::Cluster),
    /// v2 route table.
    RouteV2(v2::RouteConfiguration),
    /// v2 listener.
    ListenerV2(v2::Listener),
}

impl EnvoyResource {
    /// Decode a resource from its `Any` encoding.
    pub fn decode(any: &prost_types::Any) -> XdsResult<Self> {
        let bytes = any.value.as_slice();
        let decoded = match any.type_url.as_str() {
            TypeUrl::ENDPOINT => ClusterLoadAssignment::decode(bytes).map(Self::Endpoint),
            TypeUrl::CLUSTER => Cluster::decode(bytes).map(Self::Cluster),
            TypeUrl::ROUTE => RouteConfiguration::decode(bytes).map(Self::Route),
            TypeUrl::LISTENER => Listener::decode(bytes).map(Self::Listener),
            TypeUrl::ENDPOINT_V2 => v2::ClusterLoadAssignment::decode(bytes).map(Self::EndpointV2),
            TypeUrl::CLUSTER_V2 => v2::Cluster::decode(bytes).map(Self::ClusterV2),
            TypeUrl::ROUTE_V2 => v2::RouteConfiguration::decode(bytes).map(Self::RouteV2),
            TypeUrl::LISTENER_V2 => v2::Listener::decode(bytes).map(Self::ListenerV2),
            other => {
                return Err(XdsError::InvalidTypeUrl {
                    type_url: other.to_string(),
                    reason: "not a snapshot resource type".to_string(),
                })
            }
        };
        decoded.map_err(|e| XdsError::DecodingError {
            type_url: any.type_url.clone(),
            message: e.to_string(),
        })
    }

    /// Wrap into a shared snapshot resource.
    #[must_use]
    pub fn into_resource(self) -> BoxResource {
        Arc::new(self)
    }

    fn encode_message(&self) -> Vec<u8> {
        match self {
            Self::Endpoint(m) => m.encode_to_vec(),
            Self::Cluster(m) => m.encode_to_vec(),
            Self::Route(m) => m.encode_to_vec(),
            Self::Listener(m) => m.encode_to_vec(),
            Self::EndpointV2(m) => m.encode_to_vec(),
            Self::ClusterV2(m) => m.encode_to_vec(),
            Self::RouteV2(m) => m.encode_to_vec(),
            Self::ListenerV2(m) => m.encode_to_vec(),
        }
    }
}

impl Resource for EnvoyResource {
    fn type_url(&self) -> &str {
        match self {
            Self::Endpoint(_) => TypeUrl::ENDPOINT,
            Self::Cluster(_) => TypeUrl::CLUSTER,
            Self::Route(_) => TypeUrl::ROUTE,
            Self::Listener(_) => TypeUrl::LISTENER,
            Self::EndpointV2(_) => TypeUrl::ENDPOINT_V2,
            Self::ClusterV2(_) => TypeUrl::CLUSTER_V2,
            Self::RouteV2(_) => TypeUrl::ROUTE_V2,
            Self::ListenerV2(_) => TypeUrl::LISTENER_V2,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Endpoint(m) => &m.cluster_name,
            Self::Cluster(m) => &m.name,
            Self::Route(m) => &m.name,
            Self::Listener(m) => &m.name,
            Self::EndpointV2(m) => &m.cluster_name,
            Self::ClusterV2(m) => &m.name,
            Self::RouteV2(m) => &m.name,
            Self::ListenerV2(m) => &m.name,
        }
    }

    fn encode(&self) -> Result<prost_types::Any, Box<dyn std::error::Error + Send + Sync>> {
        Ok(prost_types::Any {
            type_url: self.type_url().to_string(),
            value: self.encode_message(),
        })
    }

    fn references(&self) -> Vec<ResourceRef> {
        let mut refs = BTreeSet::new();
        match self {
            Self::Cluster(c) if c.is_eds() => {
                let service = c.eds_cluster_config.as_ref().map(|eds| eds.service_name.as_str());
                refs.insert(ResourceRef::new(TypeUrl::ENDPOINT, eds_name(&c.name, service)));
            }
            Self::ClusterV2(c) if c.is_eds() => {
                let service = c.eds_cluster_config.as_ref().map(|eds| eds.service_name.as_str());
                refs.insert(ResourceRef::new(TypeUrl::ENDPOINT_V2, eds_name(&c.name, service)));
            }
            Self::Listener(l) => {
                let filters = l.filter_chains.iter().flat_map(|chain| chain.filters.iter());
                for filter in filters.filter(|f| f.name == wellknown::HTTP_CONNECTION_MANAGER) {
                    if let Some(route) = filter.config_type.as_ref().and_then(rds_route_v3) {
                        refs.insert(ResourceRef::new(TypeUrl::ROUTE, route));
                    }
                }
            }
            Self::ListenerV2(l) => {
                let filters = l.filter_chains.iter().flat_map(|chain| chain.filters.iter());
                for filter in filters.filter(|f| f.name == wellknown::HTTP_CONNECTION_MANAGER) {
                    if let Some(route) = filter.config_type.as_ref().and_then(rds_route_v2) {
                        refs.insert(ResourceRef::new(TypeUrl::ROUTE_V2, route));
                    }
                }
            }
            _ => {}
        }
        refs.into_iter().collect()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn eds_name<'a>(cluster: &'a str, service_name: Option<&'a str>) -> &'a str {
    match service_name {
        Some(service) if !service.is_empty() => service,
        _ => cluster,
    }
}

fn rds_route_v3(config: &ConfigType) -> Option<String> {
    let ConfigType::TypedConfig(any) = config;
    if any.type_url != wellknown::HTTP_CONNECTION_MANAGER_V3 {
        trace!(type_url = %any.type_url, "skipping filter config of unexpected type");
        return None;
    }
    let hcm = hcm_v3::HttpConnectionManager::decode(any.value.as_slice())
        .map_err(|e| trace!(error = %e, "undecodable http connection manager config"))
        .ok()?;
    match hcm.route_specifier? {
        hcm_v3::http_connection_manager::RouteSpecifier::Rds(rds) => Some(rds.route_config_name),
        hcm_v3::http_connection_manager::RouteSpecifier::RouteConfig(_) => None,
    }
}

fn rds_route_v2(config: &v2::listener::filter::ConfigType) -> Option<String> {
    match config {
        v2::listener::filter::ConfigType::TypedConfig(any) => {
            if any.type_url != wellknown::HTTP_CONNECTION_MANAGER_V2 {
                trace!(type_url = %any.type_url, "skipping filter config of unexpected type");
                return None;
            }
            let hcm = hcm_v2::HttpConnectionManager::decode(any.value.as_slice())
                .map_err(|e| trace!(error = %e, "undecodable http connection manager config"))
                .ok()?;
            match hcm.route_specifier? {
                hcm_v2::http_connection_manager::RouteSpecifier::Rds(rds) => {
                    Some(rds.route_config_name)
                }
                hcm_v2::http_connection_manager::RouteSpecifier::RouteConfig(_) => None,
            }
        }
        v2::listener::filter::ConfigType::Config(config) => struct_route_name(config),
    }
}

// Untyped configs follow the JSON mapping, so both field spellings occur.
fn struct_route_name(config: &prost_types::Struct) -> Option<String> {
    let Some(Kind::StructValue(rds)) = config.fields.get("rds")?.kind.as_ref() else {
        return None;
    };
    ["route_config_name", "routeConfigName"].iter().find_map(|key| {
        match rds.fields.get(*key)?.kind.as_ref()? {
            Kind::StringValue(name) => Some(name.clone()),
            _ => None,
        }
    })
}
