//! State-of-the-world message plumbing.
//!
//! The v3 and v2 discovery messages are wire-identical in the fields the
//! server reads, so the handler works on version-neutral [`SotwRequest`]
//! and [`SotwResponse`] values and converts at the edges.

use xds_cache::Snapshot;
use xds_core::{XdsError, XdsResult};
use xds_types::envoy::api::v2;
use xds_types::envoy::config::core::v3::ControlPlane;
use xds_types::envoy::service::discovery::v3;

use crate::utils::generate_nonce;

/// A state-of-the-world discovery request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SotwRequest {
    /// Version the client last accepted for this type.
    pub version_info: String,
    /// Node ID, if the request carried a node.
    pub node_id: Option<String>,
    /// Requested names; empty means every resource.
    pub resource_names: Vec<String>,
    /// Requested type.
    pub type_url: String,
    /// Nonce of the response this request answers.
    pub response_nonce: String,
    /// Rejection message when the client NACKs the previous response.
    pub error_detail: Option<String>,
}

impl SotwRequest {
    /// Whether this request rejects the response it answers.
    #[inline]
    pub fn is_nack(&self) -> bool {
        self.error_detail.is_some()
    }
}

/// A state-of-the-world discovery response.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SotwResponse {
    /// Version of the collection the resources come from.
    pub version_info: String,
    /// Encoded resources.
    pub resources: Vec<prost_types::Any>,
    /// Type of the resources.
    pub type_url: String,
    /// Nonce the client echoes back.
    pub nonce: String,
    /// Management server identity.
    pub control_plane: Option<String>,
}

/// Build the response for one type from a snapshot.
///
/// Returns `None` when the snapshot has no collection for the type.
/// Requested names missing from the collection are left out.
pub fn build_response(
    snapshot: &Snapshot,
    type_url: &str,
    resource_names: &[String],
) -> XdsResult<Option<SotwResponse>> {
    let Some(collection) = snapshot.get_resources(type_url) else {
        return Ok(None);
    };

    let selected: Vec<_> = if resource_names.is_empty() {
        collection.iter().map(|(_, resource)| resource).collect()
    } else {
        resource_names
            .iter()
            .filter_map(|name| collection.get(name))
            .collect()
    };

    let resources = selected
        .into_iter()
        .map(|resource| {
            resource.encode().map_err(|e| XdsError::EncodingError {
                type_url: type_url.to_string(),
                message: format!("{}: {e}", resource.name()),
            })
        })
        .collect::<XdsResult<Vec<_>>>()?;

    Ok(Some(SotwResponse {
        version_info: collection.version().to_string(),
        resources,
        type_url: type_url.to_string(),
        nonce: generate_nonce(),
        control_plane: None,
    }))
}

fn error_message(status: xds_types::google::rpc::Status) -> String {
    if status.message.is_empty() {
        format!("rejected with code {}", status.code)
    } else {
        status.message
    }
}

impl From<v3::DiscoveryRequest> for SotwRequest {
    fn from(request: v3::DiscoveryRequest) -> Self {
        Self {
            version_info: request.version_info,
            node_id: request.node.map(|node| node.id),
            resource_names: request.resource_names,
            type_url: request.type_url,
            response_nonce: request.response_nonce,
            error_detail: request.error_detail.map(error_message),
        }
    }
}

impl From<v2::DiscoveryRequest> for SotwRequest {
    fn from(request: v2::DiscoveryRequest) -> Self {
        Self {
            version_info: request.version_info,
            node_id: request.node.map(|node| node.id),
            resource_names: request.resource_names,
            type_url: request.type_url,
            response_nonce: request.response_nonce,
            error_detail: request.error_detail.map(error_message),
        }
    }
}

impl From<SotwResponse> for v3::DiscoveryResponse {
    fn from(response: SotwResponse) -> Self {
        Self {
            version_info: response.version_info,
            resources: response.resources,
            canary: false,
            type_url: response.type_url,
            nonce: response.nonce,
            control_plane: response
                .control_plane
                .map(|identifier| ControlPlane { identifier }),
        }
    }
}

impl From<SotwResponse> for v2::DiscoveryResponse {
    fn from(response: SotwResponse) -> Self {
        Self {
            version_info: response.version_info,
            resources: response.resources,
            canary: false,
            type_url: response.type_url,
            nonce: response.nonce,
            control_plane: response
                .control_plane
                .map(|identifier| v2::core::ControlPlane { identifier }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use xds_core::{AnyResource, BoxResource, TypeUrl};
    use xds_types::envoy::config::core::v3::Node;
    use xds_types::google::rpc::Status;

    fn cluster(name: &str) -> BoxResource {
        Arc::new(AnyResource::new(
            name,
            prost_types::Any {
                type_url: TypeUrl::CLUSTER.to_string(),
                value: name.as_bytes().to_vec(),
            },
        ))
    }

    fn snapshot() -> Snapshot {
        let mut snapshot = Snapshot::envoy();
        snapshot.set_resources(TypeUrl::CLUSTER, vec![cluster("b"), cluster("a")]);
        let fingerprint = snapshot.fingerprint().expect("fingerprint");
        snapshot.stamp(&fingerprint);
        snapshot
    }

    #[test]
    fn wildcard_response_carries_whole_collection() {
        let snapshot = snapshot();
        let response = build_response(&snapshot, TypeUrl::CLUSTER, &[])
            .expect("encode")
            .expect("collection");

        assert_eq!(response.resources.len(), 2);
        assert_eq!(response.resources[0].value, b"a".to_vec());
        assert_eq!(
            Some(response.version_info.as_str()),
            snapshot.get_version(TypeUrl::CLUSTER)
        );
        assert!(!response.nonce.is_empty());
    }

    #[test]
    fn named_response_skips_unknown_names() {
        let snapshot = snapshot();
        let names = vec!["b".to_string(), "missing".to_string()];
        let response = build_response(&snapshot, TypeUrl::CLUSTER, &names)
            .expect("encode")
            .expect("collection");

        assert_eq!(response.resources.len(), 1);
        assert_eq!(response.resources[0].value, b"b".to_vec());
    }

    #[test]
    fn missing_collection_yields_nothing() {
        let snapshot = snapshot();
        let response = build_response(&snapshot, TypeUrl::SECRET, &[]).expect("encode");
        assert!(response.is_none());
    }

    #[test]
    fn nack_detail_survives_conversion() {
        let request = v3::DiscoveryRequest {
            node: Some(Node {
                id: "proxy".to_string(),
                ..Node::default()
            }),
            type_url: TypeUrl::CLUSTER.to_string(),
            error_detail: Some(Status {
                code: 3,
                message: String::new(),
                details: Vec::new(),
            }),
            ..v3::DiscoveryRequest::default()
        };

        let request = SotwRequest::from(request);
        assert!(request.is_nack());
        assert_eq!(request.node_id.as_deref(), Some("proxy"));
        assert_eq!(request.error_detail.as_deref(), Some("rejected with code 3"));
    }

    #[test]
    fn response_converts_to_both_versions() {
        let response = SotwResponse {
            version_info: "v1".to_string(),
            type_url: TypeUrl::CLUSTER_V2.to_string(),
            nonce: "n".to_string(),
            control_plane: Some("gloo".to_string()),
            ..SotwResponse::default()
        };

        let legacy = v2::DiscoveryResponse::from(response.clone());
        assert_eq!(legacy.version_info, "v1");
        assert_eq!(legacy.control_plane.map(|c| c.identifier).as_deref(), Some("gloo"));

        let current = v3::DiscoveryResponse::from(response);
        assert_eq!(current.nonce, "n");
    }
}
