//! Consistency checks on real proxy resources.

use gateway_xds::prelude::*;

use crate::fixtures::{eds_cluster, endpoints, listener, route, snapshot};

#[test]
fn eds_cluster_with_its_endpoints_is_consistent() {
    let snapshot = snapshot(vec![
        (TypeUrl::CLUSTER, vec![eds_cluster("svcA")]),
        (TypeUrl::ENDPOINT, vec![endpoints("svcA")]),
    ])
    .expect("snapshot");

    assert!(check_consistency(Some(&snapshot)).is_ok());
}

#[test]
fn listener_without_its_route_is_a_length_mismatch() {
    let snapshot = snapshot(vec![(TypeUrl::LISTENER, vec![listener("http", "rt1")])])
        .expect("snapshot");

    match snapshot.consistent() {
        Err(XdsError::InconsistentReferences {
            type_url,
            references,
            resources,
        }) => {
            assert_eq!(type_url, TypeUrl::ROUTE);
            assert_eq!(references, 1);
            assert_eq!(resources, 0);
        }
        other => panic!("expected a length mismatch, got {other:?}"),
    }
}

#[test]
fn listener_pointing_at_the_wrong_route_is_missing_reference() {
    let snapshot = snapshot(vec![
        (TypeUrl::LISTENER, vec![listener("http", "rt1")]),
        (TypeUrl::ROUTE, vec![route("rt2")]),
    ])
    .expect("snapshot");

    assert!(matches!(
        snapshot.consistent(),
        Err(XdsError::MissingReference { ref name, .. }) if name == "rt1"
    ));
}

#[test]
fn listeners_sharing_a_route_need_it_once() {
    let snapshot = snapshot(vec![
        (
            TypeUrl::LISTENER,
            vec![listener("http", "rt1"), listener("http-alt", "rt1")],
        ),
        (TypeUrl::ROUTE, vec![route("rt1")]),
    ])
    .expect("snapshot");

    assert!(snapshot.consistent().is_ok());
}

#[test]
fn missing_snapshot_is_an_error() {
    assert!(matches!(check_consistency(None), Err(XdsError::NilSnapshot)));
}
