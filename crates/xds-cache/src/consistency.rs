//! Referential consistency of snapshots.
//!
//! A proxy that receives a cluster referring to endpoints it was never
//! sent (or a listener referring to a missing route table) stalls its
//! warm-up. Before a snapshot is served, every dependency pair below must
//! hold: the distinct references from the source collection name exactly
//! the resources of the target collection.

use std::collections::BTreeSet;

use tracing::trace;
use xds_core::{TypeUrl, XdsError, XdsResult};

use crate::snapshot::{Snapshot, SnapshotResources};

/// `(source, target)` collections checked by [`Snapshot::consistent`], in
/// order.
pub const DEPENDENCIES: [(&str, &str); 4] = [
    (TypeUrl::CLUSTER, TypeUrl::ENDPOINT),
    (TypeUrl::LISTENER, TypeUrl::ROUTE),
    (TypeUrl::CLUSTER_V2, TypeUrl::ENDPOINT_V2),
    (TypeUrl::LISTENER_V2, TypeUrl::ROUTE_V2),
];

/// Check a possibly missing snapshot.
///
/// ```rust
/// use xds_cache::{check_consistency, Snapshot};
/// use xds_core::XdsError;
///
/// assert!(matches!(check_consistency(None), Err(XdsError::NilSnapshot)));
/// assert!(check_consistency(Some(&Snapshot::envoy())).is_ok());
/// ```
pub fn check_consistency(snapshot: Option<&Snapshot>) -> XdsResult<()> {
    snapshot.ok_or(XdsError::NilSnapshot)?.consistent()
}

impl Snapshot {
    /// Verify cross-collection references.
    ///
    /// For each of [`DEPENDENCIES`] the number of distinct references from
    /// the source collection into the target type must equal the target
    /// collection's size, and every reference must resolve. A missing
    /// collection counts as empty.
    pub fn consistent(&self) -> XdsResult<()> {
        let empty = SnapshotResources::default();
        for (source, target) in DEPENDENCIES {
            let sources = self.get_resources(source).unwrap_or(&empty);
            let targets = self.get_resources(target).unwrap_or(&empty);

            let references: BTreeSet<String> = sources
                .iter()
                .flat_map(|(_, resource)| resource.references())
                .filter(|reference| reference.type_url == target)
                .map(|reference| reference.name)
                .collect();

            if references.len() != targets.len() {
                return Err(XdsError::InconsistentReferences {
                    type_url: target.to_string(),
                    references: references.len(),
                    resources: targets.len(),
                });
            }
            if let Some(missing) = references.into_iter().find(|name| !targets.contains(name)) {
                return Err(XdsError::MissingReference {
                    type_url: target.to_string(),
                    name: missing,
                });
            }
            trace!(source, target, resources = targets.len(), "references consistent");
        }
        Ok(())
    }
}
