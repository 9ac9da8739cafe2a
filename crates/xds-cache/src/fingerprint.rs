//! Content fingerprints for change detection and versioning.

use std::collections::BTreeMap;
use std::fmt;
use std::hash::Hasher;

use fnv::FnvHasher;
use xds_core::{TypeUrl, XdsError, XdsResult};

use crate::snapshot::{Snapshot, SnapshotResources};

/// FNV-1a hash of a snapshot's encoded content.
///
/// Two snapshots with the same resources (by name and encoded bytes) in
/// the same collections have equal fingerprints, regardless of the order
/// the resources arrived in. Versions and creation times are not hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint {
    hash: u64,
    collections: BTreeMap<TypeUrl, u64>,
}

impl Fingerprint {
    /// Fingerprint a snapshot.
    ///
    /// Fails with [`XdsError::EncodingError`] if any resource cannot be
    /// encoded.
    pub fn of(snapshot: &Snapshot) -> XdsResult<Self> {
        let mut hasher = FnvHasher::default();
        let mut collections = BTreeMap::new();
        for (type_url, resources) in snapshot.iter() {
            let hash = hash_collection(type_url, resources)?;
            hasher.write(type_url.as_str().as_bytes());
            hasher.write_u64(hash);
            collections.insert(type_url.clone(), hash);
        }
        Ok(Self {
            hash: hasher.finish(),
            collections,
        })
    }

    /// The snapshot-wide hash.
    #[inline]
    pub fn as_u64(&self) -> u64 {
        self.hash
    }

    /// Hash of one collection.
    pub fn collection(&self, type_url: &str) -> Option<u64> {
        self.collections.get(type_url).copied()
    }

    /// Version string derived from the snapshot-wide hash.
    pub fn version(&self) -> String {
        format!("{:016x}", self.hash)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.hash)
    }
}

fn hash_collection(type_url: &TypeUrl, resources: &SnapshotResources) -> XdsResult<u64> {
    let mut hasher = FnvHasher::default();
    hasher.write(type_url.as_str().as_bytes());
    for (name, resource) in resources.iter() {
        let any = resource.encode().map_err(|e| XdsError::EncodingError {
            type_url: type_url.to_string(),
            message: format!("{name}: {e}"),
        })?;
        hasher.write(name.as_bytes());
        hasher.write_u8(0);
        hasher.write(any.type_url.as_bytes());
        hasher.write_u8(0);
        hasher.write_u64(any.value.len() as u64);
        hasher.write(&any.value);
    }
    Ok(hasher.finish())
}

impl Snapshot {
    /// Fingerprint this snapshot. See [`Fingerprint::of`].
    pub fn fingerprint(&self) -> XdsResult<Fingerprint> {
        Fingerprint::of(self)
    }

    /// Set the global version and each collection's version from a
    /// fingerprint of this snapshot's content.
    pub fn stamp(&mut self, fingerprint: &Fingerprint) {
        self.set_version(fingerprint.version());
        for (type_url, hash) in &fingerprint.collections {
            if let Some(collection) = self.get_resources_mut(type_url.as_str()) {
                collection.set_version(format!("{hash:016x}"));
            }
        }
    }
}
