//! Proxy node identification.

use std::fmt;
use std::hash::{Hash, Hasher};

use fnv::FnvHasher;

/// Cache key for a proxy node.
///
/// Node IDs are folded into an FNV-1a hash. Requests that carry no node
/// identity map to the wildcard key, which is also where the snapshot
/// shared by every proxy is stored.
///
/// ```rust
/// use xds_core::NodeHash;
///
/// let node = NodeHash::from_id("gateway-proxy-7d9f");
/// assert_eq!(node, NodeHash::from_id("gateway-proxy-7d9f"));
/// assert!(NodeHash::from_optional_id(None).is_wildcard());
/// assert!(NodeHash::from_optional_id(Some("")).is_wildcard());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeHash {
    hash: u64,
    is_wildcard: bool,
}

impl NodeHash {
    const WILDCARD_HASH: u64 = 0;

    /// Hash a node ID.
    #[must_use]
    pub fn from_id(node_id: &str) -> Self {
        let mut hasher = FnvHasher::default();
        node_id.hash(&mut hasher);
        // zero is reserved for the wildcard
        let hash = hasher.finish().max(1);
        Self {
            hash,
            is_wildcard: false,
        }
    }

    /// Hash an optional node ID; absent or empty IDs give the wildcard.
    #[must_use]
    pub fn from_optional_id(node_id: Option<&str>) -> Self {
        match node_id {
            Some(id) if !id.is_empty() => Self::from_id(id),
            _ => Self::wildcard(),
        }
    }

    /// The key shared by all nodes without a snapshot of their own.
    #[must_use]
    pub fn wildcard() -> Self {
        Self {
            hash: Self::WILDCARD_HASH,
            is_wildcard: true,
        }
    }

    /// Check if this is the wildcard key.
    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.is_wildcard
    }

    /// Get the raw hash value.
    #[must_use]
    pub fn as_u64(&self) -> u64 {
        self.hash
    }
}

impl fmt::Display for NodeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_wildcard {
            write!(f, "<wildcard>")
        } else {
            write!(f, "{:016x}", self.hash)
        }
    }
}

impl Default for NodeHash {
    fn default() -> Self {
        Self::wildcard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_hash_deterministic() {
        let node1 = NodeHash::from_id("test-node");
        let node2 = NodeHash::from_id("test-node");
        assert_eq!(node1, node2);
        assert!(!node1.is_wildcard());
        assert_ne!(node1.as_u64(), 0);
    }

    #[test]
    fn test_different_nodes_different_hashes() {
        assert_ne!(NodeHash::from_id("node-1"), NodeHash::from_id("node-2"));
    }

    #[test]
    fn test_missing_identity_is_wildcard() {
        assert_eq!(NodeHash::from_optional_id(None), NodeHash::wildcard());
        assert_eq!(NodeHash::from_optional_id(Some("")), NodeHash::default());
        assert_eq!(NodeHash::from_optional_id(Some("n")), NodeHash::from_id("n"));
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", NodeHash::from_id("test")).len(), 16);
        assert_eq!(format!("{}", NodeHash::wildcard()), "<wildcard>");
    }
}
