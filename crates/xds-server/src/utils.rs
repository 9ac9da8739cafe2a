//! Shared utilities for xds-server.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Global counter for generating unique nonces.
static NONCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a unique nonce for discovery responses.
///
/// The format is `{timestamp_hex}-{counter_hex}`. The counter keeps nonces
/// unique within the process; the timestamp keeps them unique across
/// restarts, so a proxy reconnecting with an old nonce never matches.
pub fn generate_nonce() -> String {
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos() as u64;

    let count = NONCE_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{timestamp:x}-{count:x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonce_unique() {
        let n1 = generate_nonce();
        let n2 = generate_nonce();
        assert_ne!(n1, n2, "nonces should be unique");
    }

    #[test]
    fn nonce_format() {
        let nonce = generate_nonce();
        assert!(nonce.contains('-'), "nonce should contain separator");
        assert!(!nonce.is_empty());
    }
}
