//! Cache key type.

use std::fmt;

use crate::constants::{CACHE_KEY_SIZE, KEY_LOG_PREFIX_LEN};

/// Canonical identity of a cached computation.
///
/// A `CacheKey` is the digest of a `(tenant_id, model, prompt)` triple.
/// It is opaque and immutable: the only ways to obtain one are the key
/// codec in `infercache-key` or [`CacheKey::from_digest`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey([u8; CACHE_KEY_SIZE]);

impl CacheKey {
    /// Wraps a precomputed digest.
    pub const fn from_digest(digest: [u8; CACHE_KEY_SIZE]) -> Self {
        Self(digest)
    }

    /// Returns the raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; CACHE_KEY_SIZE] {
        &self.0
    }

    /// Returns the full lowercase hex encoding.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Returns a shortened hex prefix, suitable for log lines.
    pub fn short(&self) -> String {
        let mut encoded = self.to_hex();
        encoded.truncate(KEY_LOG_PREFIX_LEN);
        encoded
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.short())
    }
}

impl fmt::Debug for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CacheKey({})", self.to_hex())
    }
}

impl AsRef<[u8]> for CacheKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_roundtrip_length() {
        let key = CacheKey::from_digest([0xab; CACHE_KEY_SIZE]);
        assert_eq!(key.to_hex().len(), CACHE_KEY_SIZE * 2);
        assert!(key.to_hex().chars().all(|c| c == 'a' || c == 'b'));
    }

    #[test]
    fn test_display_is_short_prefix() {
        let key = CacheKey::from_digest([0x01; CACHE_KEY_SIZE]);
        let shown = key.to_string();
        assert_eq!(shown.len(), KEY_LOG_PREFIX_LEN);
        assert!(key.to_hex().starts_with(&shown));
    }

    #[test]
    fn test_debug_shows_full_digest() {
        let key = CacheKey::from_digest([0xff; CACHE_KEY_SIZE]);
        let debug = format!("{key:?}");
        assert!(debug.starts_with("CacheKey("));
        assert!(debug.contains(&key.to_hex()));
    }

    #[test]
    fn test_equality_follows_digest() {
        let a = CacheKey::from_digest([1; CACHE_KEY_SIZE]);
        let b = CacheKey::from_digest([1; CACHE_KEY_SIZE]);
        let c = CacheKey::from_digest([2; CACHE_KEY_SIZE]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
