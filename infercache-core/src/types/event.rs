//! Lifecycle events emitted by the cache.

use std::fmt;
use std::time::Duration;

use super::key::CacheKey;

/// Why an entry left the cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RemovalCause {
    /// TTL elapsed; detected on access or by a sweep.
    Expired,
    /// Pushed out by the LRU policy to admit a new key.
    Evicted,
    /// Removed by an explicit `delete`.
    Deleted,
    /// Dropped by `clear`.
    Cleared,
}

impl RemovalCause {
    /// Stable lowercase name, used as a log field.
    pub fn as_str(&self) -> &'static str {
        match self {
            RemovalCause::Expired => "expired",
            RemovalCause::Evicted => "evicted",
            RemovalCause::Deleted => "deleted",
            RemovalCause::Cleared => "cleared",
        }
    }
}

impl fmt::Display for RemovalCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state transition of a single cache entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheEvent {
    /// A new key became live.
    Inserted {
        /// Key of the new entry
        key: CacheKey,
        /// TTL attached to the entry
        ttl: Duration,
    },
    /// An existing key was overwritten in place.
    Refreshed {
        /// Key of the refreshed entry
        key: CacheKey,
        /// New TTL attached to the entry
        ttl: Duration,
    },
    /// A key left the cache.
    Removed {
        /// Key of the removed entry
        key: CacheKey,
        /// What removed it
        cause: RemovalCause,
    },
}

impl CacheEvent {
    /// Returns the key this event is about.
    pub fn key(&self) -> &CacheKey {
        match self {
            CacheEvent::Inserted { key, .. }
            | CacheEvent::Refreshed { key, .. }
            | CacheEvent::Removed { key, .. } => key,
        }
    }

    /// Returns the removal cause, if this is a removal.
    pub fn removal_cause(&self) -> Option<RemovalCause> {
        match self {
            CacheEvent::Removed { cause, .. } => Some(*cause),
            _ => None,
        }
    }
}
