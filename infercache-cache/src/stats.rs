//! Cache statistics.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use infercache_core::types::RemovalCause;

/// Running counters updated by cache operations.
#[derive(Debug, Default)]
pub(crate) struct CacheMetrics {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    updates: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
    deletions: AtomicU64,
}

impl CacheMetrics {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_update(&self) {
        self.updates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_removal(&self, cause: RemovalCause) {
        let counter = match cause {
            RemovalCause::Evicted => &self.evictions,
            RemovalCause::Expired => &self.expirations,
            RemovalCause::Deleted | RemovalCause::Cleared => &self.deletions,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, len: usize, capacity: usize) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            updates: self.updates.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            deletions: self.deletions.load(Ordering::Relaxed),
            len,
            capacity,
        }
    }
}

/// Cache statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups that returned a live value
    pub hits: u64,
    /// Lookups that found nothing or an expired entry
    pub misses: u64,
    /// Sets that admitted a new key
    pub inserts: u64,
    /// Sets that overwrote a live key
    pub updates: u64,
    /// Entries pushed out by the LRU policy
    pub evictions: u64,
    /// Entries dropped after their TTL elapsed
    pub expirations: u64,
    /// Entries removed by `delete` or `clear`
    pub deletions: u64,
    /// Entries held at snapshot time, including expired entries not yet observed
    pub len: usize,
    /// Maximum capacity
    pub capacity: usize,
}

impl CacheStats {
    /// Fraction of lookups that hit, in `[0.0, 1.0]`.
    pub fn hit_rate(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}
