//! In-memory TTL + LRU cache for inference responses.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use parking_lot::Mutex;
use tracing::debug;

use infercache_core::constants::PREALLOC_LIMIT;
use infercache_core::error::{CacheError, Result};
use infercache_core::traits::{CacheObserver, Clock, SystemClock, TracingObserver};
use infercache_core::types::{CacheEvent, CacheKey, RemovalCause};
use infercache_key::make_key;

use crate::config::CacheConfig;
use crate::ledger::{Ledger, RecencyToken};
use crate::stats::{CacheMetrics, CacheStats};
use crate::sweeper::{SweepPolicy, Sweeper};

/// Cache entry with expiry.
#[derive(Clone, Debug)]
struct CacheEntry {
    value: Bytes,
    created_at: Instant,
    expires_at: Instant,
    token: RecencyToken,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Map and ledger, always mutated together under one lock.
#[derive(Debug)]
struct CacheState {
    entries: HashMap<CacheKey, CacheEntry>,
    ledger: Ledger<CacheKey>,
}

impl CacheState {
    fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(PREALLOC_LIMIT);
        Self {
            entries: HashMap::with_capacity(capacity),
            ledger: Ledger::with_capacity(capacity),
        }
    }

    fn remove(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.ledger.remove(key);
        Some(entry)
    }

    fn evict_least_recent(&mut self) -> CacheKey {
        let victim = match self.ledger.evict_least_recent() {
            Ok(key) => key,
            Err(err) => panic!("cache at capacity but {err}: map and ledger diverged"),
        };
        self.entries.remove(&victim);
        victim
    }
}

/// State shared between cache handles and the sweeper thread.
pub(crate) struct Shared {
    state: Mutex<CacheState>,
    capacity: usize,
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn CacheObserver>,
    metrics: CacheMetrics,
}

impl Shared {
    fn insert(&self, key: CacheKey, value: Bytes, ttl: Duration) -> Result<()> {
        if ttl.is_zero() {
            return Err(CacheError::InvalidTtl { ttl_seconds: 0 });
        }

        let mut events = Vec::with_capacity(2);
        {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let now = self.clock.now();
            let expires_at = now.checked_add(ttl).ok_or(CacheError::InvalidTtl {
                ttl_seconds: i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX),
            })?;

            let stale = state
                .entries
                .get(&key)
                .is_some_and(|entry| entry.is_expired(now));
            if stale {
                state.remove(&key);
                events.push(self.removed(key, RemovalCause::Expired));
            }

            if let Some(entry) = state.entries.get_mut(&key) {
                entry.value = value;
                entry.created_at = now;
                entry.expires_at = expires_at;
                state.ledger.promote(entry.token);
                self.metrics.record_update();
                events.push(CacheEvent::Refreshed { key, ttl });
            } else {
                if state.entries.len() >= self.capacity {
                    let victim = state.evict_least_recent();
                    events.push(self.removed(victim, RemovalCause::Evicted));
                }
                let token = state.ledger.touch(&key);
                state.entries.insert(
                    key,
                    CacheEntry {
                        value,
                        created_at: now,
                        expires_at,
                        token,
                    },
                );
                self.metrics.record_insert();
                events.push(CacheEvent::Inserted { key, ttl });
            }

            debug_assert_eq!(state.entries.len(), state.ledger.len());
            debug_assert!(state.entries.len() <= self.capacity);
        }
        self.notify(&events);
        Ok(())
    }

    fn lookup(&self, key: &CacheKey, promote: bool) -> Option<Bytes> {
        let (value, expired) = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            let now = self.clock.now();

            match state.entries.get(key) {
                None => (None, false),
                Some(entry) if entry.is_expired(now) => {
                    state.remove(key);
                    (None, true)
                }
                Some(entry) => {
                    if promote {
                        state.ledger.promote(entry.token);
                    }
                    (Some(entry.value.clone()), false)
                }
            }
        };

        if expired {
            self.notify(&[self.removed(*key, RemovalCause::Expired)]);
        }
        if promote {
            match value {
                Some(_) => self.metrics.record_hit(),
                None => self.metrics.record_miss(),
            }
        }
        value
    }

    fn delete(&self, key: &CacheKey) -> bool {
        let removed = self.state.lock().remove(key).is_some();
        if removed {
            self.notify(&[self.removed(*key, RemovalCause::Deleted)]);
        }
        removed
    }

    /// Removes every expired entry. Returns how many were removed.
    pub(crate) fn purge_expired(&self) -> usize {
        let events: Vec<CacheEvent> = {
            let mut state = self.state.lock();
            let now = self.clock.now();
            let expired: Vec<CacheKey> = state
                .entries
                .iter()
                .filter(|(_, entry)| entry.is_expired(now))
                .map(|(key, _)| *key)
                .collect();
            for key in &expired {
                state.remove(key);
            }
            expired
                .into_iter()
                .map(|key| self.removed(key, RemovalCause::Expired))
                .collect()
        };
        self.notify(&events);
        events.len()
    }

    fn clear(&self) -> usize {
        let keys: Vec<CacheKey> = {
            let mut state = self.state.lock();
            state.ledger.clear();
            state.entries.drain().map(|(key, _)| key).collect()
        };
        let events: Vec<CacheEvent> = keys
            .into_iter()
            .map(|key| self.removed(key, RemovalCause::Cleared))
            .collect();
        self.notify(&events);
        events.len()
    }

    fn removed(&self, key: CacheKey, cause: RemovalCause) -> CacheEvent {
        self.metrics.record_removal(cause);
        CacheEvent::Removed { key, cause }
    }

    fn notify(&self, events: &[CacheEvent]) {
        for event in events {
            self.observer.on_event(event);
        }
    }
}

/// Thread-safe cache with per-entry TTL and LRU eviction.
///
/// Entries are keyed by `(tenant_id, model, prompt)`. Two forces remove
/// them independently:
///
/// - **TTL**: an entry read at or after its expiry is dropped and reported
///   as a miss. A [`SweepPolicy::Background`] sweeper can also purge expired
///   entries that are never read again.
/// - **LRU**: admitting a new key into a full cache first evicts the least
///   recently used entry. Both `get` and `set` count as a use.
///
/// All operations take a single lock over the map and the recency ledger,
/// so concurrent callers never see one updated without the other. Share a
/// cache across threads with `Arc<TtlCache>`.
///
/// # Example
///
/// ```rust
/// use infercache_cache::TtlCache;
///
/// let cache = TtlCache::new(2).unwrap();
/// cache.set("t1", "m1", "p1", "v1", 60).unwrap();
/// assert_eq!(cache.get("t1", "m1", "p1").as_deref(), Some(&b"v1"[..]));
/// ```
pub struct TtlCache {
    shared: Arc<Shared>,
    _sweeper: Option<Sweeper>,
}

impl TtlCache {
    /// Creates a cache holding at most `capacity` entries.
    ///
    /// Uses the system clock, logs events through `tracing`, and expires
    /// entries lazily.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidCapacity`] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::builder().capacity(capacity).build()
    }

    /// Creates a cache from a configuration.
    pub fn with_config(config: CacheConfig) -> Result<Self> {
        Self::builder().config(&config).build()
    }

    /// Returns a builder for a customised cache.
    pub fn builder() -> CacheBuilder {
        CacheBuilder::default()
    }

    // -- identity-based API ----------------------------------------------------

    /// Caches `value` for `ttl_seconds` under `(tenant_id, model, prompt)`.
    ///
    /// Overwrites an existing entry in place and marks it most recently used.
    /// Admitting a new key into a full cache evicts the least recently used
    /// entry first.
    ///
    /// # Errors
    ///
    /// - [`CacheError::InvalidTtl`] if `ttl_seconds <= 0`
    /// - [`CacheError::InvalidKey`] if `tenant_id` or `model` is blank
    ///
    /// Nothing is modified when an error is returned.
    pub fn set(
        &self,
        tenant_id: &str,
        model: &str,
        prompt: &str,
        value: impl Into<Bytes>,
        ttl_seconds: i64,
    ) -> Result<()> {
        let ttl = ttl_from_seconds(ttl_seconds)?;
        self.set_with_ttl(tenant_id, model, prompt, value, ttl)
    }

    /// Like [`set`](Self::set) with a `Duration` TTL.
    pub fn set_with_ttl(
        &self,
        tenant_id: &str,
        model: &str,
        prompt: &str,
        value: impl Into<Bytes>,
        ttl: Duration,
    ) -> Result<()> {
        let key = make_key(tenant_id, model, prompt)?;
        self.set_key(key, value, ttl)
    }

    /// Like [`set`](Self::set) with the configured default TTL.
    pub fn set_default(
        &self,
        tenant_id: &str,
        model: &str,
        prompt: &str,
        value: impl Into<Bytes>,
    ) -> Result<()> {
        self.set_with_ttl(tenant_id, model, prompt, value, self.shared.default_ttl)
    }

    /// Returns the live value for `(tenant_id, model, prompt)`.
    ///
    /// A hit marks the entry most recently used. An expired entry is removed
    /// and reported as a miss. An identity that could never have been stored
    /// (blank tenant or model) is also a miss.
    pub fn get(&self, tenant_id: &str, model: &str, prompt: &str) -> Option<Bytes> {
        match make_key(tenant_id, model, prompt) {
            Ok(key) => self.get_key(&key),
            Err(err) => {
                debug!(error = %err, "Cache lookup with invalid identity");
                self.shared.metrics.record_miss();
                None
            }
        }
    }

    /// Removes the entry for `(tenant_id, model, prompt)`, if any.
    pub fn delete(&self, tenant_id: &str, model: &str, prompt: &str) {
        match make_key(tenant_id, model, prompt) {
            Ok(key) => {
                self.delete_key(&key);
            }
            Err(err) => debug!(error = %err, "Cache delete with invalid identity"),
        }
    }

    // -- key-based API ---------------------------------------------------------

    /// Caches `value` under a precomputed key.
    ///
    /// # Errors
    ///
    /// [`CacheError::InvalidTtl`] if `ttl` is zero or overflows the clock.
    pub fn set_key(&self, key: CacheKey, value: impl Into<Bytes>, ttl: Duration) -> Result<()> {
        self.shared.insert(key, value.into(), ttl)
    }

    /// Returns the live value under `key`, marking it most recently used.
    pub fn get_key(&self, key: &CacheKey) -> Option<Bytes> {
        self.shared.lookup(key, true)
    }

    /// Returns true if `key` holds a live value.
    ///
    /// Does not affect recency or hit statistics. An expired entry found here
    /// is removed, as with any other access.
    pub fn contains_key(&self, key: &CacheKey) -> bool {
        self.shared.lookup(key, false).is_some()
    }

    /// Removes `key`. Returns whether an entry was present.
    pub fn delete_key(&self, key: &CacheKey) -> bool {
        self.shared.delete(key)
    }

    // -- maintenance -----------------------------------------------------------

    /// Removes all expired entries now. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        self.shared.purge_expired()
    }

    /// Removes every entry. Returns how many were removed.
    pub fn clear(&self) -> usize {
        self.shared.clear()
    }

    /// Returns the number of entries held, including expired entries that
    /// have not been observed yet.
    pub fn len(&self) -> usize {
        self.shared.state.lock().entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the maximum number of entries.
    pub fn capacity(&self) -> usize {
        self.shared.capacity
    }

    /// Returns the TTL used by [`set_default`](Self::set_default).
    pub fn default_ttl(&self) -> Duration {
        self.shared.default_ttl
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.shared.metrics.snapshot(self.len(), self.shared.capacity)
    }

    /// Keys from most to least recently used.
    #[cfg(test)]
    pub(crate) fn recency_order(&self) -> Vec<CacheKey> {
        self.shared.state.lock().ledger.iter().copied().collect()
    }

    /// Asserts that map and ledger agree.
    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        let state = self.shared.state.lock();
        assert_eq!(state.entries.len(), state.ledger.len());
        assert!(state.entries.len() <= self.shared.capacity);
        for (key, entry) in &state.entries {
            assert_eq!(state.ledger.token_of(key), Some(entry.token));
            assert!(entry.created_at <= entry.expires_at);
        }
    }
}

impl std::fmt::Debug for TtlCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TtlCache")
            .field("len", &self.len())
            .field("capacity", &self.shared.capacity)
            .field("default_ttl", &self.shared.default_ttl)
            .finish_non_exhaustive()
    }
}

fn ttl_from_seconds(ttl_seconds: i64) -> Result<Duration> {
    u64::try_from(ttl_seconds)
        .ok()
        .filter(|&secs| secs > 0)
        .map(Duration::from_secs)
        .ok_or(CacheError::InvalidTtl { ttl_seconds })
}

/// Builder for [`TtlCache`].
pub struct CacheBuilder {
    capacity: usize,
    default_ttl: Duration,
    sweep: SweepPolicy,
    clock: Arc<dyn Clock>,
    observer: Arc<dyn CacheObserver>,
}

impl Default for CacheBuilder {
    fn default() -> Self {
        let config = CacheConfig::default();
        Self {
            capacity: config.capacity,
            default_ttl: config.default_ttl(),
            sweep: config.sweep_policy(),
            clock: Arc::new(SystemClock),
            observer: Arc::new(TracingObserver),
        }
    }
}

impl CacheBuilder {
    /// Sets the maximum number of entries.
    pub fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the TTL used by `set_default`.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    /// Sets how expired entries are reclaimed.
    pub fn sweep(mut self, policy: SweepPolicy) -> Self {
        self.sweep = policy;
        self
    }

    /// Applies capacity, default TTL and sweep policy from a configuration.
    pub fn config(self, config: &CacheConfig) -> Self {
        self.capacity(config.capacity)
            .default_ttl(config.default_ttl())
            .sweep(config.sweep_policy())
    }

    /// Sets the time source.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Sets the event observer.
    pub fn observer(mut self, observer: Arc<dyn CacheObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Builds the cache, starting the sweeper if one was requested.
    ///
    /// # Errors
    ///
    /// - [`CacheError::InvalidCapacity`] if capacity is zero
    /// - [`CacheError::ConfigError`] if the default TTL or sweep interval is zero
    /// - [`CacheError::SweeperSpawn`] if the sweeper thread cannot start
    pub fn build(self) -> Result<TtlCache> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidCapacity(self.capacity));
        }
        if self.default_ttl.is_zero() {
            return Err(CacheError::ConfigError("default TTL must be greater than zero".into()));
        }

        let shared = Arc::new(Shared {
            state: Mutex::new(CacheState::with_capacity(self.capacity)),
            capacity: self.capacity,
            default_ttl: self.default_ttl,
            clock: self.clock,
            observer: self.observer,
            metrics: CacheMetrics::default(),
        });

        let sweeper = match self.sweep {
            SweepPolicy::Lazy => None,
            SweepPolicy::Background { interval } if interval.is_zero() => {
                return Err(CacheError::ConfigError(
                    "sweep interval must be greater than zero".into(),
                ));
            }
            SweepPolicy::Background { interval } => {
                Some(Sweeper::spawn(Arc::downgrade(&shared), interval)?)
            }
        };

        debug!(capacity = shared.capacity, sweep = ?self.sweep, "Created TTL cache");
        Ok(TtlCache {
            shared,
            _sweeper: sweeper,
        })
    }
}
