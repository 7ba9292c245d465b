//! Common traits for infercache.
//!
//! These are the seams the cache calls out through. Both are injected at
//! construction time so the cache never reaches for global state and can be
//! driven deterministically in tests.

use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, info};

use crate::types::{CacheEvent, RemovalCause};

// ═══════════════════════════════════════════════════════════════════════════════
// OBSERVER TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Receives entry lifecycle events from a cache.
///
/// Called after the cache has released its lock, so implementations may
/// block or take their own locks without stalling other cache callers.
///
/// Events from one call arrive in order. Events from concurrent calls on the
/// same key may interleave out of order (a `Removed { Deleted }` can arrive
/// before the `Inserted` it removed), even though the cache state itself is
/// always consistent. Observers that need an exact history should not rely
/// on delivery order across threads.
pub trait CacheObserver: Send + Sync {
    /// Handles a single event.
    fn on_event(&self, event: &CacheEvent);
}

impl<T: CacheObserver + ?Sized> CacheObserver for Arc<T> {
    fn on_event(&self, event: &CacheEvent) {
        (**self).on_event(event)
    }
}

/// Observer that reports events through `tracing`.
///
/// Evictions log at `info` since they signal capacity pressure; everything
/// else logs at `debug`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl CacheObserver for TracingObserver {
    fn on_event(&self, event: &CacheEvent) {
        match event {
            CacheEvent::Inserted { key, ttl } => {
                debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "Cache entry inserted");
            }
            CacheEvent::Refreshed { key, ttl } => {
                debug!(key = %key, ttl_ms = ttl.as_millis() as u64, "Cache entry refreshed");
            }
            CacheEvent::Removed { key, cause: RemovalCause::Evicted } => {
                info!(key = %key, "Evicting least recently used cache entry");
            }
            CacheEvent::Removed { key, cause } => {
                debug!(key = %key, cause = cause.as_str(), "Cache entry removed");
            }
        }
    }
}

/// Observer that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl CacheObserver for NoopObserver {
    fn on_event(&self, _event: &CacheEvent) {}
}

// ═══════════════════════════════════════════════════════════════════════════════
// CLOCK TRAIT
// ═══════════════════════════════════════════════════════════════════════════════

/// Monotonic time source used for TTL bookkeeping.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> Instant;
}

impl<T: Clock + ?Sized> Clock for Arc<T> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// Wall-clock time via `Instant::now`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Clock that only moves when told to.
///
/// Starts at the instant it was created and advances by explicit calls to
/// [`ManualClock::advance`]. Share it with a cache through an `Arc`.
#[derive(Debug)]
pub struct ManualClock {
    origin: Instant,
    offset: Mutex<Duration>,
}

impl ManualClock {
    /// Creates a clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }

    /// Moves the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.offset.lock() += by;
    }

    /// Returns how far the clock has moved since creation.
    pub fn elapsed(&self) -> Duration {
        *self.offset.lock()
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.origin + *self.offset.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::CACHE_KEY_SIZE;
    use crate::types::CacheKey;

    #[derive(Default)]
    struct Counting(Mutex<usize>);

    impl CacheObserver for Counting {
        fn on_event(&self, _event: &CacheEvent) {
            *self.0.lock() += 1;
        }
    }

    #[test]
    fn test_manual_clock_only_moves_on_advance() {
        let clock = ManualClock::new();
        let t0 = clock.now();
        assert_eq!(clock.now(), t0);

        clock.advance(Duration::from_secs(2));
        assert_eq!(clock.now() - t0, Duration::from_secs(2));
        assert_eq!(clock.elapsed(), Duration::from_secs(2));
    }

    #[test]
    fn test_shared_clock_through_arc() {
        let clock = Arc::new(ManualClock::new());
        let shared: Arc<dyn Clock> = clock.clone();
        let t0 = shared.now();
        clock.advance(Duration::from_millis(250));
        assert_eq!(shared.now() - t0, Duration::from_millis(250));
    }

    #[test]
    fn test_system_clock_monotonic() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
    }

    #[test]
    fn test_observer_through_arc() {
        let counting = Arc::new(Counting::default());
        let observer: Arc<dyn CacheObserver> = counting.clone();
        let key = CacheKey::from_digest([0; CACHE_KEY_SIZE]);

        observer.on_event(&CacheEvent::Removed { key, cause: RemovalCause::Deleted });
        TracingObserver.on_event(&CacheEvent::Inserted { key, ttl: Duration::from_secs(1) });
        NoopObserver.on_event(&CacheEvent::Removed { key, cause: RemovalCause::Cleared });

        assert_eq!(*counting.0.lock(), 1);
    }
}
