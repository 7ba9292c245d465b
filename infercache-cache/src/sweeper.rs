//! Optional background expiry sweep.
//!
//! Lazy expiry alone is enough for correct reads, but an entry that is never
//! read again keeps its memory until LRU pressure pushes it out. The sweeper
//! bounds that by purging expired entries on a fixed interval, under the same
//! lock as every other cache operation.

use std::sync::{Arc, Weak};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::{Condvar, Mutex};
use tracing::{debug, instrument, warn};

use infercache_core::error::{CacheError, Result};

use crate::cache::Shared;

/// How expired entries are reclaimed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SweepPolicy {
    /// Expired entries are removed only when accessed or evicted.
    #[default]
    Lazy,
    /// A background thread also purges expired entries every `interval`.
    Background {
        /// Time between sweeps
        interval: Duration,
    },
}

#[derive(Default)]
struct StopSignal {
    stopped: Mutex<bool>,
    wakeup: Condvar,
}

/// Handle to a running sweeper thread. Stops and joins the thread on drop.
pub(crate) struct Sweeper {
    signal: Arc<StopSignal>,
    handle: Option<JoinHandle<()>>,
}

impl Sweeper {
    /// Starts a sweeper for `shared`.
    ///
    /// The thread holds only a weak reference, so it never keeps a dropped
    /// cache alive.
    pub(crate) fn spawn(shared: Weak<Shared>, interval: Duration) -> Result<Self> {
        let signal = Arc::new(StopSignal::default());
        let thread_signal = Arc::clone(&signal);

        let handle = thread::Builder::new()
            .name("infercache-sweeper".into())
            .spawn(move || run(shared, interval, thread_signal))
            .map_err(|e| CacheError::SweeperSpawn(e.to_string()))?;

        debug!(interval_ms = interval.as_millis() as u64, "Started cache sweeper");
        Ok(Self {
            signal,
            handle: Some(handle),
        })
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        *self.signal.stopped.lock() = true;
        self.signal.wakeup.notify_all();

        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("Cache sweeper thread panicked");
            }
        }
    }
}

#[instrument(skip(shared, signal), fields(interval_ms = interval.as_millis() as u64))]
fn run(shared: Weak<Shared>, interval: Duration, signal: Arc<StopSignal>) {
    loop {
        {
            let mut stopped = signal.stopped.lock();
            if !*stopped {
                signal.wakeup.wait_for(&mut stopped, interval);
            }
            if *stopped {
                break;
            }
        }

        let Some(shared) = shared.upgrade() else {
            break;
        };
        let purged = shared.purge_expired();
        if purged > 0 {
            debug!(purged, "Sweep removed expired entries");
        }
    }
    debug!("Cache sweeper stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    use infercache_core::traits::ManualClock;

    use crate::cache::TtlCache;

    fn wait_until(deadline: Duration, mut done: impl FnMut() -> bool) -> bool {
        let start = Instant::now();
        while start.elapsed() < deadline {
            if done() {
                return true;
            }
            thread::sleep(Duration::from_millis(5));
        }
        done()
    }

    #[test]
    fn test_background_sweep_purges_unread_entries() {
        let clock = Arc::new(ManualClock::new());
        let cache = TtlCache::builder()
            .capacity(8)
            .clock(clock.clone())
            .sweep(SweepPolicy::Background { interval: Duration::from_millis(10) })
            .build()
            .unwrap();

        cache.set("t", "m", "short", "v", 1).unwrap();
        cache.set("t", "m", "long", "v", 600).unwrap();
        clock.advance(Duration::from_secs(2));

        assert!(wait_until(Duration::from_secs(5), || cache.len() == 1));
        assert!(cache.get("t", "m", "long").is_some());
        assert_eq!(cache.stats().expirations, 1);
    }

    #[test]
    fn test_lazy_policy_leaves_expired_entries_until_read() {
        let clock = Arc::new(ManualClock::new());
        let cache = TtlCache::builder()
            .capacity(8)
            .clock(clock.clone())
            .sweep(SweepPolicy::Lazy)
            .build()
            .unwrap();

        cache.set("t", "m", "short", "v", 1).unwrap();
        clock.advance(Duration::from_secs(2));
        thread::sleep(Duration::from_millis(30));

        assert_eq!(cache.len(), 1);
        assert!(cache.get("t", "m", "short").is_none());
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_drop_stops_sweeper_promptly() {
        let cache = TtlCache::builder()
            .capacity(2)
            .sweep(SweepPolicy::Background { interval: Duration::from_secs(3600) })
            .build()
            .unwrap();

        let start = Instant::now();
        drop(cache);
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_sweeper_exits_when_cache_is_gone() {
        let signal = Arc::new(StopSignal::default());
        let handle = thread::spawn({
            let signal = Arc::clone(&signal);
            move || run(Weak::new(), Duration::from_millis(1), signal)
        });
        handle.join().unwrap();
    }
}
