//! # infercache Cache
//!
//! Bounded, thread-safe cache for memoized inference responses.
//!
//! - **Cache**: [`TtlCache`] with per-entry TTL and LRU eviction
//! - **Ledger**: O(1) recency tracking over an index-addressed arena
//! - **Sweeper**: optional background purge of expired entries
//! - **Config**: [`CacheConfig`] loaded from defaults or the environment
//!
//! ## Example
//!
//! ```rust
//! use infercache_cache::TtlCache;
//!
//! let cache = TtlCache::new(1024).unwrap();
//!
//! cache.set("tenant-a", "gpt-4o", "What is Rust?", "A systems language.", 300).unwrap();
//!
//! match cache.get("tenant-a", "gpt-4o", "What is Rust?") {
//!     Some(answer) => println!("cached: {}", String::from_utf8_lossy(&answer)),
//!     None => println!("miss"),
//! }
//!
//! cache.delete("tenant-a", "gpt-4o", "What is Rust?");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod cache;
mod config;
mod ledger;
mod stats;
mod sweeper;

pub use cache::{CacheBuilder, TtlCache};
pub use config::CacheConfig;
pub use ledger::{Iter as LedgerIter, Ledger, RecencyToken};
pub use stats::CacheStats;
pub use sweeper::SweepPolicy;

// Re-export the pieces callers need alongside the cache
pub use infercache_core::{
    CacheError, CacheEvent, CacheKey, CacheObserver, Clock, ManualClock, NoopObserver,
    RemovalCause, Result, SystemClock, TracingObserver,
};
pub use infercache_key::make_key;
