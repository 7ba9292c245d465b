//! # infercache Core
//!
//! Core types, errors, and traits shared by the infercache crates.
//!
//! - **Types**: [`CacheKey`] and the [`CacheEvent`] lifecycle events
//! - **Errors**: [`CacheError`] and the crate-wide [`Result`] alias
//! - **Constants**: key layout, defaults, environment variable names
//! - **Traits**: the [`CacheObserver`] and [`Clock`] seams
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use infercache_core::{Clock, ManualClock};
//!
//! let clock = ManualClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_secs(2));
//! assert_eq!(clock.now() - start, Duration::from_secs(2));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{CacheError, Result};
pub use traits::*;
pub use types::*;
