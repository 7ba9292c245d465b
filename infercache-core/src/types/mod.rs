//! Domain types for infercache.

mod event;
mod key;

pub use event::{CacheEvent, RemovalCause};
pub use key::CacheKey;
