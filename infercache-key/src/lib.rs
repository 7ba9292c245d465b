//! # infercache Key Codec
//!
//! Turns a `(tenant_id, model, prompt)` triple into a fixed-size
//! [`CacheKey`](infercache_core::CacheKey).
//!
//! - **Hash**: SHA3-256 with domain separation and length-prefixed inputs
//! - **Codec**: input validation and key derivation
//!
//! ## Example
//!
//! ```rust
//! use infercache_key::make_key;
//!
//! let key = make_key("tenant-a", "llama-3-70b", "Summarize this ticket").unwrap();
//! println!("cache key: {key}");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod codec;
pub mod hash;

pub use codec::make_key;
pub use hash::sha3_256_multi;
