//! SHA3-256 hashing with domain separation.
//!
//! Every digest in this crate is computed as
//!
//! ```text
//! digest = SHA3-256(len(domain) || domain || len(x1) || x1 || ... || len(xn) || xn)
//! ```
//!
//! Length prefixes make the encoding injective: moving bytes from one
//! component into its neighbour always changes the hashed message.

use sha3::{Digest, Sha3_256};

use infercache_core::constants::CACHE_KEY_SIZE;

/// Computes SHA3-256 over a domain separator and a list of inputs.
///
/// # Arguments
///
/// * `domain` - Domain separator bytes (unique per use case)
/// * `inputs` - Ordered input components, each length-prefixed
pub fn sha3_256_multi(domain: &[u8], inputs: &[&[u8]]) -> [u8; CACHE_KEY_SIZE] {
    let mut hasher = Sha3_256::new();

    hasher.update((domain.len() as u32).to_le_bytes());
    hasher.update(domain);

    for input in inputs {
        hasher.update((input.len() as u64).to_le_bytes());
        hasher.update(input);
    }

    hasher.finalize().into()
}
