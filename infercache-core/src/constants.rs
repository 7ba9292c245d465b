//! Constants shared across infercache crates.

// ═══════════════════════════════════════════════════════════════════════════════
// KEY DERIVATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Size of a derived cache key in bytes (SHA3-256 output).
pub const CACHE_KEY_SIZE: usize = 32;

/// Domain separator mixed into every cache key digest.
///
/// Bump the version suffix if the key layout ever changes so that keys from
/// different layouts can never compare equal.
pub const DOMAIN_CACHE_KEY: &[u8] = b"INFERCACHE_KEY_V1";

/// Number of hex characters shown by the short key form used in logs.
pub const KEY_LOG_PREFIX_LEN: usize = 12;

// ═══════════════════════════════════════════════════════════════════════════════
// CACHE DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default maximum number of live entries.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default TTL used by `set_default`, in seconds.
pub const DEFAULT_TTL_SECONDS: u64 = 3600;

/// Upper bound on entries reserved up front when a cache is built.
/// Larger caches grow their tables on demand.
pub const PREALLOC_LIMIT: usize = 4096;

// ═══════════════════════════════════════════════════════════════════════════════
// ENVIRONMENT VARIABLES
// ═══════════════════════════════════════════════════════════════════════════════

/// Environment variable overriding the cache capacity.
pub const ENV_CAPACITY: &str = "INFERCACHE_CAPACITY";

/// Environment variable overriding the default TTL in seconds.
pub const ENV_DEFAULT_TTL_SECONDS: &str = "INFERCACHE_DEFAULT_TTL_SECONDS";

/// Environment variable enabling the background sweeper (interval in seconds).
pub const ENV_SWEEP_INTERVAL_SECONDS: &str = "INFERCACHE_SWEEP_INTERVAL_SECONDS";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_size_matches_sha3_256() {
        assert_eq!(CACHE_KEY_SIZE, 32);
    }

    #[test]
    fn test_default_capacity_is_fully_preallocated() {
        assert!(DEFAULT_CAPACITY <= PREALLOC_LIMIT);
    }

    #[test]
    fn test_log_prefix_fits_in_hex_key() {
        assert!(KEY_LOG_PREFIX_LEN <= CACHE_KEY_SIZE * 2);
    }

    #[test]
    fn test_env_vars_unique() {
        let vars = [ENV_CAPACITY, ENV_DEFAULT_TTL_SECONDS, ENV_SWEEP_INTERVAL_SECONDS];
        for (i, a) in vars.iter().enumerate() {
            for (j, b) in vars.iter().enumerate() {
                if i != j {
                    assert_ne!(a, b);
                }
            }
        }
    }
}
