//! Error types for infercache.
//!
//! Every fallible cache operation returns [`CacheError`]. Validation errors
//! are raised before any state is touched, so a failed call never leaves a
//! partial mutation behind.

use thiserror::Error;

/// Result type alias using `CacheError`.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Main error type for all infercache operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    // ═══════════════════════════════════════════════════════════════════════════
    // INPUT VALIDATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// A component of the cache identity is malformed.
    #[error("Invalid key: {field} {reason}")]
    InvalidKey {
        /// Which identity component was rejected.
        field: &'static str,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// TTL on `set` was zero, negative, or too large to represent.
    #[error("Invalid TTL: {ttl_seconds}s (must be a positive number of seconds)")]
    InvalidTtl {
        /// The rejected TTL in seconds.
        ttl_seconds: i64,
    },

    /// Cache constructed with a non-positive capacity.
    #[error("Invalid capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),

    // ═══════════════════════════════════════════════════════════════════════════
    // CONFIGURATION ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Configuration value could not be parsed or is out of range.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // RUNTIME ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// The background sweeper thread could not be started.
    #[error("Failed to start sweeper: {0}")]
    SweeperSpawn(String),

    // ═══════════════════════════════════════════════════════════════════════════
    // INTERNAL ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Eviction was attempted on an empty ledger.
    ///
    /// Unreachable while the capacity invariant holds; seeing it means the
    /// map and the ledger have diverged.
    #[error("Eviction ledger is empty")]
    EmptyLedger,
}

impl CacheError {
    /// Creates an `InvalidKey` error for the given component.
    pub fn invalid_key(field: &'static str, reason: &'static str) -> Self {
        CacheError::InvalidKey { field, reason }
    }

    /// Returns true if this error was caused by caller input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            CacheError::InvalidKey { .. }
                | CacheError::InvalidTtl { .. }
                | CacheError::InvalidCapacity(_)
                | CacheError::ConfigError(_)
        )
    }

    /// Returns true if this error signals a broken internal invariant.
    pub fn is_internal(&self) -> bool {
        matches!(self, CacheError::EmptyLedger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CacheError::InvalidTtl { ttl_seconds: -5 };
        assert!(err.to_string().contains("-5"));

        let err = CacheError::invalid_key("tenant_id", "must not be empty");
        assert_eq!(err.to_string(), "Invalid key: tenant_id must not be empty");

        let err = CacheError::InvalidCapacity(0);
        assert!(err.to_string().contains('0'));
    }

    #[test]
    fn test_error_classification() {
        assert!(CacheError::InvalidTtl { ttl_seconds: 0 }.is_validation_error());
        assert!(CacheError::InvalidCapacity(0).is_validation_error());
        assert!(CacheError::ConfigError("bad".into()).is_validation_error());
        assert!(!CacheError::EmptyLedger.is_validation_error());

        assert!(CacheError::EmptyLedger.is_internal());
        assert!(!CacheError::invalid_key("model", "must not be empty").is_internal());
    }
}
