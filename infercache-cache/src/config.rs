//! Cache configuration.

use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use infercache_core::constants::{
    DEFAULT_CAPACITY, DEFAULT_TTL_SECONDS, ENV_CAPACITY, ENV_DEFAULT_TTL_SECONDS,
    ENV_SWEEP_INTERVAL_SECONDS,
};
use infercache_core::error::{CacheError, Result};

use crate::sweeper::SweepPolicy;

/// Cache configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of live entries
    pub capacity: usize,
    /// TTL used by `set_default`, in seconds
    pub default_ttl_seconds: u64,
    /// Background sweep interval in seconds; `None` means lazy expiry only
    #[serde(default)]
    pub sweep_interval_seconds: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            default_ttl_seconds: DEFAULT_TTL_SECONDS,
            sweep_interval_seconds: None,
        }
    }
}

impl CacheConfig {
    /// Creates a configuration with the given capacity and defaults elsewhere.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity,
            ..Self::default()
        }
    }

    /// Loads configuration from the environment (and `.env`, if present).
    ///
    /// Unset variables keep their defaults; set but unparsable variables are
    /// an error rather than silently ignored.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let config = Self {
            capacity: parse_var(&lookup, ENV_CAPACITY)?.unwrap_or(defaults.capacity),
            default_ttl_seconds: parse_var(&lookup, ENV_DEFAULT_TTL_SECONDS)?
                .unwrap_or(defaults.default_ttl_seconds),
            sweep_interval_seconds: parse_var(&lookup, ENV_SWEEP_INTERVAL_SECONDS)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that every field is in range.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidCapacity(self.capacity));
        }
        if self.default_ttl_seconds == 0 {
            return Err(CacheError::ConfigError(
                "default_ttl_seconds must be greater than zero".into(),
            ));
        }
        if self.sweep_interval_seconds == Some(0) {
            return Err(CacheError::ConfigError(
                "sweep_interval_seconds must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Returns the default TTL as a `Duration`.
    pub fn default_ttl(&self) -> Duration {
        Duration::from_secs(self.default_ttl_seconds)
    }

    /// Returns the sweep policy this configuration selects.
    pub fn sweep_policy(&self) -> SweepPolicy {
        match self.sweep_interval_seconds {
            Some(secs) => SweepPolicy::Background {
                interval: Duration::from_secs(secs),
            },
            None => SweepPolicy::Lazy,
        }
    }
}

fn parse_var<T, F>(lookup: &F, name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| CacheError::ConfigError(format!("{name}={raw:?}: {e}"))),
        None => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.capacity, DEFAULT_CAPACITY);
        assert_eq!(config.default_ttl(), Duration::from_secs(DEFAULT_TTL_SECONDS));
        assert_eq!(config.sweep_policy(), SweepPolicy::Lazy);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_lookup_empty_uses_defaults() {
        let config = CacheConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, CacheConfig::default());
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = CacheConfig::from_lookup(lookup_from(&[
            (ENV_CAPACITY, "64"),
            (ENV_DEFAULT_TTL_SECONDS, " 30 "),
            (ENV_SWEEP_INTERVAL_SECONDS, "5"),
        ]))
        .unwrap();

        assert_eq!(config.capacity, 64);
        assert_eq!(config.default_ttl_seconds, 30);
        assert_eq!(
            config.sweep_policy(),
            SweepPolicy::Background { interval: Duration::from_secs(5) }
        );
    }

    #[test]
    fn test_from_lookup_rejects_garbage() {
        let err = CacheConfig::from_lookup(lookup_from(&[(ENV_CAPACITY, "lots")])).unwrap_err();
        assert!(matches!(err, CacheError::ConfigError(msg) if msg.contains(ENV_CAPACITY)));
    }

    #[test]
    fn test_from_lookup_rejects_negative_capacity() {
        let err = CacheConfig::from_lookup(lookup_from(&[(ENV_CAPACITY, "-1")])).unwrap_err();
        assert!(matches!(err, CacheError::ConfigError(_)));
    }

    #[test]
    fn test_validate_zero_capacity() {
        let config = CacheConfig::with_capacity(0);
        assert_eq!(config.validate(), Err(CacheError::InvalidCapacity(0)));
    }

    #[test]
    fn test_validate_zero_intervals() {
        let config = CacheConfig {
            sweep_interval_seconds: Some(0),
            ..CacheConfig::default()
        };
        assert!(config.validate().unwrap_err().is_validation_error());

        let config = CacheConfig {
            default_ttl_seconds: 0,
            ..CacheConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_serde_roundtrip_without_sweep_field() {
        let config: CacheConfig =
            serde_json::from_str(r#"{"capacity": 8, "default_ttl_seconds": 60}"#).unwrap();
        assert_eq!(config.capacity, 8);
        assert_eq!(config.sweep_interval_seconds, None);

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"capacity\":8"));
    }
}
