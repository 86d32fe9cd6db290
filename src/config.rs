//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{DEFAULT_CAPACITY_BYTES, DEFAULT_NAMESPACE};
use crate::tracker::{DEFAULT_HISTORY_LEN, DEFAULT_MIN_ACCESSES};

/// Cache configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Prefix prepended to every physical key
    pub namespace: String,
    /// Soft capacity ceiling in bytes
    pub capacity_bytes: usize,
    /// Periodic sweep interval in seconds
    pub cleanup_interval_secs: u64,
    /// Access timestamps kept per key by the tracker
    pub history_len: usize,
    /// Accesses required before a key gets a TTL recommendation
    pub min_accesses: u64,
    /// Whether `apply_optimizations` writes recommended TTLs back into the policy
    pub auto_apply: bool,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_NAMESPACE` - Physical key prefix (default: "benome")
    /// - `CACHE_CAPACITY_BYTES` - Capacity ceiling (default: 50 MiB)
    /// - `CACHE_CLEANUP_INTERVAL` - Sweep frequency in seconds (default: 300)
    /// - `CACHE_HISTORY_LEN` - Tracker ring buffer length (default: 100)
    /// - `CACHE_MIN_ACCESSES` - Cold-start guard (default: 10)
    /// - `CACHE_AUTO_APPLY` - Close the TTL feedback loop (default: false)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            namespace: env::var("CACHE_NAMESPACE")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.namespace),
            capacity_bytes: parse_var("CACHE_CAPACITY_BYTES").unwrap_or(defaults.capacity_bytes),
            cleanup_interval_secs: parse_var("CACHE_CLEANUP_INTERVAL")
                .unwrap_or(defaults.cleanup_interval_secs),
            history_len: parse_var("CACHE_HISTORY_LEN").unwrap_or(defaults.history_len),
            min_accesses: parse_var("CACHE_MIN_ACCESSES").unwrap_or(defaults.min_accesses),
            auto_apply: parse_var("CACHE_AUTO_APPLY").unwrap_or(defaults.auto_apply),
        }
    }

    /// Sweep interval as a Duration, for `spawn_cleanup_task`.
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    /// Returns a copy with a different namespace.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    /// Returns a copy with a different capacity ceiling.
    pub fn with_capacity_bytes(mut self, capacity_bytes: usize) -> Self {
        self.capacity_bytes = capacity_bytes;
        self
    }

    /// Returns a copy with the feedback loop switched on or off.
    pub fn with_auto_apply(mut self, auto_apply: bool) -> Self {
        self.auto_apply = auto_apply;
        self
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.trim().parse().ok())
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            capacity_bytes: DEFAULT_CAPACITY_BYTES,
            cleanup_interval_secs: 300,
            history_len: DEFAULT_HISTORY_LEN,
            min_accesses: DEFAULT_MIN_ACCESSES,
            auto_apply: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.namespace, "benome");
        assert_eq!(config.capacity_bytes, 50 * 1024 * 1024);
        assert_eq!(config.cleanup_interval_secs, 300);
        assert_eq!(config.history_len, 100);
        assert_eq!(config.min_accesses, 10);
        assert!(!config.auto_apply);
        assert_eq!(config.cleanup_interval(), Duration::from_secs(300));
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        env::remove_var("CACHE_NAMESPACE");
        env::remove_var("CACHE_CAPACITY_BYTES");
        env::remove_var("CACHE_CLEANUP_INTERVAL");
        env::remove_var("CACHE_HISTORY_LEN");
        env::remove_var("CACHE_MIN_ACCESSES");
        env::remove_var("CACHE_AUTO_APPLY");

        let config = CacheConfig::from_env();
        assert_eq!(config.namespace, "benome");
        assert_eq!(config.capacity_bytes, 50 * 1024 * 1024);
        assert_eq!(config.cleanup_interval_secs, 300);
        assert!(!config.auto_apply);
    }

    #[test]
    fn test_config_builders() {
        let config = CacheConfig::default()
            .with_namespace("tenant")
            .with_capacity_bytes(1024)
            .with_auto_apply(true);
        assert_eq!(config.namespace, "tenant");
        assert_eq!(config.capacity_bytes, 1024);
        assert!(config.auto_apply);
    }
}
