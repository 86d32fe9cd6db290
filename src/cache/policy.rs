//! TTL Policy Module
//!
//! Resolves the default lifetime of a key. The fixed substring classifier is
//! the only source of defaults; exact-key overrides are written solely by
//! `AdaptiveCache::apply_optimizations` when auto-apply is enabled.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use super::{MINUTE_MS, SECOND_MS};

/// Ordered substring rules; the first match wins. Matching is case-sensitive,
/// so "userListings" never hits the "listings" rule.
pub const TTL_RULES: [(&str, u64); 4] = [
    ("categories", 10 * MINUTE_MS),
    ("listings", 2 * MINUTE_MS),
    ("userListings", MINUTE_MS),
    ("search", 5 * MINUTE_MS),
];

/// TTL for keys that match no rule.
pub const FALLBACK_TTL_MS: u64 = 5 * MINUTE_MS;

// == TTL Policy ==
/// Default-TTL table shared by the store and the tracker.
#[derive(Debug, Default)]
pub struct TtlPolicy {
    overrides: RwLock<HashMap<String, u64>>,
}

impl TtlPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies the substring classifier, ignoring overrides.
    pub fn classify(key: &str) -> u64 {
        TTL_RULES
            .iter()
            .find(|(pattern, _)| key.contains(pattern))
            .map(|(_, ttl)| *ttl)
            .unwrap_or(FALLBACK_TTL_MS)
    }

    /// Returns the TTL a write of `key` gets when the caller passes none.
    pub fn default_ttl(&self, key: &str) -> u64 {
        self.overrides
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
            .unwrap_or_else(|| Self::classify(key))
    }

    /// Pins the default TTL of one exact key. Never below one second.
    pub fn set_override(&self, key: &str, ttl_ms: u64) {
        self.overrides
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), ttl_ms.max(SECOND_MS));
    }

    /// Drops every override.
    pub fn clear_overrides(&self) {
        self.overrides
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Snapshot of the override table.
    pub fn overrides(&self) -> HashMap<String, u64> {
        self.overrides
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classifier_rules() {
        assert_eq!(TtlPolicy::classify("categories:all"), 10 * MINUTE_MS);
        assert_eq!(TtlPolicy::classify("listings:search:paris"), 2 * MINUTE_MS);
        assert_eq!(TtlPolicy::classify("userListings:42"), MINUTE_MS);
        assert_eq!(TtlPolicy::classify("search:lyon"), 5 * MINUTE_MS);
        assert_eq!(TtlPolicy::classify("profile:7"), FALLBACK_TTL_MS);
    }

    #[test]
    fn test_first_rule_wins() {
        // Both "categories" and "search" match; categories comes first
        assert_eq!(TtlPolicy::classify("search:categories"), 10 * MINUTE_MS);
    }

    #[test]
    fn test_override_takes_precedence() {
        let policy = TtlPolicy::new();
        policy.set_override("listings:a", 3 * MINUTE_MS);

        assert_eq!(policy.default_ttl("listings:a"), 3 * MINUTE_MS);
        assert_eq!(policy.default_ttl("listings:b"), 2 * MINUTE_MS);

        policy.clear_overrides();
        assert_eq!(policy.default_ttl("listings:a"), 2 * MINUTE_MS);
    }
}
