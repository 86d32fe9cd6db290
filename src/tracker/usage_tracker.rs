//! Usage Tracker
//!
//! Learns from hit/miss events what TTL each key should have.
//!
//! Per key the tracker moves from unseen, to tracked (fewer than
//! `min_accesses` events), to optimized, where every further event recomputes
//! the key's optimization. `reset` sends every key back to unseen.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::cache::TtlPolicy;
use crate::tracker::optimizer::{optimal_ttl, Optimization, Recommendation};
use crate::tracker::UsagePattern;

// == Usage Tracker ==
#[derive(Debug)]
pub struct UsageTracker {
    patterns: HashMap<String, UsagePattern>,
    optimizations: HashMap<String, Optimization>,
    /// Read-only source of each key's current TTL
    policy: Arc<TtlPolicy>,
    history_len: usize,
    min_accesses: u64,
}

impl UsageTracker {
    // == Constructor ==
    pub fn new(policy: Arc<TtlPolicy>, history_len: usize, min_accesses: u64) -> Self {
        Self {
            patterns: HashMap::new(),
            optimizations: HashMap::new(),
            policy,
            history_len,
            min_accesses,
        }
    }

    // == Record Usage ==
    /// Records one access to `key` and recomputes its optimization.
    pub fn record_usage(&mut self, key: &str, hit: bool, timestamp_ms: u64) {
        let history_len = self.history_len;
        let pattern = self
            .patterns
            .entry(key.to_string())
            .or_insert_with(|| UsagePattern::new(history_len));
        pattern.record(hit, timestamp_ms);

        self.recompute(key, timestamp_ms);
    }

    // == Recompute ==
    /// No-op until the key has seen `min_accesses` events.
    fn recompute(&mut self, key: &str, now_ms: u64) {
        let Some(pattern) = self.patterns.get(key) else {
            return;
        };
        if pattern.total_accesses() < self.min_accesses {
            return;
        }

        let average_interval_ms = pattern.average_interval_ms();
        let freshness_ratio = pattern.freshness_ratio();
        let current_ttl = self.policy.default_ttl(key);
        let optimal = optimal_ttl(current_ttl, average_interval_ms, freshness_ratio);

        debug!(
            "Optimization for {}: ttl {}ms -> {}ms (interval {:.0}ms, freshness {:.2})",
            key, current_ttl, optimal, average_interval_ms, freshness_ratio
        );

        self.optimizations.insert(
            key.to_string(),
            Optimization {
                current_ttl,
                optimal_ttl: optimal,
                average_interval_ms,
                freshness_ratio,
                computed_at: now_ms,
                applied_at: None,
            },
        );
    }

    // == Recommendations ==
    /// Optimizations whose change exceeds the noise floor, largest change first.
    pub fn recommendations(&self) -> Vec<Recommendation> {
        let mut recommendations: Vec<Recommendation> = self
            .optimizations
            .iter()
            .filter_map(|(key, optimization)| Recommendation::from_optimization(key, optimization))
            .collect();

        recommendations.sort_by(|a, b| {
            b.percent_change
                .abs()
                .total_cmp(&a.percent_change.abs())
                .then_with(|| a.key.cmp(&b.key))
        });
        recommendations
    }

    // == Mark Applied ==
    /// Marks every current recommendation as applied and returns them.
    ///
    /// The tracker never changes TTLs itself; whoever calls this decides what
    /// to do with the list.
    pub fn mark_applied(&mut self, now_ms: u64) -> Vec<Recommendation> {
        let recommendations = self.recommendations();
        for recommendation in &recommendations {
            if let Some(optimization) = self.optimizations.get_mut(&recommendation.key) {
                optimization.applied_at = Some(now_ms);
            }
        }
        recommendations
    }

    // == Reset ==
    /// Forgets every pattern and optimization.
    pub fn reset(&mut self) {
        self.patterns.clear();
        self.optimizations.clear();
    }

    pub fn pattern(&self, key: &str) -> Option<&UsagePattern> {
        self.patterns.get(key)
    }

    pub fn optimization(&self, key: &str) -> Option<&Optimization> {
        self.optimizations.get(key)
    }

    /// Keys with at least one recorded access, sorted.
    pub fn tracked_keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.patterns.keys().cloned().collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MINUTE_MS;

    fn tracker() -> UsageTracker {
        UsageTracker::new(Arc::new(TtlPolicy::new()), 100, 10)
    }

    #[test]
    fn test_cold_start_guard() {
        let mut tracker = tracker();
        for i in 0..9 {
            tracker.record_usage("search:a", true, i * 1_000);
        }

        assert!(tracker.optimization("search:a").is_none());
        assert!(tracker.recommendations().is_empty());

        tracker.record_usage("search:a", true, 9_000);
        assert!(tracker.optimization("search:a").is_some());
    }

    #[test]
    fn test_listings_scenario() {
        let mut tracker = tracker();
        let key = "listings:search:paris";
        let step = 2 * MINUTE_MS;

        // 7 hits and 2 misses
        let hits = [false, true, true, true, false, true, true, true, true];
        for (i, hit) in hits.iter().enumerate() {
            tracker.record_usage(key, *hit, i as u64 * step);
        }
        assert!(tracker.optimization(key).is_none());

        // 10th access: freshness exactly 0.8, no rule fires
        tracker.record_usage(key, true, 9 * step);
        let optimization = tracker.optimization(key).unwrap();
        assert_eq!(optimization.freshness_ratio, 0.8);
        assert_eq!(optimization.current_ttl, 2 * MINUTE_MS);
        assert_eq!(optimization.optimal_ttl, optimization.current_ttl);
        assert!(tracker.recommendations().is_empty());

        // 11th access tips freshness over 0.8
        tracker.record_usage(key, true, 10 * step);
        let optimization = tracker.optimization(key).unwrap();
        assert_eq!(optimization.optimal_ttl, 3 * MINUTE_MS);

        let recommendations = tracker.recommendations();
        assert_eq!(recommendations.len(), 1);
        assert_eq!(recommendations[0].percent_change, 50.0);
    }

    #[test]
    fn test_recommendations_sorted_by_magnitude() {
        let mut tracker = tracker();

        // Volatile: 10s interval on a 5 minute key -> 30s, -90%
        for i in 0..10 {
            tracker.record_usage("profile:volatile", true, i * 10_000);
        }
        // Frequent and fresh on a 2 minute key -> 3 minutes, +50%
        for i in 0..10 {
            tracker.record_usage("listings:hot", true, i * 2 * MINUTE_MS);
        }

        let keys: Vec<String> = tracker
            .recommendations()
            .into_iter()
            .map(|r| r.key)
            .collect();
        assert_eq!(keys, vec!["profile:volatile", "listings:hot"]);
    }

    #[test]
    fn test_mark_applied_flags_only_recommended() {
        let mut tracker = tracker();
        for i in 0..10 {
            tracker.record_usage("listings:hot", true, i * 2 * MINUTE_MS);
            // 10 minute interval, half fresh: no change
            tracker.record_usage("profile:calm", i % 2 == 0, i * 10 * MINUTE_MS);
        }

        let applied = tracker.mark_applied(42);
        assert_eq!(applied.len(), 1);
        assert_eq!(tracker.optimization("listings:hot").unwrap().applied_at, Some(42));
        assert_eq!(tracker.optimization("profile:calm").unwrap().applied_at, None);

        // Recomputation clears the flag
        tracker.record_usage("listings:hot", true, 20 * 2 * MINUTE_MS);
        assert_eq!(tracker.optimization("listings:hot").unwrap().applied_at, None);
    }

    #[test]
    fn test_reset_forgets_everything() {
        let mut tracker = tracker();
        for i in 0..12 {
            tracker.record_usage("search:a", true, i * 1_000);
        }
        tracker.reset();

        assert!(tracker.pattern("search:a").is_none());
        assert!(tracker.optimization("search:a").is_none());
        assert!(tracker.tracked_keys().is_empty());
    }

    #[test]
    fn test_current_ttl_follows_policy_override() {
        let policy = Arc::new(TtlPolicy::new());
        let mut tracker = UsageTracker::new(policy.clone(), 100, 10);
        policy.set_override("listings:hot", 3 * MINUTE_MS);

        for i in 0..10 {
            tracker.record_usage("listings:hot", true, i * 2 * MINUTE_MS);
        }

        let optimization = tracker.optimization("listings:hot").unwrap();
        assert_eq!(optimization.current_ttl, 3 * MINUTE_MS);
        assert_eq!(optimization.optimal_ttl, 270_000);
    }
}
