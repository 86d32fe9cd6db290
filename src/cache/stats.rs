//! Cache Statistics Module
//!
//! Size and usage report for one namespace, plus lifetime counters.

use serde::Serialize;

// == Store Stats ==
/// Snapshot returned by `QuotaStore::stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStats {
    /// Entries currently stored under the namespace
    pub entry_count: usize,
    /// Sum of serialized entry sizes
    pub total_size_bytes: usize,
    /// Configured capacity ceiling
    pub capacity_bytes: usize,
    /// total_size_bytes / capacity_bytes * 100
    pub usage_percent: f64,
    /// Entries the next sweep would remove (expired, stale or corrupted)
    pub expired_count: usize,
    /// Successful reads since construction
    pub hits: u64,
    /// Failed reads since construction
    pub misses: u64,
    /// Entries removed to make room for writes
    pub evictions: u64,
    /// Entries deleted because they failed to parse
    pub corruptions: u64,
}

impl StoreStats {
    // == Constructor ==
    /// Creates a new StoreStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_corruption(&mut self) {
        self.corruptions += 1;
    }

    // == Update Size ==
    /// Fills in the namespace scan results.
    pub fn set_usage(&mut self, entry_count: usize, total_size_bytes: usize, capacity_bytes: usize) {
        self.entry_count = entry_count;
        self.total_size_bytes = total_size_bytes;
        self.capacity_bytes = capacity_bytes;
        self.usage_percent = if capacity_bytes == 0 {
            0.0
        } else {
            total_size_bytes as f64 / capacity_bytes as f64 * 100.0
        };
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_new() {
        let stats = StoreStats::new();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.entry_count, 0);
        assert_eq!(stats.hit_rate(), 0.0);
    }

    #[test]
    fn test_hit_rate_mixed() {
        let mut stats = StoreStats::new();
        stats.record_hit();
        stats.record_hit();
        stats.record_hit();
        stats.record_miss();
        assert_eq!(stats.hit_rate(), 0.75);
    }

    #[test]
    fn test_set_usage() {
        let mut stats = StoreStats::new();
        stats.set_usage(3, 250, 1_000);
        assert_eq!(stats.entry_count, 3);
        assert_eq!(stats.usage_percent, 25.0);
    }

    #[test]
    fn test_zero_capacity_usage() {
        let mut stats = StoreStats::new();
        stats.set_usage(0, 0, 0);
        assert_eq!(stats.usage_percent, 0.0);
    }
}
