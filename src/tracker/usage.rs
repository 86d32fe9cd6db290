//! Usage Pattern Module
//!
//! Per-key hit/miss tally and a bounded history of access times.

use std::collections::VecDeque;

use serde::Serialize;

// == Usage Pattern ==
/// Access statistics for one key.
///
/// Only the most recent `history_len` timestamps are kept; older ones are
/// dropped from the front.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsagePattern {
    pub hits: u64,
    pub misses: u64,
    /// Timestamp of the latest access (Unix milliseconds)
    pub last_access: u64,
    access_times: VecDeque<u64>,
    #[serde(skip)]
    history_len: usize,
}

impl UsagePattern {
    /// Creates an empty pattern keeping at most `history_len` timestamps.
    pub fn new(history_len: usize) -> Self {
        Self {
            hits: 0,
            misses: 0,
            last_access: 0,
            access_times: VecDeque::with_capacity(history_len),
            history_len,
        }
    }

    // == Record ==
    /// Adds one access.
    pub fn record(&mut self, hit: bool, timestamp_ms: u64) {
        if self.history_len > 0 {
            if self.access_times.len() == self.history_len {
                self.access_times.pop_front();
            }
            self.access_times.push_back(timestamp_ms);
        }

        if hit {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        self.last_access = timestamp_ms;
    }

    pub fn total_accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Retained access timestamps, oldest first.
    pub fn access_times(&self) -> &VecDeque<u64> {
        &self.access_times
    }

    /// hits / (hits + misses), or 0.0 before the first access.
    pub fn freshness_ratio(&self) -> f64 {
        let total = self.total_accesses();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    // == Average Interval ==
    /// Mean gap between consecutive retained timestamps; 0 with fewer than two.
    /// A timestamp earlier than its predecessor (clock stepped back) counts as
    /// a zero gap.
    pub fn average_interval_ms(&self) -> f64 {
        let samples = self.access_times.len();
        if samples < 2 {
            return 0.0;
        }

        let sum: f64 = self
            .access_times
            .iter()
            .zip(self.access_times.iter().skip(1))
            .map(|(prev, next)| next.saturating_sub(*prev) as f64)
            .sum();
        sum / (samples - 1) as f64
    }
}
