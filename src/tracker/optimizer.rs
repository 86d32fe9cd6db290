//! TTL Optimization Rules
//!
//! Turns a key's access interval and freshness ratio into a proposed TTL.

use serde::Serialize;

use crate::cache::{MINUTE_MS, SECOND_MS};

/// Below this average interval a key counts as frequently read.
pub const FREQUENT_INTERVAL_MS: f64 = (5 * MINUTE_MS) as f64;
/// Above this average interval a key counts as rarely read.
pub const RARE_INTERVAL_MS: f64 = (15 * MINUTE_MS) as f64;
/// Below this average interval the data is treated as volatile.
pub const VOLATILE_INTERVAL_MS: f64 = MINUTE_MS as f64;

pub const HIGH_FRESHNESS: f64 = 0.8;
pub const LOW_FRESHNESS: f64 = 0.3;

pub const MAX_OPTIMAL_TTL_MS: u64 = 30 * MINUTE_MS;
pub const MIN_OPTIMAL_TTL_MS: u64 = MINUTE_MS;
pub const MIN_VOLATILE_TTL_MS: u64 = 30 * SECOND_MS;

/// Recommendations moving the TTL by this many percent or less are noise.
pub const NOISE_FLOOR_PERCENT: f64 = 10.0;

// == Optimal TTL ==
/// Proposes a TTL for a key.
///
/// Frequently read and fresh keys grow their TTL by half, capped at 30
/// minutes. Rarely read and stale keys shrink it by 30%, floored at one
/// minute. The volatile rule is checked last and overrides either of those
/// whenever it matches.
pub fn optimal_ttl(current_ttl_ms: u64, average_interval_ms: f64, freshness_ratio: f64) -> u64 {
    let current = current_ttl_ms as f64;

    let mut optimal = if average_interval_ms < FREQUENT_INTERVAL_MS && freshness_ratio > HIGH_FRESHNESS
    {
        (current * 1.5).round().min(MAX_OPTIMAL_TTL_MS as f64) as u64
    } else if average_interval_ms > RARE_INTERVAL_MS && freshness_ratio < LOW_FRESHNESS {
        (current * 0.7).round().max(MIN_OPTIMAL_TTL_MS as f64) as u64
    } else {
        current_ttl_ms
    };

    if average_interval_ms < VOLATILE_INTERVAL_MS {
        optimal = (average_interval_ms * 2.0)
            .round()
            .max(MIN_VOLATILE_TTL_MS as f64) as u64;
    }

    optimal
}

// == Optimization ==
/// Latest TTL proposal for one key. Recomputed in place on every access.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Optimization {
    pub current_ttl: u64,
    pub optimal_ttl: u64,
    pub average_interval_ms: f64,
    pub freshness_ratio: f64,
    pub computed_at: u64,
    /// Set by `apply_optimizations`, cleared by the next recomputation
    pub applied_at: Option<u64>,
}

impl Optimization {
    /// Signed change from the current TTL, in percent.
    pub fn percent_change(&self) -> f64 {
        if self.current_ttl == 0 {
            return 0.0;
        }
        (self.optimal_ttl as f64 - self.current_ttl as f64) / self.current_ttl as f64 * 100.0
    }
}

// == Recommendation ==
/// An optimization that clears the noise floor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub key: String,
    pub current_ttl: u64,
    pub optimal_ttl: u64,
    pub average_interval_ms: f64,
    pub freshness_ratio: f64,
    pub computed_at: u64,
    pub percent_change: f64,
}

impl Recommendation {
    /// Builds a recommendation, or None if the change is within the noise floor.
    pub fn from_optimization(key: &str, optimization: &Optimization) -> Option<Self> {
        let percent_change = optimization.percent_change();
        if percent_change.abs() <= NOISE_FLOOR_PERCENT {
            return None;
        }

        Some(Self {
            key: key.to_string(),
            current_ttl: optimization.current_ttl,
            optimal_ttl: optimization.optimal_ttl,
            average_interval_ms: optimization.average_interval_ms,
            freshness_ratio: optimization.freshness_ratio,
            computed_at: optimization.computed_at,
            percent_change,
        })
    }
}
