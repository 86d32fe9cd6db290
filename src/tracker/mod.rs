//! Tracker Module
//!
//! Learns per-key TTLs from observed hit/miss patterns and exposes them as
//! recommendations.

mod optimizer;
mod usage;
mod usage_tracker;

pub use optimizer::{optimal_ttl, Optimization, Recommendation, NOISE_FLOOR_PERCENT};
pub use usage::UsagePattern;
pub use usage_tracker::UsageTracker;

// == Public Constants ==
/// Access timestamps retained per key
pub const DEFAULT_HISTORY_LEN: usize = 100;

/// Accesses required before a key is optimized
pub const DEFAULT_MIN_ACCESSES: u64 = 10;
