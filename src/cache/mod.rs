//! Cache Module
//!
//! Quota-bounded persistent store with TTL expiration and age-based eviction.

mod entry;
mod policy;
mod stats;
mod storage;
mod store;


// Re-export public types
pub use entry::{decode, decode_meta, CacheEntry, EntryMeta, SCHEMA_VERSION};
pub use policy::{TtlPolicy, FALLBACK_TTL_MS, TTL_RULES};
pub use stats::StoreStats;
pub use storage::{MemoryStorage, StorageMedium};
pub use store::QuotaStore;

// == Public Constants ==
pub const SECOND_MS: u64 = 1_000;
pub const MINUTE_MS: u64 = 60 * SECOND_MS;

/// Namespace used when none is configured
pub const DEFAULT_NAMESPACE: &str = "benome";

/// Default capacity ceiling
pub const DEFAULT_CAPACITY_BYTES: usize = 50 * 1024 * 1024; // 50 MB

/// Fraction of capacity eviction shrinks the namespace down to
pub const EVICTION_TARGET_RATIO: f64 = 0.8;
