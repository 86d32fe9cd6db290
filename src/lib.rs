//! Adaptive Cache - a quota-bounded client cache that learns its own TTLs
//!
//! Stores serialized values under a namespace with per-entry expiration and
//! age-based eviction, and tracks access patterns to recommend better TTLs.

pub mod cache;
pub mod clock;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod tasks;
pub mod tracker;

pub use config::CacheConfig;
pub use context::AdaptiveCache;
pub use error::{CacheError, Result, StorageError};
pub use tasks::spawn_cleanup_task;
