//! Error types for the adaptive cache
//!
//! Provides unified error handling using thiserror. None of these cross the
//! public `set`/`get`/`delete` boundary; they are collapsed to `bool`/`None`
//! there and only surface through `try_set` and the event listener.

use thiserror::Error;

// == Storage Error Enum ==
/// Failures reported by the persistent medium.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The medium's own quota cannot hold the write
    #[error("Storage quota exceeded: needed {needed} bytes, {available} available")]
    QuotaExceeded { needed: usize, available: usize },

    /// The medium refused the operation for another reason
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

// == Cache Error Enum ==
/// Unified error type for cache operations.
#[derive(Error, Debug)]
pub enum CacheError {
    /// A single entry is larger than the whole cache capacity
    #[error("Entry of {size} bytes exceeds cache capacity of {capacity} bytes")]
    EntryTooLarge { size: usize, capacity: usize },

    /// The medium rejected a write or delete
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// Payload could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
