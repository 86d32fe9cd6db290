//! Cache Entry Module
//!
//! Defines the envelope written to the medium for every cached value.

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Schema tag written into every entry. Entries carrying another tag are stale.
pub const SCHEMA_VERSION: &str = "1";

// == Cache Entry ==
/// A stored value plus the metadata needed to expire it.
///
/// The TTL is fixed at write time; later TTL recommendations only affect
/// future writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The stored payload
    pub data: T,
    /// Write timestamp (Unix milliseconds)
    pub timestamp: u64,
    /// Lifetime in milliseconds
    pub ttl: u64,
    /// Payload schema tag
    pub version: String,
}

/// Entry header parsed without materializing the payload.
pub type EntryMeta = CacheEntry<IgnoredAny>;

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates an entry written at `now_ms` that lives for `ttl_ms`.
    pub fn new(data: T, now_ms: u64, ttl_ms: u64) -> Self {
        Self {
            data,
            timestamp: now_ms,
            ttl: ttl_ms,
            version: SCHEMA_VERSION.to_string(),
        }
    }

    // == Is Expired ==
    /// An entry is expired once strictly more than `ttl` has elapsed since it
    /// was written. Timestamps from the future never count as expired.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms.saturating_sub(self.timestamp) > self.ttl
    }

    /// Returns true if the entry was written under the current schema.
    pub fn is_current_version(&self) -> bool {
        self.version == SCHEMA_VERSION
    }

    /// Expired or written under an older schema.
    pub fn is_stale(&self, now_ms: u64) -> bool {
        self.is_expired(now_ms) || !self.is_current_version()
    }
}

impl<T: Serialize> CacheEntry<T> {
    /// Serializes the entry into the string stored on the medium.
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Parses a raw medium value into an entry.
pub fn decode<T: DeserializeOwned>(raw: &str) -> Result<CacheEntry<T>> {
    Ok(serde_json::from_str(raw)?)
}

/// Parses only the entry header; the payload is still syntax-checked.
pub fn decode_meta(raw: &str) -> Result<EntryMeta> {
    decode::<IgnoredAny>(raw)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new("value".to_string(), 1_000, 60_000);

        assert_eq!(entry.data, "value");
        assert_eq!(entry.timestamp, 1_000);
        assert_eq!(entry.ttl, 60_000);
        assert_eq!(entry.version, SCHEMA_VERSION);
        assert!(!entry.is_expired(1_000));
    }

    #[test]
    fn test_expiration_boundary_condition() {
        let entry = CacheEntry::new(1u32, 1_000, 100);

        // Exactly ttl elapsed is still fresh
        assert!(!entry.is_expired(1_100));
        assert!(entry.is_expired(1_101));
    }

    #[test]
    fn test_future_timestamp_not_expired() {
        let entry = CacheEntry::new(1u32, 5_000, 10);
        assert!(!entry.is_expired(1_000));
    }

    #[test]
    fn test_max_ttl_never_expires() {
        let entry = CacheEntry::new(1u32, 1_000, u64::MAX);
        assert!(!entry.is_expired(u64::MAX));
        assert!(!entry.is_stale(u64::MAX));
    }

    #[test]
    fn test_encode_decode() {
        let entry = CacheEntry::new(json!({"id": 7, "tags": ["a"]}), 42, 1_000);
        let raw = entry.encode().unwrap();

        let back: CacheEntry<serde_json::Value> = decode(&raw).unwrap();
        assert_eq!(back, entry);

        let meta = decode_meta(&raw).unwrap();
        assert_eq!(meta.timestamp, 42);
        assert_eq!(meta.ttl, 1_000);
    }

    #[test]
    fn test_decode_garbage_fails() {
        assert!(decode_meta("{not json").is_err());
        assert!(decode_meta(r#"{"data":1}"#).is_err());
    }

    #[test]
    fn test_old_schema_is_stale() {
        let mut entry = CacheEntry::new(1u32, 1_000, 60_000);
        entry.version = "0".to_string();

        assert!(!entry.is_expired(1_000));
        assert!(entry.is_stale(1_000));
    }
}
