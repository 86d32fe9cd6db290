//! Storage Medium Module
//!
//! The persistent key/value medium the store writes into. Several namespaces
//! may share one medium, so implementations take `&self` and synchronize
//! internally.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::StorageError;

// == Storage Medium ==
/// String-keyed, string-valued persistent storage.
pub trait StorageMedium: Debug + Send + Sync + 'static {
    /// Returns the raw value stored under `key`.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Stores `value` under `key`. On error the previous value is untouched.
    fn set_item(&self, key: &str, value: String) -> Result<(), StorageError>;

    /// Byte length of the value under `key`.
    fn item_len(&self, key: &str) -> Option<usize> {
        self.get_item(key).map(|value| value.len())
    }

    /// Removes `key`. Removing an absent key succeeds.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// Returns every key currently stored, across all namespaces.
    fn keys(&self) -> Vec<String>;
}

// == Memory Storage ==
/// In-process medium with an optional platform quota.
///
/// The quota counts key and value bytes of every item, whichever namespace
/// wrote it.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStorage {
    /// Creates an unbounded medium.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a medium that rejects writes past `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Bytes used by all items.
    pub fn used_bytes(&self) -> usize {
        self.lock().iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Number of items across all namespaces.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StorageMedium for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn item_len(&self, key: &str) -> Option<usize> {
        self.lock().get(key).map(String::len)
    }

    fn set_item(&self, key: &str, value: String) -> Result<(), StorageError> {
        let mut items = self.lock();

        if let Some(quota) = self.quota_bytes {
            let used: usize = items
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = key.len() + value.len();
            if used + needed > quota {
                return Err(StorageError::QuotaExceeded {
                    needed,
                    available: quota.saturating_sub(used),
                });
            }
        }

        items.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        self.lock().keys().cloned().collect()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();

        storage.set_item("a", "1".to_string()).unwrap();
        assert_eq!(storage.get_item("a"), Some("1".to_string()));

        storage.remove_item("a").unwrap();
        assert_eq!(storage.get_item("a"), None);

        // Absent key
        assert!(storage.remove_item("a").is_ok());
    }

    #[test]
    fn test_quota_rejects_and_keeps_old_value() {
        let storage = MemoryStorage::with_quota(10);

        storage.set_item("k", "1234".to_string()).unwrap();
        let err = storage.set_item("k", "x".repeat(20)).unwrap_err();

        assert!(matches!(err, StorageError::QuotaExceeded { needed: 21, .. }));
        assert_eq!(storage.get_item("k"), Some("1234".to_string()));
    }

    #[test]
    fn test_quota_ignores_replaced_value() {
        let storage = MemoryStorage::with_quota(10);

        storage.set_item("k", "123456789".to_string()).unwrap();
        // Replacing the value frees the old bytes first
        storage.set_item("k", "987654321".to_string()).unwrap();

        assert_eq!(storage.used_bytes(), 10);
    }

    #[test]
    fn test_item_len() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "12345".to_string()).unwrap();

        assert_eq!(storage.item_len("k"), Some(5));
        assert_eq!(storage.item_len("missing"), None);
    }

    #[test]
    fn test_keys_span_namespaces() {
        let storage = MemoryStorage::new();
        storage.set_item("one:a", "1".to_string()).unwrap();
        storage.set_item("two:a", "2".to_string()).unwrap();

        let mut keys = storage.keys();
        keys.sort();
        assert_eq!(keys, vec!["one:a", "two:a"]);
        assert_eq!(storage.len(), 2);
    }
}
