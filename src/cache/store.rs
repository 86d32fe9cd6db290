//! Cache Store Module
//!
//! Quota-bounded store over a shared storage medium, with per-entry TTL,
//! age-based eviction and a sweep for expired entries.
//!
//! Eviction is by write age, not by read recency: a key read every second but
//! written once an hour is exactly as evictable as a key nobody reads. This is
//! not an LRU cache and tests depend on that ordering, so do not turn it into
//! one.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::entry::{decode, decode_meta};
use crate::cache::{CacheEntry, StorageMedium, StoreStats, TtlPolicy, EVICTION_TARGET_RATIO};
use crate::clock::Clock;
use crate::error::{CacheError, Result};
use crate::events::{CacheEvent, EventListener};

/// One namespaced item as found on the medium.
struct RawItem {
    physical_key: String,
    raw: String,
}

/// Escapes `:` (and the escape character) so no namespace's prefix is a
/// prefix of another's. "benome" and "benome:v2" map to "benome:" and
/// "benome%3Av2:".
fn escape_namespace(namespace: &str) -> String {
    namespace.replace('%', "%25").replace(':', "%3A")
}

// == Quota Store ==
/// Namespaced, capacity-limited view over a storage medium.
#[derive(Debug)]
pub struct QuotaStore {
    /// Physical storage, possibly shared with other namespaces
    medium: Arc<dyn StorageMedium>,
    namespace: String,
    /// Escaped namespace plus separator, prepended to every key
    prefix: String,
    /// Soft capacity ceiling in bytes
    capacity_bytes: usize,
    /// Default TTL table
    policy: Arc<TtlPolicy>,
    clock: Arc<dyn Clock>,
    listener: Arc<dyn EventListener>,
    /// Lifetime counters
    counters: StoreStats,
}

impl QuotaStore {
    // == Constructor ==
    /// Creates a store for `namespace` over `medium`.
    pub fn new(
        medium: Arc<dyn StorageMedium>,
        namespace: &str,
        capacity_bytes: usize,
        policy: Arc<TtlPolicy>,
        clock: Arc<dyn Clock>,
        listener: Arc<dyn EventListener>,
    ) -> Self {
        Self {
            medium,
            namespace: namespace.to_string(),
            prefix: format!("{}:", escape_namespace(namespace)),
            capacity_bytes,
            policy,
            clock,
            listener,
            counters: StoreStats::new(),
        }
    }

    /// Namespace this store writes under.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn capacity_bytes(&self) -> usize {
        self.capacity_bytes
    }

    /// TTL a write of `key` gets when none is given.
    pub fn default_ttl(&self, key: &str) -> u64 {
        self.policy.default_ttl(key)
    }

    fn physical_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    // == Set ==
    /// Stores `data` under `key`, evicting the oldest entries first if the
    /// write would push the namespace past its capacity.
    ///
    /// Fails without touching the medium if the entry alone is larger than the
    /// capacity. On a rejected write the previous value of `key` survives.
    pub fn try_set<T: Serialize>(&mut self, key: &str, data: &T, ttl_ms: Option<u64>) -> Result<()> {
        let now = self.clock.now_ms();
        let ttl = ttl_ms.unwrap_or_else(|| self.policy.default_ttl(key));
        let encoded = CacheEntry::new(data, now, ttl).encode()?;
        let size = encoded.len();

        if size > self.capacity_bytes {
            warn!(
                "Entry {} of {} bytes exceeds capacity of {} bytes",
                key, size, self.capacity_bytes
            );
            return Err(CacheError::EntryTooLarge {
                size,
                capacity: self.capacity_bytes,
            });
        }

        let physical = self.physical_key(key);
        let sizes = self.namespaced_sizes();
        let total: usize = sizes.iter().map(|(_, len)| len).sum();
        let replaced = sizes
            .iter()
            .find(|(k, _)| *k == physical)
            .map_or(0, |(_, len)| *len);

        if total - replaced + size > self.capacity_bytes {
            self.evict(sizes, &physical, size);
        }

        if let Err(err) = self.medium.set_item(&physical, encoded) {
            warn!("Write of {} rejected: {}", key, err);
            self.listener.on_event(&CacheEvent::WriteRejected {
                key: key.to_string(),
                reason: err.to_string(),
            });
            return Err(err.into());
        }

        debug!("Stored {} ({} bytes, ttl {}ms)", key, size, ttl);
        Ok(())
    }

    /// Same as `try_set`, collapsing the error to `false`.
    pub fn set<T: Serialize>(&mut self, key: &str, data: &T, ttl_ms: Option<u64>) -> bool {
        self.try_set(key, data, ttl_ms).is_ok()
    }

    // == Evict ==
    /// Removes entries oldest-write-first until the namespace is at or below
    /// the eviction target and `incoming` bytes fit under the capacity, or
    /// nothing is left to remove. Unparseable entries count as oldest.
    ///
    /// The key being written is never a candidate: its bytes are replaced by
    /// the write, and if the medium then rejects the write the old value must
    /// still be there.
    fn evict(&mut self, sizes: Vec<(String, usize)>, writing: &str, incoming: usize) {
        let target = (self.capacity_bytes as f64 * EVICTION_TARGET_RATIO) as usize;

        let mut candidates: Vec<(u64, String, usize)> = sizes
            .into_iter()
            .filter(|(physical_key, _)| physical_key != writing)
            .map(|(physical_key, len)| {
                let written = self
                    .medium
                    .get_item(&physical_key)
                    .and_then(|raw| decode_meta(&raw).ok())
                    .map_or(0, |meta| meta.timestamp);
                (written, physical_key, len)
            })
            .collect();
        candidates.sort_by_key(|(written, _, _)| *written);

        let mut total: usize = candidates.iter().map(|(_, _, len)| len).sum();
        let mut evicted = 0;
        for (_, physical_key, size) in candidates {
            if total <= target && total + incoming <= self.capacity_bytes {
                break;
            }
            if let Err(err) = self.medium.remove_item(&physical_key) {
                warn!("Failed to evict {}: {}", physical_key, err);
                continue;
            }
            total -= size;
            evicted += 1;
            self.counters.record_eviction();
            self.listener.on_event(&CacheEvent::Evicted {
                key: self.logical_key(&physical_key).to_string(),
                size,
            });
        }

        info!(
            "Evicted {} entries from {}, {} of {} bytes used",
            evicted,
            self.namespace(),
            total,
            self.capacity_bytes
        );
    }

    // == Get ==
    /// Retrieves the value stored under `key`.
    ///
    /// Missing, expired, stale-schema and unparseable entries all read as
    /// `None`; the last three are deleted on the way out.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let physical = self.physical_key(key);

        let Some(raw) = self.medium.get_item(&physical) else {
            debug!("Miss for {}", key);
            self.counters.record_miss();
            return None;
        };

        let entry = match decode::<T>(&raw) {
            Ok(entry) => entry,
            Err(err) => {
                warn!("Corrupted entry {}: {}", key, err);
                self.remove_quietly(&physical);
                self.counters.record_corruption();
                self.counters.record_miss();
                self.listener.on_event(&CacheEvent::Corrupted {
                    key: key.to_string(),
                    reason: err.to_string(),
                });
                return None;
            }
        };

        if entry.is_stale(self.clock.now_ms()) {
            debug!("Expired entry {}", key);
            self.remove_quietly(&physical);
            self.counters.record_miss();
            self.listener.on_event(&CacheEvent::Expired {
                key: key.to_string(),
            });
            return None;
        }

        self.counters.record_hit();
        Some(entry.data)
    }

    // == Delete ==
    /// Removes `key`. Absent keys succeed.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.medium.remove_item(&self.physical_key(key)) {
            Ok(()) => true,
            Err(err) => {
                warn!("Failed to delete {}: {}", key, err);
                false
            }
        }
    }

    // == Clear ==
    /// Removes every entry in this namespace and nothing outside it.
    pub fn clear(&mut self) -> bool {
        let mut ok = true;
        for physical_key in self.namespaced_keys() {
            if let Err(err) = self.medium.remove_item(&physical_key) {
                warn!("Failed to clear {}: {}", physical_key, err);
                ok = false;
            }
        }
        ok
    }

    // == Stats ==
    /// Scans the namespace without modifying it.
    pub fn stats(&self) -> StoreStats {
        let now = self.clock.now_ms();
        let items = self.namespaced_items();

        let total: usize = items.iter().map(|item| item.raw.len()).sum();
        let expired_count = items
            .iter()
            .filter(|item| decode_meta(&item.raw).map_or(true, |meta| meta.is_stale(now)))
            .count();

        let mut stats = self.counters.clone();
        stats.set_usage(items.len(), total, self.capacity_bytes);
        stats.expired_count = expired_count;
        stats
    }

    // == Cleanup ==
    /// Removes every expired, stale or unparseable entry in the namespace.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&mut self) -> usize {
        let now = self.clock.now_ms();
        let mut removed = 0;

        for item in self.namespaced_items() {
            let event = match decode_meta(&item.raw) {
                Ok(meta) if meta.is_stale(now) => CacheEvent::Expired {
                    key: self.logical_key(&item.physical_key).to_string(),
                },
                Ok(_) => continue,
                Err(err) => {
                    self.counters.record_corruption();
                    CacheEvent::Corrupted {
                        key: self.logical_key(&item.physical_key).to_string(),
                        reason: err.to_string(),
                    }
                }
            };

            if self.remove_quietly(&item.physical_key) {
                removed += 1;
                self.listener.on_event(&event);
            }
        }

        removed
    }

    // == Length ==
    /// Number of entries currently stored under the namespace.
    pub fn len(&self) -> usize {
        self.namespaced_keys().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn namespaced_keys(&self) -> Vec<String> {
        self.medium
            .keys()
            .into_iter()
            .filter(|k| k.starts_with(&self.prefix))
            .collect()
    }

    /// (physical key, byte length) pairs, without copying values.
    fn namespaced_sizes(&self) -> Vec<(String, usize)> {
        self.namespaced_keys()
            .into_iter()
            .filter_map(|physical_key| {
                let len = self.medium.item_len(&physical_key)?;
                Some((physical_key, len))
            })
            .collect()
    }

    fn namespaced_items(&self) -> Vec<RawItem> {
        self.namespaced_keys()
            .into_iter()
            .filter_map(|physical_key| {
                // Another namespace or a racing delete may have removed it
                let raw = self.medium.get_item(&physical_key)?;
                Some(RawItem { physical_key, raw })
            })
            .collect()
    }

    fn logical_key<'a>(&self, physical_key: &'a str) -> &'a str {
        physical_key.strip_prefix(&self.prefix).unwrap_or(physical_key)
    }

    fn remove_quietly(&self, physical_key: &str) -> bool {
        match self.medium.remove_item(physical_key) {
            Ok(()) => true,
            Err(err) => {
                warn!("Failed to remove {}: {}", physical_key, err);
                false
            }
        }
    }
}
