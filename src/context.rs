//! Adaptive Cache Context
//!
//! Owns one store and one tracker and feeds every store read and write into
//! the tracker. Build it once at startup and hand it (or an
//! `Arc<RwLock<AdaptiveCache>>`) to every call site; there is no global
//! instance.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::info;

use crate::cache::{MemoryStorage, QuotaStore, StorageMedium, StoreStats, TtlPolicy};
use crate::clock::{Clock, SystemClock};
use crate::config::CacheConfig;
use crate::error::Result;
use crate::events::{EventListener, NoopListener};
use crate::tracker::{Recommendation, UsageTracker};

// == Adaptive Cache ==
#[derive(Debug)]
pub struct AdaptiveCache {
    store: QuotaStore,
    tracker: UsageTracker,
    policy: Arc<TtlPolicy>,
    clock: Arc<dyn Clock>,
    auto_apply: bool,
}

impl AdaptiveCache {
    // == Constructors ==
    /// Creates a cache over a private in-memory medium on the system clock.
    pub fn new(config: &CacheConfig) -> Self {
        Self::with_parts(
            config,
            Arc::new(MemoryStorage::new()),
            Arc::new(SystemClock),
            Arc::new(NoopListener),
        )
    }

    /// Creates a cache from explicit collaborators.
    pub fn with_parts(
        config: &CacheConfig,
        medium: Arc<dyn StorageMedium>,
        clock: Arc<dyn Clock>,
        listener: Arc<dyn EventListener>,
    ) -> Self {
        let policy = Arc::new(TtlPolicy::new());
        let store = QuotaStore::new(
            medium,
            &config.namespace,
            config.capacity_bytes,
            policy.clone(),
            clock.clone(),
            listener,
        );
        let tracker = UsageTracker::new(policy.clone(), config.history_len, config.min_accesses);

        Self {
            store,
            tracker,
            policy,
            clock,
            auto_apply: config.auto_apply,
        }
    }

    // == Store Operations ==
    /// Stores `data` under `key`. Every call counts as a miss for the tracker.
    pub fn try_set<T: Serialize>(&mut self, key: &str, data: &T, ttl_ms: Option<u64>) -> Result<()> {
        let result = self.store.try_set(key, data, ttl_ms);
        self.tracker.record_usage(key, false, self.clock.now_ms());
        result
    }

    /// Stores `data` under `key`, returning false on any failure.
    pub fn set<T: Serialize>(&mut self, key: &str, data: &T, ttl_ms: Option<u64>) -> bool {
        self.try_set(key, data, ttl_ms).is_ok()
    }

    /// Reads `key`, reporting the hit or miss to the tracker.
    pub fn get<T: DeserializeOwned>(&mut self, key: &str) -> Option<T> {
        let value = self.store.get(key);
        self.tracker
            .record_usage(key, value.is_some(), self.clock.now_ms());
        value
    }

    pub fn delete(&mut self, key: &str) -> bool {
        self.store.delete(key)
    }

    pub fn clear(&mut self) -> bool {
        self.store.clear()
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    /// Sweeps expired and corrupted entries; returns how many were removed.
    pub fn cleanup(&mut self) -> usize {
        self.store.cleanup()
    }

    // == Tracker Operations ==
    pub fn recommendations(&self) -> Vec<Recommendation> {
        self.tracker.recommendations()
    }

    /// Acknowledges every current recommendation and returns how many there were.
    ///
    /// With `auto_apply` off this only marks them applied. With it on, each
    /// recommended TTL also becomes the default for future writes of that key;
    /// stored entries keep the TTL they were written with.
    pub fn apply_optimizations(&mut self) -> usize {
        let applied = self.tracker.mark_applied(self.clock.now_ms());

        if self.auto_apply {
            for recommendation in &applied {
                self.policy
                    .set_override(&recommendation.key, recommendation.optimal_ttl);
            }
        }

        info!(
            "Applied {} TTL optimizations (auto_apply={})",
            applied.len(),
            self.auto_apply
        );
        applied.len()
    }

    /// Forgets all usage history.
    pub fn reset_tracking(&mut self) {
        self.tracker.reset();
    }

    // == Accessors ==
    pub fn store(&self) -> &QuotaStore {
        &self.store
    }

    pub fn tracker(&self) -> &UsageTracker {
        &self.tracker
    }

    pub fn policy(&self) -> &TtlPolicy {
        &self.policy
    }
}
