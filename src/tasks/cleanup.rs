//! Sweep Task
//!
//! Background task that periodically removes expired cache entries, whether or
//! not anyone reads them again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::context::AdaptiveCache;

/// Spawns a background task that runs `cleanup` on the cache every `interval`.
///
/// Each pass holds the write lock for the whole sweep, so it never interleaves
/// with a read-evict-write sequence. Abort the returned handle on shutdown.
///
/// # Example
/// ```ignore
/// let cache = Arc::new(RwLock::new(AdaptiveCache::new(&config)));
/// let sweep = spawn_cleanup_task(cache.clone(), config.cleanup_interval());
/// // Later, during shutdown:
/// sweep.abort();
/// ```
pub fn spawn_cleanup_task(cache: Arc<RwLock<AdaptiveCache>>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting cache sweep with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.cleanup()
            };

            if removed > 0 {
                info!("Cache sweep: removed {} expired entries", removed);
            } else {
                debug!("Cache sweep: no expired entries found");
            }
        }
    })
}
