//! In-memory expiring cache keyed by catalog identity
//!
//! Holds recently displayed catalog values so that paging back and forth
//! within a session does not touch disk or the network. Entries live for a
//! fixed TTL; a background sweep task removes anything older on a period
//! equal to the TTL, so a dead entry resides for at most two periods.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

/// A cached value together with its insertion time
#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    created_at: Instant,
}

/// In-memory cache mapping catalog identities to display values
///
/// Keys are absolute, caller-assigned identities (e.g. area #17), not array
/// offsets. The cache enforces no contiguity; `get_range` treats the
/// requested span as required-contiguous and is all-or-nothing.
///
/// Each instance spawns one sweep task on the current tokio runtime; the
/// task is aborted when the cache is dropped. Lookups never wait for the
/// sweep: expiry between ticks is tolerated, eviction is background hygiene.
#[derive(Debug)]
pub struct ExpiringCache {
    entries: Arc<RwLock<HashMap<u32, CacheEntry>>>,
    ttl: Duration,
    sweeper: JoinHandle<()>,
}

impl ExpiringCache {
    /// Creates a cache whose entries expire after `ttl`.
    ///
    /// Must be called from within a tokio runtime: the eviction sweep is
    /// spawned immediately and ticks once per `ttl`.
    pub fn new(ttl: Duration) -> Self {
        let entries: Arc<RwLock<HashMap<u32, CacheEntry>>> = Arc::new(RwLock::new(HashMap::new()));
        let sweeper = spawn_sweep_task(Arc::clone(&entries), ttl);
        Self {
            entries,
            ttl,
            sweeper,
        }
    }

    /// Records `value` under `key` with the current timestamp, overwriting
    /// any prior entry and resetting its age.
    pub async fn insert(&self, key: u32, value: String) {
        let mut entries = self.entries.write().await;
        entries.insert(
            key,
            CacheEntry {
                value,
                created_at: Instant::now(),
            },
        );
    }

    /// Inserts `values[i]` at `first_key + i`, preserving order.
    ///
    /// The write lock is held across the whole batch so a concurrent sweep
    /// cannot observe a half-inserted page.
    pub async fn insert_range(&self, first_key: u32, values: Vec<String>) {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        for (offset, value) in values.into_iter().enumerate() {
            entries.insert(
                first_key + offset as u32,
                CacheEntry {
                    value,
                    created_at: now,
                },
            );
        }
    }

    /// Point lookup. `None` means absent or already swept.
    pub async fn get(&self, key: u32) -> Option<String> {
        let entries = self.entries.read().await;
        entries.get(&key).map(|entry| entry.value.clone())
    }

    /// Returns the values for every key in `[first_key, last_key]` in
    /// ascending key order, or `None` if any single key in the span is
    /// absent. A fragmented page is useless to pagination, so there is no
    /// partial result.
    pub async fn get_range(&self, first_key: u32, last_key: u32) -> Option<Vec<String>> {
        let entries = self.entries.read().await;
        let mut values = Vec::with_capacity((last_key - first_key + 1) as usize);
        for key in first_key..=last_key {
            values.push(entries.get(&key)?.value.clone());
        }
        Some(values)
    }

    /// The configured time-to-live.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl Drop for ExpiringCache {
    fn drop(&mut self) {
        // Cancellation just stops future ticks; in-flight state is ephemeral.
        self.sweeper.abort();
    }
}

/// Spawns the background sweep for one cache instance.
///
/// Sleeps for one TTL between scans and removes every entry whose age
/// exceeds the TTL at scan time.
fn spawn_sweep_task(
    entries: Arc<RwLock<HashMap<u32, CacheEntry>>>,
    ttl: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(ttl).await;

            let removed = {
                let mut entries = entries.write().await;
                let before = entries.len();
                entries.retain(|_, entry| entry.created_at.elapsed() <= ttl);
                before - entries.len()
            };

            if removed > 0 {
                debug!(removed, "evicted expired cache entries");
            }
        }
    })
}
