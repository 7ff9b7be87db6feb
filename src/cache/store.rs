//! Cache Store Module
//!
//! Main cache engine: the key-to-entry index behind a single cache-wide lock,
//! the sliding/fixed policy branch, and the per-entry timer lifecycle.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::{debug, trace};

use crate::cache::entry::CacheEntry;
use crate::cache::stats::CacheStats;
use crate::cache::timer::spawn_expiry_timer;
use crate::config::{CacheConfig, ExpirationCallback};
use crate::error::{CacheError, Result};

// == Shared State ==
/// State shared between cache handles and the per-entry expiry tasks.
pub(crate) struct Shared<V> {
    /// Single cache-wide lock guarding all index reads and writes
    pub(crate) index: Mutex<Index<V>>,
    /// If true, every successful read renews the entry's timer
    pub(crate) sliding: bool,
    /// Invoked with the key after each expired entry is removed
    pub(crate) callback: Option<ExpirationCallback>,
}

/// Key-to-entry mapping plus the statistics it maintains, guarded as one unit.
pub(crate) struct Index<V> {
    /// Key-value storage
    pub(crate) entries: HashMap<String, CacheEntry<V>>,
    /// Performance statistics
    pub(crate) stats: CacheStats,
}

// == Cache ==
/// In-memory key-value cache with per-entry TTL expiration.
///
/// Every live entry owns one armed expiry timer; when it fires the entry is
/// removed from the index and the configured expiration callback (if any) is
/// invoked with the key. Under sliding expiration each successful [`get`]
/// re-arms the timer; under fixed expiration only [`ttl`] renews it.
///
/// Cloning a `Cache` produces another handle to the same underlying index,
/// so it can be shared across tasks freely. All operations serialize on one
/// cache-wide lock; timer firings take the same lock, which is what makes a
/// renewal racing a concurrent firing resolve cleanly: whichever side locks
/// first wins, and a superseded firing never removes a renewed entry.
///
/// [`get`]: Cache::get
/// [`ttl`]: Cache::ttl
pub struct Cache<V> {
    shared: Arc<Shared<V>>,
}

impl<V> Clone for Cache<V> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<V> fmt::Debug for Cache<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("sliding", &self.shared.sliding)
            .finish()
    }
}

impl<V> Cache<V>
where
    V: Clone + Send + 'static,
{
    // == Constructor ==
    /// Creates a new Cache with the given configuration.
    ///
    /// The expiration policy and callback are fixed for the cache's lifetime.
    ///
    /// # Arguments
    /// * `config` - Policy flag and optional expiration callback
    pub fn new(config: CacheConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                index: Mutex::new(Index {
                    entries: HashMap::new(),
                    stats: CacheStats::new(),
                }),
                sliding: config.sliding_expiration,
                callback: config.expiration_callback,
            }),
        }
    }

    // == Set ==
    /// Inserts a new entry with the given TTL and arms its expiry timer.
    ///
    /// There are no overwrite semantics: setting a key that is already
    /// present fails with [`CacheError::AlreadyExists`] and the original
    /// value is retained. Callers must [`expire`] first to replace.
    ///
    /// [`expire`]: Cache::expire
    ///
    /// # Arguments
    /// * `key` - Unique identifier for the entry
    /// * `value` - The value to store
    /// * `duration` - TTL window; the entry expires this long from now
    ///   unless renewed
    pub async fn set(&self, key: String, value: V, duration: Duration) -> Result<()> {
        let mut index = self.shared.index.lock().await;

        if index.entries.contains_key(&key) {
            return Err(CacheError::AlreadyExists(key));
        }

        let timer = spawn_expiry_timer(Arc::downgrade(&self.shared), key.clone(), duration, 0);
        index
            .entries
            .insert(key.clone(), CacheEntry::new(value, duration, timer));
        let total = index.entries.len();
        index.stats.set_total_entries(total);

        debug!(key = %key, ttl = ?duration, "entry inserted");
        Ok(())
    }

    // == Get ==
    /// Returns a clone of the stored value.
    ///
    /// Under sliding expiration a successful read re-arms the entry's timer
    /// with its currently configured duration, refreshing the advisory
    /// expiration instant. Under fixed expiration reads never alter
    /// expiration.
    ///
    /// Fails with [`CacheError::NotFound`] if the key is absent, including
    /// when it expired concurrently with this call.
    ///
    /// # Arguments
    /// * `key` - The key to retrieve
    pub async fn get(&self, key: &str) -> Result<V> {
        let mut index = self.shared.index.lock().await;

        match index.entries.get_mut(key) {
            Some(entry) => {
                if self.shared.sliding {
                    let generation = entry.generation() + 1;
                    let timer = spawn_expiry_timer(
                        Arc::downgrade(&self.shared),
                        key.to_string(),
                        entry.duration(),
                        generation,
                    );
                    entry.rearm(generation, timer);
                    trace!(key, "sliding renewal");
                }

                let value = entry.value().clone();
                index.stats.record_hit();
                Ok(value)
            }
            None => {
                index.stats.record_miss();
                Err(CacheError::NotFound(key.to_string()))
            }
        }
    }

    // == TTL ==
    /// Updates the entry's configured duration and re-arms its timer now.
    ///
    /// Renewal is unconditional on the policy: this is the manual-renewal
    /// escape hatch for fixed-expiration entries, and works the same under
    /// sliding expiration. The entry survives for a fresh `duration` window
    /// from this call, regardless of time already elapsed.
    ///
    /// # Arguments
    /// * `key` - The key to renew
    /// * `duration` - The new TTL window
    pub async fn ttl(&self, key: &str, duration: Duration) -> Result<()> {
        let mut index = self.shared.index.lock().await;

        match index.entries.get_mut(key) {
            Some(entry) => {
                entry.set_duration(duration);
                let generation = entry.generation() + 1;
                let timer = spawn_expiry_timer(
                    Arc::downgrade(&self.shared),
                    key.to_string(),
                    duration,
                    generation,
                );
                entry.rearm(generation, timer);

                debug!(key, ttl = ?duration, "ttl renewed");
                Ok(())
            }
            None => Err(CacheError::NotFound(key.to_string())),
        }
    }

    // == Expire ==
    /// Removes the entry immediately, identically to a natural timer firing.
    ///
    /// The entry's pending timer is cancelled and the expiration callback is
    /// invoked with the key after the lock is released, so at most one
    /// removal-and-callback ever happens per entry.
    ///
    /// # Arguments
    /// * `key` - The key to evict
    pub async fn expire(&self, key: &str) -> Result<()> {
        let removed = {
            let mut index = self.shared.index.lock().await;
            // Dropping the entry aborts its pending timer
            match index.entries.remove(key) {
                Some(_entry) => {
                    index.stats.record_expiration();
                    let total = index.entries.len();
                    index.stats.set_total_entries(total);
                    true
                }
                None => false,
            }
        };

        if !removed {
            return Err(CacheError::NotFound(key.to_string()));
        }

        debug!(key, "entry explicitly expired");
        if let Some(callback) = &self.shared.callback {
            callback(key.to_string());
        }
        Ok(())
    }

    // == Expiration ==
    /// Returns the entry's advisory expiration instant, without side effects.
    ///
    /// The value may be stale by the time the caller reads it: timers fire
    /// asynchronously, and only the timer firing is authoritative.
    ///
    /// # Arguments
    /// * `key` - The key to inspect
    pub async fn expiration(&self, key: &str) -> Result<DateTime<Utc>> {
        let index = self.shared.index.lock().await;
        index
            .entries
            .get(key)
            .map(|entry| entry.expires_at())
            .ok_or_else(|| CacheError::NotFound(key.to_string()))
    }

    // == Stats ==
    /// Returns a snapshot of the cache statistics.
    pub async fn stats(&self) -> CacheStats {
        let index = self.shared.index.lock().await;
        let mut stats = index.stats.clone();
        stats.set_total_entries(index.entries.len());
        stats
    }

    // == Close ==
    /// Cancels all outstanding timers and clears the index.
    ///
    /// No expiration callbacks are invoked: teardown is not expiry. The cache
    /// remains usable afterwards; `close` is an eager cancel-everything, not
    /// a terminal state.
    pub async fn close(&self) {
        let mut index = self.shared.index.lock().await;
        let cancelled = index.entries.len();
        // Dropping the entries aborts their timers
        index.entries.clear();
        index.stats.set_total_entries(0);
        debug!(cancelled, "cache closed");
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub async fn len(&self) -> usize {
        self.shared.index.lock().await.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.shared.index.lock().await.entries.is_empty()
    }
}

impl<V> Default for Cache<V>
where
    V: Clone + Send + 'static,
{
    /// Fixed expiration, no callback.
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
