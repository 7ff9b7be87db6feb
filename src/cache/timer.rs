//! Expiry Timer Module
//!
//! Each armed entry owns one spawned task that sleeps for the entry's TTL and
//! then removes the entry from the index.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::cache::store::Shared;

// == Timer Handle ==
/// Owned handle to an entry's scheduled expiry task.
///
/// Dropping the handle aborts the task, so replacing it on re-arm (or
/// removing the entry) cancels the superseded firing.
#[derive(Debug)]
pub(crate) struct TimerHandle {
    handle: JoinHandle<()>,
}

impl TimerHandle {
    pub(crate) fn new(handle: JoinHandle<()>) -> Self {
        Self { handle }
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// == Expiry Task ==
/// Spawns the expiry task for one armed entry.
///
/// The task sleeps for `duration`, then removes the entry and invokes the
/// expiration callback with the key. Removal only happens if the entry's
/// generation still matches `generation`: a re-arm bumps the generation under
/// the index lock, so a superseded firing that escaped the abort is a
/// structural no-op rather than an error.
///
/// The task holds only a `Weak` reference to the shared cache state; once
/// every cache handle is gone the task dies without firing.
pub(crate) fn spawn_expiry_timer<V>(
    shared: Weak<Shared<V>>,
    key: String,
    duration: Duration,
    generation: u64,
) -> TimerHandle
where
    V: Send + 'static,
{
    let handle = tokio::spawn(async move {
        tokio::time::sleep(duration).await;

        let Some(shared) = shared.upgrade() else {
            return;
        };

        // Remove under the index lock. The generation check resolves the
        // renewal-vs-firing race in favor of whichever side locked first.
        let removed = {
            let mut index = shared.index.lock().await;
            let current = index.entries.get(&key).map(|entry| entry.generation());
            if current == Some(generation) {
                index.entries.remove(&key);
                index.stats.record_expiration();
                let total = index.entries.len();
                index.stats.set_total_entries(total);
                true
            } else {
                false
            }
        };

        // The callback runs with the lock released; it may re-enter the cache.
        if removed {
            debug!(key = %key, "entry expired");
            if let Some(callback) = &shared.callback {
                callback(key);
            }
        }
    });

    TimerHandle::new(handle)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use tokio::sync::Mutex;

    use super::*;
    use crate::cache::entry::CacheEntry;
    use crate::cache::stats::CacheStats;
    use crate::cache::store::Index;
    use crate::config::ExpirationCallback;

    fn test_shared(callback: Option<ExpirationCallback>) -> Arc<Shared<String>> {
        Arc::new(Shared {
            index: Mutex::new(Index {
                entries: HashMap::new(),
                stats: CacheStats::new(),
            }),
            sliding: false,
            callback,
        })
    }

    /// Timer handle whose task never fires on its own.
    fn idle_timer() -> TimerHandle {
        TimerHandle::new(tokio::spawn(std::future::pending::<()>()))
    }

    async fn insert_entry(shared: &Arc<Shared<String>>, key: &str) {
        let mut index = shared.index.lock().await;
        index.entries.insert(
            key.to_string(),
            CacheEntry::new("value".to_string(), Duration::from_secs(60), idle_timer()),
        );
    }

    #[tokio::test]
    async fn test_matching_generation_removes_entry() {
        let shared = test_shared(None);
        insert_entry(&shared, "session").await;

        let _timer = spawn_expiry_timer(
            Arc::downgrade(&shared),
            "session".to_string(),
            Duration::from_millis(10),
            0,
        );
        tokio::time::sleep(Duration::from_millis(200)).await;

        let index = shared.index.lock().await;
        assert!(index.entries.is_empty());
        assert_eq!(index.stats.expirations, 1);
    }

    #[tokio::test]
    async fn test_stale_generation_is_noop() {
        let shared = test_shared(None);
        insert_entry(&shared, "session").await;

        // Fires with a generation the entry never had
        let _timer = spawn_expiry_timer(
            Arc::downgrade(&shared),
            "session".to_string(),
            Duration::from_millis(10),
            7,
        );
        tokio::time::sleep(Duration::from_millis(200)).await;

        let index = shared.index.lock().await;
        assert!(index.entries.contains_key("session"));
        assert_eq!(index.stats.expirations, 0);
    }

    #[tokio::test]
    async fn test_callback_invoked_after_removal() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let shared = test_shared(Some(Arc::new(move |_key| {
            counter.fetch_add(1, Ordering::SeqCst);
        })));
        insert_entry(&shared, "session").await;

        let _timer = spawn_expiry_timer(
            Arc::downgrade(&shared),
            "session".to_string(),
            Duration::from_millis(10),
            0,
        );
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(shared.index.lock().await.entries.is_empty());
    }

    #[tokio::test]
    async fn test_dropped_cache_never_fires() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let shared = test_shared(Some(Arc::new(move |_key| {
            counter.fetch_add(1, Ordering::SeqCst);
        })));

        let _timer = spawn_expiry_timer(
            Arc::downgrade(&shared),
            "session".to_string(),
            Duration::from_millis(10),
            0,
        );
        drop(shared);
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
