//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and their expiration
//! bookkeeping.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::timer::TimerHandle;

// == Cache Entry ==
/// A stored value plus the expiration bookkeeping for its key.
///
/// Exactly one expiry timer is armed per live entry. `expires_at` is
/// advisory: it is recomputed whenever the timer is (re)armed, but the timer
/// firing is what actually removes the entry.
#[derive(Debug)]
pub(crate) struct CacheEntry<V> {
    /// The stored value
    value: V,
    /// The TTL window currently configured for this entry
    duration: Duration,
    /// Advisory expiration instant, `now + duration` as of the last arm
    expires_at: DateTime<Utc>,
    /// Bumped on every re-arm; a fired timer may only remove the entry if
    /// its captured generation still matches
    generation: u64,
    /// Handle to the armed expiry task; replaced on re-arm, aborted on drop
    timer: TimerHandle,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates an entry armed with its first timer (generation 0).
    pub(crate) fn new(value: V, duration: Duration, timer: TimerHandle) -> Self {
        Self {
            value,
            duration,
            expires_at: Utc::now() + duration,
            generation: 0,
            timer,
        }
    }

    /// Returns a reference to the stored value.
    pub(crate) fn value(&self) -> &V {
        &self.value
    }

    /// Returns the currently configured TTL window.
    pub(crate) fn duration(&self) -> Duration {
        self.duration
    }

    /// Returns the advisory expiration instant.
    pub(crate) fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Returns the current timer generation.
    pub(crate) fn generation(&self) -> u64 {
        self.generation
    }

    /// Updates the configured TTL window without re-arming.
    pub(crate) fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
    }

    // == Rearm ==
    /// Installs a replacement timer under a new generation.
    ///
    /// Dropping the previous handle aborts the superseded firing; the
    /// generation bump makes any firing that already escaped the abort a
    /// no-op. `expires_at` is refreshed from the configured duration.
    pub(crate) fn rearm(&mut self, generation: u64, timer: TimerHandle) {
        self.generation = generation;
        self.expires_at = Utc::now() + self.duration;
        self.timer = timer;
    }
}
