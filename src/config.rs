//! Configuration Module
//!
//! Construction-time options for a cache instance: the expiration policy and
//! the optional expiration callback.

use std::fmt;
use std::sync::Arc;

/// Callback invoked with the expired key after an entry has been removed.
///
/// Runs outside the cache lock, so it may re-enter the cache (e.g. to re-`set`
/// the key) without deadlocking.
pub type ExpirationCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Cache configuration parameters.
///
/// Defaults to fixed expiration with no callback. The policy and callback are
/// fixed for the cache's lifetime once passed to [`Cache::new`].
///
/// [`Cache::new`]: crate::Cache::new
///
/// # Example
/// ```
/// use ttl_memcache::CacheConfig;
///
/// let config = CacheConfig::new()
///     .sliding(true)
///     .with_expiration_callback(|key| println!("{key} expired"));
/// ```
#[derive(Clone, Default)]
pub struct CacheConfig {
    /// If true, every successful read renews the entry's timer
    pub sliding_expiration: bool,
    /// Invoked exactly once per expiration, after removal from the index
    pub expiration_callback: Option<ExpirationCallback>,
}

impl CacheConfig {
    // == Constructor ==
    /// Creates a configuration with default values (fixed policy, no callback).
    pub fn new() -> Self {
        Self::default()
    }

    // == Sliding ==
    /// Sets the expiration policy.
    ///
    /// Under sliding expiration every successful `get` re-arms the entry's
    /// timer; under fixed expiration only an explicit `ttl` call renews it.
    pub fn sliding(mut self, sliding: bool) -> Self {
        self.sliding_expiration = sliding;
        self
    }

    // == Expiration Callback ==
    /// Registers the function invoked with the key of each expired entry.
    ///
    /// At most one callback is supported; registering a second replaces the
    /// first. A host needing fan-out can compose inside a single closure.
    pub fn with_expiration_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(String) + Send + Sync + 'static,
    {
        self.expiration_callback = Some(Arc::new(callback));
        self
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("sliding_expiration", &self.sliding_expiration)
            .field("expiration_callback", &self.expiration_callback.is_some())
            .finish()
    }
}
