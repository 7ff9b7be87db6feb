//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
///
/// `NotFound` is the expected outcome of TTL expiration: callers should treat
/// it as a normal control-flow branch, not an exceptional condition.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Key is already present in the index; `set` never overwrites
    #[error("Key already exists: {0}")]
    AlreadyExists(String),

    /// Key not found in the index (never set, expired, or explicitly removed)
    #[error("Key not found: {0}")]
    NotFound(String),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
