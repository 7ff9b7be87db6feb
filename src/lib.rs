//! TTL Memcache - an embedded in-memory cache with per-entry TTL expiration
//!
//! Stores a collection of values of any one type, indexed by unique string
//! keys, for a given duration. Two expiration policies are supported:
//!
//! - **Sliding expiration**: every successful read renews the entry's TTL.
//! - **Fixed expiration**: the TTL is set once and only renewed by an
//!   explicit [`Cache::ttl`] call.
//!
//! Each entry owns an autonomous expiry timer; when it fires the entry is
//! removed from the index and the optional expiration callback is invoked
//! with the key. Typical use is session caching inside a web service: serve
//! sessions from memory instead of the database, and persist a logout
//! timestamp from the callback when a session expires.
//!
//! # Example
//! ```rust,no_run
//! use std::time::Duration;
//! use ttl_memcache::{Cache, CacheConfig};
//!
//! #[derive(Clone)]
//! struct Session {
//!     user: String,
//!     profile_id: u32,
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = CacheConfig::new()
//!         .sliding(true)
//!         .with_expiration_callback(|key| println!("session {key} expired"));
//!     let cache: Cache<Session> = Cache::new(config);
//!
//!     let session = Session {
//!         user: "gopher".to_string(),
//!         profile_id: 1,
//!     };
//!     cache
//!         .set("session-1".to_string(), session, Duration::from_secs(300))
//!         .await
//!         .unwrap();
//!
//!     if let Ok(session) = cache.get("session-1").await {
//!         println!("cached user: {}", session.user);
//!     }
//! }
//! ```

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{Cache, CacheStats};
pub use config::{CacheConfig, ExpirationCallback};
pub use error::{CacheError, Result};
