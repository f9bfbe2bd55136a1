//! # Store Module
//!
//! Key-value store adapters. The leaderboard repository only sees the
//! [`KeyValueStore`] trait; values are opaque strings at this layer.
//!
//! ## Backends
//!
//! - `RedisStore` - Redis via an auto-reconnecting connection manager
//! - `RestKvStore` - hosted KV over its REST API (Upstash / Vercel KV)
//! - `MemoryStore` - in-process map for development and tests
//!
//! Every backend call is bounded by a timeout and reports an elapsed
//! timeout as [`PersistenceError::Timeout`].

pub mod memory;
#[cfg(feature = "redis")]
pub mod redis_store;
#[cfg(feature = "rest")]
pub mod rest;

use async_trait::async_trait;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{PersistenceError, Result};

pub use memory::MemoryStore;
#[cfg(feature = "redis")]
pub use redis_store::{RedisConfig, RedisStore};
#[cfg(feature = "rest")]
pub use rest::{RestKvConfig, RestKvStore};

/// Default bound on a single store round trip
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(2);

/// Error code a Redis-compatible server answers when the key holds a
/// non-string type
pub(crate) const WRONG_TYPE: &str = "WRONGTYPE";

/// Raw key-value backend.
///
/// No atomicity is offered across calls. A `get` whose key holds something
/// that is not readable text (non-UTF-8 bytes, a list, a sorted set) fails
/// with [`PersistenceError::CorruptValue`] rather than a backend error.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Read a value, `None` if the key is absent
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Overwrite a value
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key, returning whether it existed
    async fn del(&self, key: &str) -> Result<bool>;

    /// Short backend name for logs
    fn backend_name(&self) -> &'static str;
}

/// Shared store handle
pub type SharedStore = Arc<dyn KeyValueStore>;

/// Backend selection
#[derive(Debug, Clone)]
pub enum StoreConfig {
    #[cfg(feature = "redis")]
    Redis(RedisConfig),
    #[cfg(feature = "rest")]
    Rest(RestKvConfig),
    Memory,
}

/// Connect to the configured backend.
///
/// # Errors
///
/// Returns an error if the backend cannot be reached within its timeout.
pub async fn connect(config: &StoreConfig) -> Result<SharedStore> {
    let store: SharedStore = match config {
        #[cfg(feature = "redis")]
        StoreConfig::Redis(redis) => Arc::new(RedisStore::connect(redis.clone()).await?),
        #[cfg(feature = "rest")]
        StoreConfig::Rest(rest) => Arc::new(RestKvStore::new(rest.clone())?),
        StoreConfig::Memory => Arc::new(MemoryStore::new()),
    };

    tracing::info!(backend = store.backend_name(), "Key-value store ready");
    Ok(store)
}

/// Run a store future under `timeout`.
pub(crate) async fn with_timeout<T, F>(timeout: Duration, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(PersistenceError::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    }
}
