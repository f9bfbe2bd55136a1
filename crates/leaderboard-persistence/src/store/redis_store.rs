//! # Redis Store
//!
//! Redis-backed [`KeyValueStore`] using a shared connection manager.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisResult};
use std::time::Duration;

use super::{DEFAULT_STORE_TIMEOUT, KeyValueStore, WRONG_TYPE, with_timeout};
use crate::error::{PersistenceError, Result};

/// Redis connection configuration
#[derive(Debug, Clone)]
pub struct RedisConfig {
    pub url: String,
    pub timeout: Duration,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            url: "redis://127.0.0.1:6379".to_string(),
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

/// Redis store client
///
/// `ConnectionManager` reconnects on its own and is cheap to clone, so each
/// call works on a clone of the shared handle.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    timeout: Duration,
}

impl RedisStore {
    /// Open the client and establish the managed connection.
    ///
    /// # Errors
    ///
    /// Fails on a malformed URL, an unreachable server, or when the
    /// handshake exceeds the configured timeout.
    pub async fn connect(config: RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str())?;
        let conn = with_timeout(config.timeout, async {
            Ok::<_, PersistenceError>(ConnectionManager::new(client).await?)
        })
        .await?;

        Ok(Self {
            conn,
            timeout: config.timeout,
        })
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.conn.clone();
        let reply = with_timeout(self.timeout, async move {
            let reply: RedisResult<Option<Vec<u8>>> = conn.get(key).await;
            Ok::<_, PersistenceError>(reply)
        })
        .await?;
        text_reply(reply)
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        with_timeout(self.timeout, async move {
            let _: () = conn.set(key, value).await?;
            Ok::<_, PersistenceError>(())
        })
        .await
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let mut conn = self.conn.clone();
        with_timeout(self.timeout, async move {
            let deleted: i64 = conn.del(key).await?;
            Ok::<_, PersistenceError>(deleted > 0)
        })
        .await
    }

    fn backend_name(&self) -> &'static str {
        "redis"
    }
}

/// Interpret a `GET` reply. Bytes that are not UTF-8 and keys of another
/// type are corrupt values, not store failures.
fn text_reply(reply: RedisResult<Option<Vec<u8>>>) -> Result<Option<String>> {
    match reply {
        Ok(None) => Ok(None),
        Ok(Some(bytes)) => String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| PersistenceError::CorruptValue(format!("value is not UTF-8: {e}"))),
        Err(err) if err.code() == Some(WRONG_TYPE) => {
            Err(PersistenceError::CorruptValue(err.to_string()))
        }
        Err(err) => Err(err.into()),
    }
}
