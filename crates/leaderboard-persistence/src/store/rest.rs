//! # Hosted KV REST Store
//!
//! [`KeyValueStore`] over the Redis-compatible REST API offered by hosted
//! KV services (Upstash, Vercel KV). A command is posted as a JSON array,
//! e.g. `["GET", "leaderboard"]`, and answered with `{"result": ...}` or
//! `{"error": "..."}`.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::{DEFAULT_STORE_TIMEOUT, KeyValueStore, WRONG_TYPE, with_timeout};
use crate::error::{PersistenceError, Result};

/// REST endpoint configuration
#[derive(Debug, Clone)]
pub struct RestKvConfig {
    pub url: String,
    pub token: String,
    pub timeout: Duration,
}

impl RestKvConfig {
    pub fn new(url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            token: token.into(),
            timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CommandResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

/// REST store client
#[derive(Clone)]
pub struct RestKvStore {
    http: reqwest::Client,
    url: String,
    token: String,
    timeout: Duration,
}

impl RestKvStore {
    /// Build the HTTP client. No request is sent until the first command.
    ///
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be constructed.
    pub fn new(config: RestKvConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            url: config.url.trim_end_matches('/').to_string(),
            token: config.token,
            timeout: config.timeout,
        })
    }

    async fn command(&self, args: &[&str]) -> Result<Value> {
        with_timeout(self.timeout, async {
            let response = self
                .http
                .post(&self.url)
                .bearer_auth(&self.token)
                .json(args)
                .send()
                .await?;

            let status = response.status();
            let body: CommandResponse = response.json().await?;

            if let Some(error) = body.error {
                return Err(reply_error(error));
            }
            if !status.is_success() {
                return Err(PersistenceError::Rest(format!("HTTP {status}")));
            }
            Ok::<_, PersistenceError>(body.result)
        })
        .await
    }
}

/// A key of another type is a corrupt value; any other error reply is a
/// store failure.
fn reply_error(error: String) -> PersistenceError {
    if error.starts_with(WRONG_TYPE) {
        PersistenceError::CorruptValue(error)
    } else {
        PersistenceError::Rest(error)
    }
}

#[async_trait]
impl KeyValueStore for RestKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let result = self.command(&["GET", key]).await?;
        Ok(match result {
            Value::Null => None,
            Value::String(s) => Some(s),
            // Some deployments hand back decoded JSON; keep it as text
            other => Some(other.to_string()),
        })
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.command(&["SET", key, value]).await?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let result = self.command(&["DEL", key]).await?;
        Ok(result.as_i64().unwrap_or(0) > 0)
    }

    fn backend_name(&self) -> &'static str {
        "kv-rest"
    }
}
