//! Persistence layer error types

use thiserror::Error;

/// Persistence layer errors
///
/// Every variant except [`PersistenceError::InvalidEntry`] means the backing
/// store could not be used for this request.
///
/// [`PersistenceError::CorruptValue`] from a read is absorbed by the
/// repository's corruption reset and only surfaces from other calls.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Redis error: {0}")]
    Redis(String),

    #[error("KV REST error: {0}")]
    Rest(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Store call timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid leaderboard entry: {0}")]
    InvalidEntry(String),

    /// The key exists but its value cannot be read back as text
    #[error("Stored value is unreadable: {0}")]
    CorruptValue(String),
}

impl PersistenceError {
    /// True when the failure is on the store side and the caller may retry
    #[must_use]
    pub const fn is_unavailable(&self) -> bool {
        !matches!(self, Self::InvalidEntry(_))
    }
}

impl From<serde_json::Error> for PersistenceError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<leaderboard_domain::DomainError> for PersistenceError {
    fn from(err: leaderboard_domain::DomainError) -> Self {
        Self::InvalidEntry(err.to_string())
    }
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for PersistenceError {
    fn from(err: redis::RedisError) -> Self {
        Self::Redis(err.to_string())
    }
}

#[cfg(feature = "rest")]
impl From<reqwest::Error> for PersistenceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            Self::Connection(err.to_string())
        } else {
            Self::Rest(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, PersistenceError>;
