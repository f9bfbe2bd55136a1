//! # Leaderboard Persistence Library
//!
//! Persistence layer for the score leaderboard service.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Application Layer                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │          LeaderboardRepository (KvLeaderboardRepository)    │
//! │        write lock · best-score merge · corruption reset     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 codec (canonical JSON array)                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────┐ ┌─────────────────────┐ ┌─────────────────┐
//! │   RedisStore    │ │    RestKvStore      │ │   MemoryStore   │
//! └─────────────────┘ └─────────────────────┘ └─────────────────┘
//! ```
//!
//! ## Features
//!
//! - `redis`: Enable the Redis backend (default)
//! - `rest`: Enable the hosted KV REST backend (default)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use leaderboard_persistence::{KvLeaderboardRepository, LeaderboardRepository, StoreConfig};
//!
//! let store = leaderboard_persistence::connect(&StoreConfig::Memory).await?;
//! let repo = KvLeaderboardRepository::new(store);
//!
//! repo.upsert_best_score(entry).await?;
//! let top = repo.top_n(10).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod codec;
pub mod error;
pub mod repository;
pub mod store;

// Re-export commonly used types
pub use error::{PersistenceError, Result};
pub use repository::{KvLeaderboardRepository, LEADERBOARD_KEY, LeaderboardRepository};
#[cfg(feature = "redis")]
pub use store::{RedisConfig, RedisStore};
#[cfg(feature = "rest")]
pub use store::{RestKvConfig, RestKvStore};
pub use store::{KeyValueStore, MemoryStore, SharedStore, StoreConfig, connect};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
