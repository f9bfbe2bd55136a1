//! # Repository Module
//!
//! Repository pattern implementation for the leaderboard entity.

pub mod kv_impl;
pub mod traits;

pub use kv_impl::{KvLeaderboardRepository, LEADERBOARD_KEY};
pub use traits::LeaderboardRepository;
