//! # Repository Traits
//!
//! Abstract leaderboard interface. The API layer depends on this trait, not
//! on a concrete store.

use async_trait::async_trait;

use crate::error::Result;
use leaderboard_domain::ScoreEntry;

/// Repository for the shared best-score leaderboard
#[async_trait]
pub trait LeaderboardRepository: Send + Sync {
    /// All entries in stored (first-submission) order.
    ///
    /// An absent or corrupt stored value reads as empty.
    async fn load(&self) -> Result<Vec<ScoreEntry>>;

    /// Merge a submission, keeping the user's best score.
    ///
    /// Returns the user's previous score, or `None` for a first submission.
    async fn upsert_best_score(&self, entry: ScoreEntry) -> Result<Option<u64>>;

    /// Highest `n` entries, score descending, ties in stored order
    async fn top_n(&self, n: usize) -> Result<Vec<ScoreEntry>>;
}
