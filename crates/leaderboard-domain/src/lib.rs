//! # Score Leaderboard - Domain Model
//!
//! Core entities and the best-score merge rules for the leaderboard
//! service. These types are shared by the persistence and API layers.
//!
//! The [`Leaderboard`] keeps one [`ScoreEntry`] per user, in the order users
//! first submitted. That order is the tie-break when ranking equal scores.

use serde::{Deserialize, Serialize};

/// Default number of entries returned by a top-N query
pub const DEFAULT_TOP_LIMIT: usize = 10;

// =============================================================================
// ENTITY TYPES
// =============================================================================

/// One user's best recorded score.
///
/// `user_id` is the unique key. `username` is display metadata cached from
/// the identity provider and may drift from its current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub user_id: String,
    pub username: String,
    pub score: u64,
}

impl ScoreEntry {
    /// Build a validated entry.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidInput`] when the user id or username is
    /// blank.
    pub fn new(
        user_id: impl Into<String>,
        username: impl Into<String>,
        score: u64,
    ) -> Result<Self, DomainError> {
        let entry = Self {
            user_id: user_id.into(),
            username: username.into(),
            score,
        };
        entry.validate()?;
        Ok(entry)
    }

    /// Check the identity fields of an entry.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidInput`] naming the offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.user_id.trim().is_empty() {
            return Err(DomainError::InvalidInput("userId must not be empty".into()));
        }
        if self.username.trim().is_empty() {
            return Err(DomainError::InvalidInput("username must not be empty".into()));
        }
        Ok(())
    }
}

/// Authenticated user as reported by the identity provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

impl UserProfile {
    /// Build the leaderboard entry this user would submit for `score`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidInput`] if the profile has a blank id or
    /// username.
    pub fn score_entry(&self, score: u64) -> Result<ScoreEntry, DomainError> {
        ScoreEntry::new(self.id.clone(), self.username.clone(), score)
    }
}

// =============================================================================
// LEADERBOARD AGGREGATE
// =============================================================================

/// The full set of score entries, one per user, in first-submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Leaderboard {
    entries: Vec<ScoreEntry>,
}

impl Leaderboard {
    /// Empty leaderboard
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Rebuild a leaderboard from its stored sequence.
    ///
    /// # Errors
    ///
    /// Fails if an entry is invalid or a user id appears more than once.
    pub fn from_entries(entries: Vec<ScoreEntry>) -> Result<Self, DomainError> {
        let mut seen = std::collections::HashSet::with_capacity(entries.len());
        for entry in &entries {
            entry.validate()?;
            if !seen.insert(entry.user_id.as_str()) {
                return Err(DomainError::DuplicateUser(entry.user_id.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Entries in stored order
    #[must_use]
    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<ScoreEntry> {
        self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a user's entry
    #[must_use]
    pub fn get(&self, user_id: &str) -> Option<&ScoreEntry> {
        self.entries.iter().find(|e| e.user_id == user_id)
    }

    /// Merge a submission, keeping the user's best score.
    ///
    /// A new user is appended. An existing user is updated in place (score
    /// and username) only when the submitted score is strictly greater.
    /// Returns the user's previous score, or `None` for a new user.
    pub fn upsert_best(&mut self, entry: ScoreEntry) -> Option<u64> {
        match self.entries.iter_mut().find(|e| e.user_id == entry.user_id) {
            Some(existing) => {
                let previous = existing.score;
                if entry.score > existing.score {
                    existing.score = entry.score;
                    existing.username = entry.username;
                }
                Some(previous)
            }
            None => {
                self.entries.push(entry);
                None
            }
        }
    }

    /// Highest `n` entries, score descending.
    ///
    /// Equal scores keep stored order, so the earliest submitter ranks first.
    #[must_use]
    pub fn top(&self, n: usize) -> Vec<ScoreEntry> {
        let mut ranked: Vec<&ScoreEntry> = self.entries.iter().collect();
        // sort_by is stable
        ranked.sort_by(|a, b| b.score.cmp(&a.score));
        ranked.into_iter().take(n).cloned().collect()
    }
}

// =============================================================================
// ERRORS
// =============================================================================

/// Domain-level errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate leaderboard entry for user {0}")]
    DuplicateUser(String),
}
