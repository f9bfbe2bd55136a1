//! Response bodies.

use serde::Serialize;

use leaderboard_domain::UserProfile;

/// Result of a score submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScoreResult {
    pub success: bool,
    /// Best score before this submission, absent for a first submission
    pub previous_best: Option<u64>,
    /// Best score after this submission
    pub best: u64,
    pub improved: bool,
}

impl SubmitScoreResult {
    pub fn new(submitted: u64, previous_best: Option<u64>) -> Self {
        let best = previous_best.map_or(submitted, |prev| prev.max(submitted));
        Self {
            success: true,
            previous_best,
            best,
            improved: previous_best.is_none_or(|prev| submitted > prev),
        }
    }
}

/// `GET /api/user` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserStatus {
    pub logged_in: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserProfile>,
}

impl From<Option<UserProfile>> for UserStatus {
    fn from(user: Option<UserProfile>) -> Self {
        Self {
            logged_in: user.is_some(),
            user,
        }
    }
}
