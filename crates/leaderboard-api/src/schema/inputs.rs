//! Request bodies and query strings.

use serde::Deserialize;

/// `GET /api/leaderboard` query
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaderboardQuery {
    /// Maximum entries to return
    pub limit: Option<usize>,
}

/// `POST /api/leaderboard` body
///
/// The identity comes from the session. A `userId` or `username` in the body
/// is accepted only when it matches the signed-in user.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScoreInput {
    /// Kept as a raw number so floats and negatives can be rejected by value
    pub score: serde_json::Number,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
}

/// OAuth redirect back from the provider
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}
