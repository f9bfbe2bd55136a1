//! Leaderboard read and score submission.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};

use crate::auth::AuthenticatedUser;
use crate::context::ApiContext;
use crate::error::{ApiError, ApiResult};
use crate::schema::{LeaderboardQuery, SubmitScoreInput, SubmitScoreResult};
use leaderboard_domain::ScoreEntry;

/// `GET /api/leaderboard?limit=N`
///
/// Top scores, highest first. `limit` defaults to the configured default and
/// is capped at the configured maximum.
pub async fn get_leaderboard(
    State(ctx): State<ApiContext>,
    query: Result<Query<LeaderboardQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<ScoreEntry>>> {
    let Query(query) = query.map_err(|e| ApiError::InvalidInput(e.body_text()))?;
    let limit = query
        .limit
        .unwrap_or(ctx.limits.default_limit)
        .min(ctx.limits.max_limit);

    tracing::debug!(limit, "Fetching leaderboard");

    let entries = ctx.leaderboard_repo.top_n(limit).await?;
    Ok(Json(entries))
}

/// `POST /api/leaderboard`
///
/// Records the caller's score, keeping their best. A lower score is accepted
/// as a no-op.
pub async fn submit_score(
    State(ctx): State<ApiContext>,
    AuthenticatedUser(user): AuthenticatedUser,
    body: Result<Json<SubmitScoreInput>, JsonRejection>,
) -> ApiResult<Json<SubmitScoreResult>> {
    let Json(input) = body.map_err(|e| ApiError::InvalidInput(e.body_text()))?;

    let score = input
        .score
        .as_u64()
        .ok_or_else(|| ApiError::InvalidInput("score must be a non-negative integer".into()))?;

    if input.user_id.as_deref().is_some_and(|id| id != user.id) {
        return Err(ApiError::InvalidInput(
            "userId does not match the signed-in user".into(),
        ));
    }
    if input.username.as_deref().is_some_and(|name| name != user.username) {
        return Err(ApiError::InvalidInput(
            "username does not match the signed-in user".into(),
        ));
    }

    let entry = user.score_entry(score)?;
    let previous = ctx.leaderboard_repo.upsert_best_score(entry).await?;
    let result = SubmitScoreResult::new(score, previous);

    tracing::info!(
        user_id = %user.id,
        score,
        previous_best = ?previous,
        improved = result.improved,
        "Score submitted"
    );

    Ok(Json(result))
}
