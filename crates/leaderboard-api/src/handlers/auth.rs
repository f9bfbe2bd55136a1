//! Login, OAuth callback, logout and session status.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::http::header::SET_COOKIE;
use axum::response::{AppendHeaders, IntoResponse, Redirect, Response};
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::auth::session::{self, SESSION_COOKIE, STATE_COOKIE};
use crate::context::ApiContext;
use crate::error::{ApiError, ApiResult};
use crate::schema::{CallbackQuery, UserStatus};

/// `GET /login`: send the browser to the provider.
pub async fn login(State(ctx): State<ApiContext>) -> ApiResult<Response> {
    let provider = ctx
        .identity
        .as_ref()
        .ok_or_else(|| ApiError::Internal("login is not configured".into()))?;

    let state = Uuid::new_v4().simple().to_string();
    let cookie = session::state_cookie(&state, ctx.session_config.cookie_secure);

    Ok((
        AppendHeaders([(SET_COOKIE, cookie)]),
        Redirect::to(&provider.authorize_url(&state)),
    )
        .into_response())
}

/// `GET /auth/discord/callback`: finish login and start a session.
///
/// Every failure lands back on `/` without a session.
pub async fn oauth_callback(
    State(ctx): State<ApiContext>,
    headers: HeaderMap,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let secure = ctx.session_config.cookie_secure;
    let clear_state = session::expired_cookie(STATE_COOKIE, secure);

    match complete_login(&ctx, &headers, query).await {
        Ok(session_id) => {
            let cookie = session::session_cookie(session_id, ctx.sessions.ttl(), secure);
            (
                AppendHeaders([(SET_COOKIE, clear_state), (SET_COOKIE, cookie)]),
                Redirect::to("/"),
            )
                .into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            (AppendHeaders([(SET_COOKIE, clear_state)]), Redirect::to("/")).into_response()
        }
    }
}

async fn complete_login(
    ctx: &ApiContext,
    headers: &HeaderMap,
    query: CallbackQuery,
) -> ApiResult<Uuid> {
    let provider = ctx
        .identity
        .as_ref()
        .ok_or_else(|| ApiError::Internal("login is not configured".into()))?;

    if let Some(error) = query.error {
        return Err(ApiError::Identity(format!("provider returned {error}")));
    }

    let expected = session::read_cookie(headers, STATE_COOKIE);
    match (&query.state, &expected) {
        (Some(got), Some(want)) if got == want => {}
        _ => return Err(ApiError::Unauthorized("OAuth state mismatch".into())),
    }

    let code = query
        .code
        .ok_or_else(|| ApiError::InvalidInput("missing authorization code".into()))?;

    let user = provider.exchange_code(&code).await?;
    tracing::info!(
        provider = provider.name(),
        user_id = %user.id,
        username = %user.username,
        "User signed in"
    );

    Ok(ctx.sessions.create(user).await)
}

/// `GET|POST /logout`
pub async fn logout(State(ctx): State<ApiContext>, headers: HeaderMap) -> Response {
    if let Some(id) = session::session_id(&headers) {
        if ctx.sessions.remove(id).await {
            tracing::info!(session = %id, "User signed out");
        }
    }

    let cookie = session::expired_cookie(SESSION_COOKIE, ctx.session_config.cookie_secure);
    (AppendHeaders([(SET_COOKIE, cookie)]), Redirect::to("/")).into_response()
}

/// `GET /api/user`
pub async fn user_status(CurrentUser(user): CurrentUser) -> Json<UserStatus> {
    Json(UserStatus::from(user))
}
