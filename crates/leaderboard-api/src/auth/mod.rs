//! # Authentication
//!
//! Identity provider abstraction and the request extractors that resolve the
//! caller from their session cookie. Handlers receive the identity as an
//! explicit argument.

pub mod discord;
pub mod session;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use std::convert::Infallible;
use std::sync::Arc;

use crate::context::ApiContext;
use crate::error::{ApiError, ApiResult};
use leaderboard_domain::UserProfile;

pub use discord::DiscordProvider;
pub use session::SessionStore;

/// OAuth-style delegated login
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Provider name for logs
    fn name(&self) -> &'static str;

    /// URL the browser is sent to, carrying the anti-forgery `state`
    fn authorize_url(&self, state: &str) -> String;

    /// Trade an authorization code for the user's profile
    async fn exchange_code(&self, code: &str) -> ApiResult<UserProfile>;
}

pub type SharedIdentityProvider = Arc<dyn IdentityProvider>;

/// Caller's profile when signed in
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<UserProfile>);

impl FromRequestParts<ApiContext> for CurrentUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ApiContext,
    ) -> Result<Self, Self::Rejection> {
        let user = match session::session_id(&parts.headers) {
            Some(id) => ctx.sessions.get(id).await,
            None => None,
        };
        Ok(Self(user))
    }
}

/// Signed-in caller; rejects with 401 otherwise
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub UserProfile);

impl FromRequestParts<ApiContext> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        ctx: &ApiContext,
    ) -> Result<Self, Self::Rejection> {
        match CurrentUser::from_request_parts(parts, ctx).await {
            Ok(CurrentUser(Some(user))) => Ok(Self(user)),
            _ => Err(ApiError::Unauthorized("sign in to submit scores".into())),
        }
    }
}
