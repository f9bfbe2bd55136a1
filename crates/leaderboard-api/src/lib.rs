//! # Score Leaderboard API
//!
//! HTTP service for a Discord-authenticated score leaderboard.
//!
//! ## Features
//!
//! - **Leaderboard Reads**: top scores, highest first, no sign-in needed
//! - **Score Submission**: signed-in users submit scores, best one is kept
//! - **Discord Login**: OAuth2 authorization-code flow with server-side sessions
//! - **Static Frontend**: everything outside the API is served from `STATIC_DIR`
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Axum HTTP Server                         │
//! │        (/api/leaderboard, /api/user, /login, static)        │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       ApiContext                            │
//! │     (LeaderboardRepository, SessionStore, IdentityProvider) │
//! └─────────────────────────────────────────────────────────────┘
//!                    │                   │
//!                    ▼                   ▼
//! ┌─────────────────────────┐   ┌──────────────────────────────┐
//! │   Key-Value Store       │   │     Discord OAuth2           │
//! │ (Redis / hosted KV)     │   │   (identify scope)           │
//! └─────────────────────────┘   └──────────────────────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod schema;

#[cfg(test)]
pub(crate) mod test_support;

use axum::{
    Router,
    http::{HeaderValue, Method, header},
    response::IntoResponse,
    routing::get,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub use config::Config;
pub use context::{ApiContext, ApiContextBuilder};
pub use error::{ApiError, ApiResult};

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    "OK"
}

/// Build the Axum router
pub fn build_router(ctx: ApiContext, config: &Config) -> Router {
    let api = Router::new()
        .route(
            "/api/leaderboard",
            get(handlers::get_leaderboard).post(handlers::submit_score),
        )
        .route("/api/user", get(handlers::user_status))
        .route("/login", get(handlers::login))
        .route("/auth/discord/callback", get(handlers::oauth_callback))
        .route("/logout", get(handlers::logout).post(handlers::logout))
        .route("/health", get(health_check))
        .with_state(ctx);

    api.fallback_service(ServeDir::new(&config.static_dir))
        .layer(cors_layer(&config.cors_origins))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods([Method::GET, Method::POST, Method::OPTIONS]);

    if origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any).allow_headers(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    cors.allow_origin(AllowOrigin::list(allowed))
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::TestApp;
    use axum::http::StatusCode;

    #[tokio::test]
    async fn test_health() {
        let app = TestApp::new();
        let response = app.get("/health", None).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_path_falls_through_to_static() {
        let app = TestApp::new();
        let response = app.get("/missing.js", None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
