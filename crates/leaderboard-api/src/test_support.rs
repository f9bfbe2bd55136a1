//! Router harness shared by handler tests.

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Method, Request, Response};
use std::sync::Arc;
use tower::ServiceExt;

use crate::auth::IdentityProvider;
use crate::config::Config;
use crate::context::{ApiContext, ApiContextBuilder};
use crate::error::{ApiError, ApiResult};
use crate::build_router;
use leaderboard_domain::UserProfile;
use leaderboard_persistence::{KeyValueStore, MemoryStore, PersistenceError, SharedStore};

/// Accepts the code `good`, rejects anything else
pub struct StubProvider;

#[async_trait]
impl IdentityProvider for StubProvider {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn authorize_url(&self, state: &str) -> String {
        format!("https://id.example/authorize?client_id=stub&state={state}")
    }

    async fn exchange_code(&self, code: &str) -> ApiResult<UserProfile> {
        if code == "good" {
            Ok(UserProfile {
                id: "stub-1".into(),
                username: "stubby".into(),
                avatar: None,
            })
        } else {
            Err(ApiError::Identity("invalid_grant".into()))
        }
    }
}

/// Store that is always down
pub struct UnavailableStore;

#[async_trait]
impl KeyValueStore for UnavailableStore {
    async fn get(&self, _key: &str) -> leaderboard_persistence::Result<Option<String>> {
        Err(PersistenceError::Timeout { timeout_ms: 2000 })
    }

    async fn set(&self, _key: &str, _value: &str) -> leaderboard_persistence::Result<()> {
        Err(PersistenceError::Timeout { timeout_ms: 2000 })
    }

    async fn del(&self, _key: &str) -> leaderboard_persistence::Result<bool> {
        Err(PersistenceError::Timeout { timeout_ms: 2000 })
    }

    fn backend_name(&self) -> &'static str {
        "unavailable"
    }
}

pub struct TestApp {
    pub router: Router,
    pub ctx: ApiContext,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::build(None, true)
    }

    pub fn without_login() -> Self {
        Self::build(None, false)
    }

    pub fn with_unavailable_store() -> Self {
        Self::build(Some(Arc::new(UnavailableStore)), true)
    }

    fn build(store_override: Option<SharedStore>, login: bool) -> Self {
        let config = Config::from_lookup(|key| match key {
            "STORE_BACKEND" => Some("memory".to_string()),
            "STATIC_DIR" => Some("does-not-exist".to_string()),
            _ => None,
        })
        .unwrap();

        let store = Arc::new(MemoryStore::new());
        let shared: SharedStore = store_override.unwrap_or_else(|| store.clone() as SharedStore);

        let mut builder = ApiContextBuilder::new()
            .with_store(shared)
            .with_session_config(config.session.clone())
            .with_limits(config.leaderboard);
        if login {
            builder = builder.with_identity_provider(Arc::new(StubProvider));
        }
        let ctx = builder.build().unwrap();

        Self {
            router: build_router(ctx.clone(), &config),
            ctx,
            store,
        }
    }

    /// Start a session directly, returning the `Cookie` header value
    pub async fn sign_in(&self, id: &str, username: &str) -> String {
        let session = self
            .ctx
            .sessions
            .create(UserProfile {
                id: id.to_string(),
                username: username.to_string(),
                avatar: None,
            })
            .await;
        format!("lb_session={session}")
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        self.send(Method::GET, uri, Body::empty(), cookie).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        body: serde_json::Value,
        cookie: Option<&str>,
    ) -> Response<Body> {
        self.send(Method::POST, uri, Body::from(body.to_string()), cookie)
            .await
    }

    pub async fn post_raw(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        self.send(Method::POST, uri, Body::from(body.to_string()), cookie)
            .await
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Body,
        cookie: Option<&str>,
    ) -> Response<Body> {
        let mut request = Request::builder()
            .method(method)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json");
        if let Some(cookie) = cookie {
            request = request.header(COOKIE, cookie);
        }

        self.router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap()
    }
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .map(|v| v.to_str().unwrap().to_string())
        .collect()
}
