//! Server-side sessions and the cookies that carry them.

use axum::http::HeaderMap;
use axum::http::header::COOKIE;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

use leaderboard_domain::UserProfile;

/// Cookie holding the session id
pub const SESSION_COOKIE: &str = "lb_session";

/// Cookie holding the pending OAuth `state` value
pub const STATE_COOKIE: &str = "lb_oauth_state";

/// Lifetime of a pending login
pub const STATE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
struct Session {
    user: UserProfile,
    expires_at: DateTime<Utc>,
}

/// In-memory session store keyed by random session id
#[derive(Debug)]
pub struct SessionStore {
    sessions: RwLock<HashMap<Uuid, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }

    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Start a session for `user`, purging expired ones.
    pub async fn create(&self, user: UserProfile) -> Uuid {
        let now = Utc::now();
        let ttl =
            chrono::Duration::from_std(self.ttl).unwrap_or_else(|_| chrono::Duration::days(365));
        let id = Uuid::new_v4();

        let mut sessions = self.sessions.write().await;
        sessions.retain(|_, s| s.expires_at > now);
        sessions.insert(
            id,
            Session {
                user,
                expires_at: now + ttl,
            },
        );
        id
    }

    /// User bound to a live session
    pub async fn get(&self, id: Uuid) -> Option<UserProfile> {
        let now = Utc::now();
        {
            let sessions = self.sessions.read().await;
            match sessions.get(&id) {
                Some(session) if session.expires_at > now => return Some(session.user.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        self.sessions.write().await.remove(&id);
        None
    }

    /// End a session, returning whether it existed
    pub async fn remove(&self, id: Uuid) -> bool {
        self.sessions.write().await.remove(&id).is_some()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

/// Session id from the request cookies, if well-formed
pub fn session_id(headers: &HeaderMap) -> Option<Uuid> {
    read_cookie(headers, SESSION_COOKIE).and_then(|raw| Uuid::parse_str(&raw).ok())
}

/// Value of cookie `name` across all `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value for a session
pub fn session_cookie(id: Uuid, ttl: Duration, secure: bool) -> String {
    build_cookie(SESSION_COOKIE, &id.to_string(), ttl.as_secs(), secure)
}

/// `Set-Cookie` value for a pending OAuth state
pub fn state_cookie(state: &str, secure: bool) -> String {
    build_cookie(STATE_COOKIE, state, STATE_TTL.as_secs(), secure)
}

/// `Set-Cookie` value that clears `name`
pub fn expired_cookie(name: &str, secure: bool) -> String {
    build_cookie(name, "", 0, secure)
}

fn build_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    let mut cookie = format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age}");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
