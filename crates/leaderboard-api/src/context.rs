//! # API Context
//!
//! Application state shared by all handlers.

use std::sync::Arc;

use crate::auth::{SessionStore, SharedIdentityProvider};
use crate::config::{LeaderboardConfig, SessionConfig};
use leaderboard_persistence::{KvLeaderboardRepository, LeaderboardRepository, SharedStore};

/// Application context shared across all handlers
#[derive(Clone)]
pub struct ApiContext {
    /// Leaderboard repository
    pub leaderboard_repo: Arc<dyn LeaderboardRepository>,

    /// Signed-in users
    pub sessions: Arc<SessionStore>,

    /// Login provider, `None` when login is not configured
    pub identity: Option<SharedIdentityProvider>,

    /// Cookie settings
    pub session_config: SessionConfig,

    /// Top-N query limits
    pub limits: LeaderboardConfig,
}

/// Builder for ApiContext
pub struct ApiContextBuilder {
    repo: Option<Arc<dyn LeaderboardRepository>>,
    identity: Option<SharedIdentityProvider>,
    session_config: SessionConfig,
    limits: LeaderboardConfig,
}

impl ApiContextBuilder {
    pub fn new() -> Self {
        Self {
            repo: None,
            identity: None,
            session_config: SessionConfig::default(),
            limits: LeaderboardConfig::default(),
        }
    }

    /// Use the key-value repository over `store`
    pub fn with_store(self, store: SharedStore) -> Self {
        self.with_repository(Arc::new(KvLeaderboardRepository::new(store)))
    }

    pub fn with_repository(mut self, repo: Arc<dyn LeaderboardRepository>) -> Self {
        self.repo = Some(repo);
        self
    }

    pub fn with_identity_provider(mut self, provider: SharedIdentityProvider) -> Self {
        self.identity = Some(provider);
        self
    }

    pub fn with_session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn with_limits(mut self, limits: LeaderboardConfig) -> Self {
        self.limits = limits;
        self
    }

    pub fn build(self) -> Result<ApiContext, &'static str> {
        let leaderboard_repo = self.repo.ok_or("leaderboard repository required")?;
        Ok(ApiContext {
            leaderboard_repo,
            sessions: Arc::new(SessionStore::new(self.session_config.ttl)),
            identity: self.identity,
            session_config: self.session_config,
            limits: self.limits,
        })
    }
}

impl Default for ApiContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
