//! Discord OAuth2 identity provider (authorization-code flow, `identify` scope).

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;

use super::IdentityProvider;
use crate::config::DiscordConfig;
use crate::error::{ApiError, ApiResult};
use leaderboard_domain::UserProfile;

const AUTHORIZE_URL: &str = "https://discord.com/oauth2/authorize";
const TOKEN_URL: &str = "https://discord.com/api/oauth2/token";
const USER_URL: &str = "https://discord.com/api/users/@me";
const AVATAR_CDN: &str = "https://cdn.discordapp.com/avatars";
const SCOPES: &str = "identify";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct DiscordUser {
    id: String,
    username: String,
    #[serde(default)]
    avatar: Option<String>,
}

impl From<DiscordUser> for UserProfile {
    fn from(user: DiscordUser) -> Self {
        let avatar = user
            .avatar
            .map(|hash| format!("{AVATAR_CDN}/{}/{hash}.png", user.id));
        Self {
            id: user.id,
            username: user.username,
            avatar,
        }
    }
}

/// Discord login
pub struct DiscordProvider {
    http: reqwest::Client,
    config: DiscordConfig,
    authorize_base: Url,
}

impl DiscordProvider {
    /// # Errors
    ///
    /// Fails if the HTTP client cannot be built.
    pub fn new(config: DiscordConfig) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Internal(format!("HTTP client: {e}")))?;
        let authorize_base =
            Url::parse(AUTHORIZE_URL).map_err(|e| ApiError::Internal(e.to_string()))?;

        Ok(Self {
            http,
            config,
            authorize_base,
        })
    }
}

fn provider_error(err: reqwest::Error) -> ApiError {
    ApiError::Identity(err.to_string())
}

#[async_trait]
impl IdentityProvider for DiscordProvider {
    fn name(&self) -> &'static str {
        "discord"
    }

    fn authorize_url(&self, state: &str) -> String {
        let mut url = self.authorize_base.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES)
            .append_pair("state", state);
        url.into()
    }

    async fn exchange_code(&self, code: &str) -> ApiResult<UserProfile> {
        let token: TokenResponse = self
            .http
            .post(TOKEN_URL)
            .form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(provider_error)?
            .json()
            .await
            .map_err(provider_error)?;

        let user: DiscordUser = self
            .http
            .get(USER_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(provider_error)?
            .json()
            .await
            .map_err(provider_error)?;

        Ok(user.into())
    }
}
