//! # API Configuration
//!
//! Environment-based configuration for the leaderboard service.

use anyhow::{Context, bail};
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use leaderboard_domain::DEFAULT_TOP_LIMIT;
use leaderboard_persistence::{RedisConfig, RestKvConfig, StoreConfig};

/// API server configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub server_addr: SocketAddr,

    /// Logging level, used when `RUST_LOG` is unset
    pub log_level: String,

    /// Log output format
    pub log_format: LogFormat,

    /// Key-value store backend
    pub store: StoreConfig,

    /// Discord OAuth application, `None` disables login
    pub discord: Option<DiscordConfig>,

    /// Session cookie settings
    pub session: SessionConfig,

    /// Leaderboard query limits
    pub leaderboard: LeaderboardConfig,

    /// Directory served for non-API paths
    pub static_dir: PathBuf,

    /// CORS allowed origins
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

/// Discord OAuth2 application credentials
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub ttl: Duration,
    pub cookie_secure: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(7 * 24 * 60 * 60),
            cookie_secure: false,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct LeaderboardConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_TOP_LIMIT,
            max_limit: 100,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error naming the first variable with an invalid value.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns an error naming the first variable with an invalid value.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let server_addr = match lookup("SERVER_ADDR") {
            Some(addr) => addr
                .parse()
                .with_context(|| format!("Invalid SERVER_ADDR: {addr}"))?,
            None => {
                let port: u16 = parse_or(&lookup, "PORT", 3000)?;
                SocketAddr::from(([0, 0, 0, 0], port))
            }
        };

        let log_format = match lookup("LOG_FORMAT").as_deref() {
            None | Some("json") => LogFormat::Json,
            Some("pretty") => LogFormat::Pretty,
            Some(other) => bail!("Invalid LOG_FORMAT: {other} (expected json or pretty)"),
        };

        let leaderboard = LeaderboardConfig {
            default_limit: parse_or(&lookup, "LEADERBOARD_DEFAULT_LIMIT", DEFAULT_TOP_LIMIT)?,
            max_limit: parse_or(&lookup, "LEADERBOARD_MAX_LIMIT", 100)?,
        };
        if leaderboard.default_limit > leaderboard.max_limit {
            bail!(
                "LEADERBOARD_DEFAULT_LIMIT ({}) exceeds LEADERBOARD_MAX_LIMIT ({})",
                leaderboard.default_limit,
                leaderboard.max_limit
            );
        }

        Ok(Self {
            server_addr,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            log_format,
            store: store_config(&lookup)?,
            discord: discord_config(&lookup),
            session: SessionConfig {
                ttl: Duration::from_secs(parse_or(&lookup, "SESSION_TTL_SECS", 7 * 24 * 60 * 60)?),
                cookie_secure: flag(&lookup, "COOKIE_SECURE", false),
            },
            leaderboard,
            static_dir: lookup("STATIC_DIR")
                .map_or_else(|| PathBuf::from("public"), PathBuf::from),
            cors_origins: lookup("CORS_ORIGINS")
                .unwrap_or_else(|| "*".to_string())
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        })
    }
}

fn store_config(lookup: &impl Fn(&str) -> Option<String>) -> anyhow::Result<StoreConfig> {
    let timeout = Duration::from_millis(parse_or(lookup, "STORE_TIMEOUT_MS", 2000)?);
    let rest_url = lookup("KV_REST_API_URL");

    let backend = lookup("STORE_BACKEND").unwrap_or_else(|| {
        if rest_url.is_some() { "rest" } else { "redis" }.to_string()
    });

    match backend.as_str() {
        "redis" => Ok(StoreConfig::Redis(RedisConfig {
            url: lookup("REDIS_URL").unwrap_or_else(|| "redis://127.0.0.1:6379".to_string()),
            timeout,
        })),
        "rest" => {
            let url = rest_url.context("STORE_BACKEND=rest requires KV_REST_API_URL")?;
            let token = lookup("KV_REST_API_TOKEN")
                .context("STORE_BACKEND=rest requires KV_REST_API_TOKEN")?;
            let mut rest = RestKvConfig::new(url, token);
            rest.timeout = timeout;
            Ok(StoreConfig::Rest(rest))
        }
        "memory" => Ok(StoreConfig::Memory),
        other => bail!("Invalid STORE_BACKEND: {other} (expected redis, rest or memory)"),
    }
}

fn discord_config(lookup: &impl Fn(&str) -> Option<String>) -> Option<DiscordConfig> {
    Some(DiscordConfig {
        client_id: lookup("DISCORD_CLIENT_ID")?,
        client_secret: lookup("DISCORD_CLIENT_SECRET")?,
        redirect_uri: lookup("REDIRECT_URI")?,
    })
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key}: {raw}")),
        None => Ok(default),
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> bool {
    lookup(key).map_or(default, |v| v == "true" || v == "1")
}
