//! # Score Leaderboard API Server
//!
//! Binary entry point for the leaderboard service.

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use leaderboard_api::auth::DiscordProvider;
use leaderboard_api::config::LogFormat;
use leaderboard_api::{ApiContextBuilder, Config, build_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    let config = Config::from_env()?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.log_level.clone().into());
    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer().pretty()).init(),
    }

    tracing::info!(
        version = leaderboard_api::VERSION,
        "Starting score leaderboard API"
    );

    let store = leaderboard_persistence::connect(&config.store)
        .await
        .context("Failed to connect to the key-value store")?;

    let mut builder = ApiContextBuilder::new()
        .with_store(store)
        .with_session_config(config.session.clone())
        .with_limits(config.leaderboard);

    match config.discord.clone() {
        Some(discord) => {
            tracing::info!(redirect_uri = %discord.redirect_uri, "Discord login enabled");
            builder = builder.with_identity_provider(Arc::new(DiscordProvider::new(discord)?));
        }
        None => tracing::warn!("DISCORD_CLIENT_ID/SECRET/REDIRECT_URI not set, login disabled"),
    }

    let ctx = builder.build().map_err(anyhow::Error::msg)?;
    let app = build_router(ctx, &config);

    let addr = config.server_addr;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!(%addr, static_dir = %config.static_dir.display(), "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shut down gracefully");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
