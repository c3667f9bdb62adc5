use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing_subscriber::EnvFilter;

use sankhya_center_api::sankhya::SankhyaGateway;
use sankhya_center_api::{app, config::config, AppState};

const TOKEN_SWEEP_INTERVAL_SECS: u64 = 10 * 60;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up SANKHYA_API_BASE_URL and friends
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = config();
    tracing::info!("Starting Sankhya Center API in {:?} mode", config.environment);
    tracing::info!("Sankhya upstream: {}", config.sankhya.base_url);
    if config.sankhya.fallback_username.is_none() {
        tracing::warn!("No fallback credential configured; expired tokens will not be refreshed");
    }

    let state = AppState::new(config).context("failed to build application state")?;
    spawn_token_sweeper(state.gateway.clone());
    let router = app(state);

    let bind_addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Sankhya Center API listening on http://{}", bind_addr);

    axum::serve(listener, router.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn spawn_token_sweeper(gateway: Arc<SankhyaGateway>) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(TOKEN_SWEEP_INTERVAL_SECS));
        loop {
            interval.tick().await;
            gateway.purge_expired_tokens().await;
        }
    });
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
