//! Modernboard server binary
//!
//! Serves the board API out of an in-memory repository with every cache
//! facade and background task running.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use modernboard::api::create_router;
use modernboard::{AppState, Config, MemoryRepository};

/// Main entry point for the board server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Start the cache registry (sweepers and ban refresh)
/// 4. Create Axum router with all endpoints
/// 5. Serve until SIGINT/SIGTERM, then stop the cache tasks
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "modernboard=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Modernboard server");

    let config = Config::from_env();
    info!(
        port = config.server_port,
        boards_ttl_secs = config.cache.boards.ttl.as_secs(),
        trending_ttl_secs = config.cache.trending.ttl.as_secs(),
        threads_page_ttl_secs = config.cache.threads_page.ttl.as_secs(),
        thread_ttl_secs = config.cache.thread.ttl.as_secs(),
        ban_refresh_secs = config.cache.ban_refresh_every.as_secs(),
        "Configuration loaded"
    );

    let repo = Arc::new(MemoryRepository::new());
    let state = AppState::start(repo, &config).await;
    let registry = Arc::clone(&state.cache);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    registry.shutdown().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }
}
