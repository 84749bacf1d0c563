//! Manga Overlay - translation overlay service
//!
//! Serves the document, history and cache API over HTTP.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use manga_overlay::{create_router, AppContext, AppState, Config};

/// Main entry point for the overlay server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the context and restore persisted state
/// 4. Start background expiry sweeps
/// 5. Serve HTTP until SIGINT/SIGTERM, then destroy the caches
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "manga_overlay=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Manga Overlay server");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, sweep_interval={}s, history={}, data_dir={}",
        config.server_port,
        config.sweep_interval,
        config.max_history_steps,
        config.data_dir.display()
    );

    let mut ctx = AppContext::from_config(config.clone());
    if let Err(err) = ctx.restore().await {
        warn!(error = %err, "could not restore saved state, starting with defaults");
    }
    ctx.start_sweeps();
    info!("Caches initialized with background sweeps");

    let state = AppState::new(ctx);
    let app = create_router(state.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    match Arc::try_unwrap(state.ctx) {
        Ok(ctx) => ctx.shutdown().await,
        Err(ctx) => {
            warn!("context still shared at shutdown, saving project only");
            ctx.persist().await;
        }
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!(error = %err, "failed to listen for Ctrl+C");
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
                error!(error = %err, "failed to install SIGTERM handler");
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
