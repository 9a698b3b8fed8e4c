//! PDF Range Cache - byte-range reads of remote documents
//!
//! Runs the range cache as an HTTP service with per-session caches.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pdf_range_cache::api::create_router;
use pdf_range_cache::tasks::spawn_session_sweeper;
use pdf_range_cache::{AppState, Config, HttpFetcher};

/// Main entry point for the range cache service.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Build the upstream fetcher and application state
/// 4. Spawn the idle-session sweeper and create the Axum router
/// 5. Start HTTP server on configured port
/// 6. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pdf_range_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting PDF Range Cache");

    let config = Config::from_env();
    info!(
        "Configuration loaded: port={}, inactivity={}ms, lifetime={}ms, max_size={}B, allowed_dirs={}, allowed_files={}",
        config.server_port,
        config.inactivity_timeout_ms,
        config.max_lifetime_ms,
        config.max_pdf_size_bytes,
        config.allowed_dirs.len(),
        config.allowed_files.len()
    );

    let fetcher =
        HttpFetcher::new(config.fetch_timeout()).context("failed to build upstream fetcher")?;
    let state = AppState::from_config(&config, Arc::new(fetcher));

    let sweeper = config.session_sweep().map(|(idle_timeout, interval)| {
        spawn_session_sweeper(state.sessions.clone(), idle_timeout, interval)
    });

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }
    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
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
