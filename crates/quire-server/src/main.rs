//! `Quire` server entry point.
//!
//! Loads configuration, opens the document store, then starts the Axum HTTP
//! server with graceful shutdown. A background session sweeper runs
//! alongside the server and is cancelled on shutdown.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{debug, info};

use quire_core::session::SessionStore;
use quire_server::app::{build_router, build_state};
use quire_server::config::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::from_env();

    // Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level)),
        )
        .json()
        .init();

    info!(
        storage = ?config.storage_backend,
        users_file = %config.users_file.display(),
        admin = %config.admin_username,
        "Quire starting"
    );

    let state = build_state(&config).await?;

    // Shutdown signal channel.
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let sweeper_handle = {
        let sessions = Arc::clone(&state.sessions);
        let mut rx = shutdown_rx.clone();
        let interval_secs = config.session_sweep_interval_secs;
        tokio::spawn(async move {
            session_sweeper(sessions, &mut rx, interval_secs).await;
        })
    };

    let app = build_router(state);

    let listener = TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;

    info!(addr = %config.bind_addr, "Quire server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_tx))
        .await
        .context("server error")?;

    info!("waiting for background workers to stop");
    let _ = tokio::time::timeout(Duration::from_secs(10), sweeper_handle).await;

    info!("Quire server stopped");
    Ok(())
}

/// Background worker that periodically drops expired sessions.
async fn session_sweeper(
    sessions: Arc<SessionStore>,
    shutdown: &mut watch::Receiver<bool>,
    interval_secs: u64,
) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));
    info!(interval_secs, "session sweeper started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                let purged = sessions.purge_expired().await;
                if purged > 0 {
                    info!(purged, "expired sessions purged");
                } else {
                    debug!("no expired sessions");
                }
            }
            _ = shutdown.changed() => {
                info!("session sweeper shutting down");
                return;
            }
        }
    }
}

/// Wait for SIGINT or SIGTERM, then broadcast shutdown.
async fn shutdown_signal(shutdown_tx: watch::Sender<bool>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        if let Ok(mut sig) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        {
            sig.recv().await;
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("shutdown signal received, stopping server");
    let _ = shutdown_tx.send(true);
}
