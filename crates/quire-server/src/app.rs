//! Application assembly: shared state and the Axum router.
//!
//! Kept out of `main.rs` so the integration tests drive exactly the router
//! the binary serves.

use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use axum::http::{HeaderValue, header};
use axum::middleware as axum_mw;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use quire_core::auth::AuthGate;
use quire_core::credentials::UsersFile;
use quire_core::session::SessionStore;
use quire_storage::{DocumentStore, FsStore, MemoryStore};

use crate::config::{ServerConfig, StorageBackendType};
use crate::middleware::session_middleware;
use crate::routes;
use crate::state::AppState;

/// Open the configured document store and build the shared state.
///
/// # Errors
///
/// Returns an error if the document directory cannot be created or opened.
pub async fn build_state(config: &ServerConfig) -> anyhow::Result<Arc<AppState>> {
    let store: Arc<dyn DocumentStore> = match &config.storage_backend {
        StorageBackendType::Memory => {
            info!("using in-memory document store (documents are lost on restart)");
            Arc::new(MemoryStore::new())
        }
        StorageBackendType::Filesystem { path } => {
            let store = FsStore::open(path)
                .await
                .with_context(|| format!("failed to open document directory {}", path.display()))?;
            info!(root = %store.root().display(), "using filesystem document store");
            Arc::new(store)
        }
    };

    Ok(Arc::new(AppState {
        store,
        users: UsersFile::new(&config.users_file),
        gate: AuthGate::new(config.admin_username.clone()),
        sessions: Arc::new(SessionStore::new(config.session_ttl_secs)),
    }))
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::users::router())
        .merge(routes::documents::router())
        .route_layer(axum_mw::from_fn_with_state(
            Arc::clone(&state),
            session_middleware,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}
