//! Shared application state for `Quire` server.
//!
//! A single [`AppState`] is constructed at startup and shared across all
//! Axum handlers via `Arc`. Nothing in it is per-client: sessions are looked
//! up per request and handed to handlers as values.

use std::sync::Arc;

use quire_core::auth::AuthGate;
use quire_core::credentials::UsersFile;
use quire_core::session::SessionStore;
use quire_storage::DocumentStore;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Where documents live.
    pub store: Arc<dyn DocumentStore>,
    /// Known users, re-read on every sign-in attempt.
    pub users: UsersFile,
    /// Decides who may touch documents.
    pub gate: AuthGate,
    /// Server-side session table.
    pub sessions: Arc<SessionStore>,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("users", &self.users)
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}
