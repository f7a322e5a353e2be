//! Session middleware for `Quire`.
//!
//! Reads the session cookie, loads the client's [`Session`] from the
//! server-side table, and injects it into the request extensions. Handlers
//! take it with `Extension<Session>` and return the updated value in the
//! response extensions; this middleware then persists it and manages the
//! cookie. A response without a `Session` leaves the stored one untouched.

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};

use quire_core::session::{Session, SessionStore};

use crate::state::AppState;

/// Cookie carrying the session id.
pub const SESSION_COOKIE: &str = "quire_session";

/// Middleware that loads and persists the per-client [`Session`].
///
/// The session id is rotated whenever the signed-in identity changes, and a
/// client-supplied id is never adopted unless it names a live session.
pub async fn session_middleware(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    mut req: Request,
    next: Next,
) -> Response {
    let cookie_id = jar.get(SESSION_COOKIE).map(|c| c.value().to_owned());

    let (live_id, loaded) = match cookie_id.as_deref() {
        Some(id) => match state.sessions.load(id).await {
            Some(session) => (Some(id.to_owned()), session),
            None => (None, Session::new()),
        },
        None => (None, Session::new()),
    };

    let previous_user = loaded.username().map(str::to_owned);
    req.extensions_mut().insert(loaded);

    let mut response = next.run(req).await;

    let Some(updated) = response.extensions_mut().remove::<Session>() else {
        return response;
    };

    if updated.is_empty() {
        if let Some(id) = live_id.as_deref() {
            state.sessions.remove(id).await;
        }
        if cookie_id.is_some() {
            let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
            return (jar, response).into_response();
        }
        return response;
    }

    let rotate = live_id.is_none() || previous_user.as_deref() != updated.username();
    let id = match live_id {
        Some(id) if !rotate => id,
        stale => {
            if let Some(old) = stale.as_deref() {
                state.sessions.remove(old).await;
            }
            SessionStore::generate_id()
        }
    };

    state.sessions.save(&id, updated).await;

    if cookie_id.as_deref() == Some(id.as_str()) {
        return response;
    }

    let cookie = Cookie::build((SESSION_COOKIE, id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);
    (jar.add(cookie), response).into_response()
}
