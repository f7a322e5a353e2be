//! HTTP route handlers for `Quire`.
//!
//! Routes are organized by subsystem:
//! - `documents`: index, view, create, edit, delete
//! - `users`: sign-in and sign-out
//!
//! Every handler takes the request's [`Session`] as `Extension<Session>` and
//! hands it back through [`reply`] so the session middleware can persist it.

pub mod documents;
pub mod users;

use axum::Extension;
use axum::response::{IntoResponse, Redirect, Response};

use quire_core::session::Session;

use crate::state::AppState;
use crate::views;

/// Attach the (possibly updated) session to a response.
pub(crate) fn reply(session: Session, response: impl IntoResponse) -> Response {
    (Extension(session), response).into_response()
}

/// `303 See Other` to `to`, carrying the session.
pub(crate) fn redirect(session: Session, to: &str) -> Response {
    reply(session, Redirect::to(to))
}

/// Render a full page, consuming the pending flash message.
pub(crate) fn render_page(state: &AppState, session: &mut Session, title: &str, body: &str) -> String {
    let flash = session.take_flash();
    let viewer = if state.gate.is_signed_in(session) {
        session.username()
    } else {
        None
    };
    views::page(title, flash.as_ref(), viewer, body)
}
