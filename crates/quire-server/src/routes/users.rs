//! Sign-in and sign-out routes.
//!
//! - `GET  /users/signin`  — sign-in form
//! - `POST /users/new`     — validate credentials, start a signed-in session
//! - `POST /users/signout` — forget the signed-in identity

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Router};
use serde::Deserialize;
use tracing::{info, warn};

use quire_core::credentials::INVALID_CREDENTIALS;
use quire_core::session::Session;

use super::{redirect, render_page, reply};
use crate::error::AppError;
use crate::state::AppState;
use crate::views;

/// Build the users router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users/signin", get(sign_in_form))
        .route("/users/new", post(sign_in))
        .route("/users/signout", post(sign_out))
}

#[derive(Deserialize)]
pub struct SignInForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for SignInForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignInForm")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

async fn sign_in_form(
    State(state): State<Arc<AppState>>,
    Extension(mut session): Extension<Session>,
) -> Response {
    let page = render_page(&state, &mut session, "Sign In", &views::sign_in(""));
    reply(session, Html(page))
}

/// Validate the submitted credentials against the users file.
///
/// Only the administrative identity can sign in; any other account is
/// rejected the same way as a wrong password.
async fn sign_in(
    State(state): State<Arc<AppState>>,
    Extension(mut session): Extension<Session>,
    Form(form): Form<SignInForm>,
) -> Result<Response, AppError> {
    let username = form.username.trim();
    // Verify first so every rejected attempt costs one Argon2 check.
    let verified = state.users.authenticate(username, &form.password).await?;

    if verified && username == state.gate.admin_username() {
        info!(user = %username, "signed in");
        session.sign_in(username);
        session.flash_success("Welcome!");
        return Ok(redirect(session, "/"));
    }

    warn!(user = %username, "sign-in rejected");
    session.flash_error(INVALID_CREDENTIALS);
    let page = render_page(&state, &mut session, "Sign In", &views::sign_in(username));
    Ok(reply(session, (StatusCode::UNPROCESSABLE_ENTITY, Html(page))))
}

async fn sign_out(Extension(mut session): Extension<Session>) -> Response {
    if let Some(user) = session.username() {
        info!(user = %user, "signed out");
    }
    session.sign_out();
    session.flash_success("You have been signed out.");
    redirect(session, "/")
}
