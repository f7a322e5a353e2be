//! Document routes: `/`, `/new`, `/{filename}`, `/{filename}/edit`,
//! `/{filename}/delete`.
//!
//! Everything except the index is behind the auth gate. Missing documents,
//! bad names and unsupported types come back as a flash message plus a
//! redirect, never as an error status.

use std::sync::Arc;

use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, Response};
use axum::routing::{get, post};
use axum::{Extension, Form, Router};
use serde::Deserialize;
use tracing::info;

use quire_core::render::DocumentKind;
use quire_core::session::Session;
use quire_storage::{DocumentName, StorageError};

use super::{redirect, render_page, reply};
use crate::error::AppError;
use crate::state::AppState;
use crate::views;

/// Build the document router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(index))
        .route("/new", get(new_form).post(create))
        .route("/{filename}", get(show))
        .route("/{filename}/edit", get(edit_form).post(update))
        .route("/{filename}/delete", post(delete))
}

// ── Request types ────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct NewDocumentForm {
    #[serde(default)]
    pub new_document: String,
}

#[derive(Debug, Deserialize)]
pub struct EditDocumentForm {
    #[serde(default)]
    pub new_contents: String,
}

fn does_not_exist(filename: &str) -> String {
    format!("{filename} does not exist.")
}

// ── Handlers ─────────────────────────────────────────────────────────

/// List documents. Names are only shown to a signed-in viewer.
async fn index(
    State(state): State<Arc<AppState>>,
    Extension(mut session): Extension<Session>,
) -> Result<Response, AppError> {
    let names = if state.gate.is_signed_in(&session) {
        Some(state.store.list().await?)
    } else {
        None
    };

    let page = render_page(&state, &mut session, "Documents", &views::index(names.as_deref()));
    Ok(reply(session, Html(page)))
}

/// Show the empty new-document form.
async fn new_form(
    State(state): State<Arc<AppState>>,
    Extension(mut session): Extension<Session>,
) -> Response {
    if state.gate.require_signed_in(&mut session).is_err() {
        return redirect(session, "/");
    }

    let page = render_page(&state, &mut session, "New Document", &views::new_document());
    reply(session, Html(page))
}

/// Create an empty document.
///
/// The body is parsed only after the gate, so a signed-out client always
/// gets the sign-in error rather than a form rejection.
async fn create(
    State(state): State<Arc<AppState>>,
    Extension(mut session): Extension<Session>,
    form: Result<Form<NewDocumentForm>, FormRejection>,
) -> Result<Response, AppError> {
    if state.gate.require_signed_in(&mut session).is_err() {
        return Ok(redirect(session, "/"));
    }
    let Form(form) = form?;

    let raw = form.new_document.trim();
    if raw.is_empty() {
        session.flash_error("A name is required.");
        return Ok(redirect(session, "/new"));
    }

    let Ok(name) = DocumentName::parse(raw) else {
        session.flash_error(format!("{raw} is not a valid document name."));
        return Ok(redirect(session, "/new"));
    };

    match state.store.create(&name).await {
        Ok(()) => {
            info!(name = %name, "document created");
            session.flash_success(format!("{name} was created."));
            Ok(redirect(session, "/"))
        }
        Err(StorageError::AlreadyExists { .. }) => {
            session.flash_error(format!("{name} already exists."));
            Ok(redirect(session, "/new"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Serve a document: markdown as an HTML page, plain text verbatim.
async fn show(
    State(state): State<Arc<AppState>>,
    Extension(mut session): Extension<Session>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    if state.gate.require_signed_in(&mut session).is_err() {
        return Ok(redirect(session, "/"));
    }

    let Ok(name) = DocumentName::parse(&filename) else {
        session.flash_error(does_not_exist(&filename));
        return Ok(redirect(session, "/"));
    };

    let content = match state.store.read(&name).await {
        Ok(content) => content,
        Err(StorageError::NotFound { .. }) => {
            session.flash_error(does_not_exist(&filename));
            return Ok(redirect(session, "/"));
        }
        Err(e) => return Err(e.into()),
    };

    let kind = DocumentKind::for_name(&name);
    let Ok(rendered) = kind.render(&content) else {
        session.flash_error(format!("{name} cannot be displayed."));
        return Ok(redirect(session, "/"));
    };

    if kind == DocumentKind::Markdown {
        let body = String::from_utf8_lossy(&rendered.body);
        let page = render_page(&state, &mut session, name.as_str(), &body);
        return Ok(reply(
            session,
            ([(header::CONTENT_TYPE, rendered.content_type)], page),
        ));
    }

    Ok(reply(
        session,
        ([(header::CONTENT_TYPE, rendered.content_type)], rendered.body),
    ))
}

/// Show the edit form with the document's current content.
async fn edit_form(
    State(state): State<Arc<AppState>>,
    Extension(mut session): Extension<Session>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    if state.gate.require_signed_in(&mut session).is_err() {
        return Ok(redirect(session, "/"));
    }

    let Ok(name) = DocumentName::parse(&filename) else {
        session.flash_error(does_not_exist(&filename));
        return Ok(redirect(session, "/"));
    };

    let content = match state.store.read(&name).await {
        Ok(content) => content,
        Err(StorageError::NotFound { .. }) => {
            session.flash_error(does_not_exist(&filename));
            return Ok(redirect(session, "/"));
        }
        Err(e) => return Err(e.into()),
    };

    let body = views::edit_document(name.as_str(), &String::from_utf8_lossy(&content));
    let page = render_page(&state, &mut session, name.as_str(), &body);
    Ok(reply(session, Html(page)))
}

/// Replace a document's content.
async fn update(
    State(state): State<Arc<AppState>>,
    Extension(mut session): Extension<Session>,
    Path(filename): Path<String>,
    form: Result<Form<EditDocumentForm>, FormRejection>,
) -> Result<Response, AppError> {
    if state.gate.require_signed_in(&mut session).is_err() {
        return Ok(redirect(session, "/"));
    }
    let Form(form) = form?;

    let Ok(name) = DocumentName::parse(&filename) else {
        session.flash_error(does_not_exist(&filename));
        return Ok(redirect(session, "/"));
    };

    match state.store.write(&name, form.new_contents.as_bytes()).await {
        Ok(()) => {
            info!(name = %name, bytes = form.new_contents.len(), "document updated");
            session.flash_success(format!("{name} has been updated."));
            Ok(redirect(session, "/"))
        }
        Err(StorageError::NotFound { .. }) => {
            session.flash_error(does_not_exist(&filename));
            Ok(redirect(session, "/"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Delete a document. Deleting a missing document silently does nothing.
async fn delete(
    State(state): State<Arc<AppState>>,
    Extension(mut session): Extension<Session>,
    Path(filename): Path<String>,
) -> Result<Response, AppError> {
    if state.gate.require_signed_in(&mut session).is_err() {
        return Ok(redirect(session, "/"));
    }

    let Ok(name) = DocumentName::parse(&filename) else {
        return Ok(redirect(session, "/"));
    };

    if state.store.delete(&name).await? {
        info!(name = %name, "document deleted");
        session.flash_success(format!("{name} was deleted."));
    }
    Ok(redirect(session, "/"))
}
