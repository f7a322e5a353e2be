//! HTTP error types for `Quire` server.
//!
//! Expected outcomes (missing documents, bad names, refused access) are
//! handled in the handlers as flash messages and redirects. [`AppError`]
//! covers everything else and renders a plain HTML failure page. Internal
//! details are logged, never shown.

use axum::extract::rejection::FormRejection;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use quire_core::error::CredentialError;
use quire_storage::StorageError;

use crate::views;

/// Application-level error returned from HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Client sent input that cannot be used.
    BadRequest(String),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Something went wrong. Please try again.".to_owned(),
                )
            }
        };

        (status, Html(views::error_page(status, &message))).into_response()
    }
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            // Handlers turn missing and taken names into flash messages;
            // anything that still gets here names something unusable.
            StorageError::NotFound { .. }
            | StorageError::AlreadyExists { .. }
            | StorageError::InvalidName { .. }
            | StorageError::OutsideRoot { .. } => Self::BadRequest(err.to_string()),
            StorageError::Open { .. }
            | StorageError::Read { .. }
            | StorageError::Write { .. }
            | StorageError::Delete { .. }
            | StorageError::List { .. } => Self::Internal(err.to_string()),
        }
    }
}

impl From<FormRejection> for AppError {
    fn from(rejection: FormRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl From<CredentialError> for AppError {
    fn from(err: CredentialError) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_errors_map_to_statuses() {
        let cases = [
            (
                StorageError::NotFound { name: "a".into() },
                StatusCode::BAD_REQUEST,
            ),
            (
                StorageError::OutsideRoot { name: "a".into() },
                StatusCode::BAD_REQUEST,
            ),
            (
                StorageError::AlreadyExists { name: "a".into() },
                StatusCode::BAD_REQUEST,
            ),
            (
                StorageError::Write {
                    name: "a".into(),
                    reason: "permission denied".into(),
                },
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(AppError::from(err).into_response().status(), status);
        }
    }
}
