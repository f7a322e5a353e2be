//! Error types for `quire-core`.
//!
//! Credential errors never include passwords or hashes, only the path or
//! username involved.

/// Errors from rendering a document.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The document's extension has no rendering rule.
    #[error("unsupported document type '{extension}'")]
    UnsupportedType { extension: String },
}

/// Errors from the auth gate.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The session is not signed in as the administrative user.
    #[error("session is not signed in")]
    Unauthenticated,
}

/// Errors from loading or updating the users file.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    /// The users file could not be read.
    #[error("failed to read users file '{path}': {reason}")]
    Read { path: String, reason: String },

    /// The users file could not be written.
    #[error("failed to write users file '{path}': {reason}")]
    Write { path: String, reason: String },

    /// The users file is not a JSON object of username to hash.
    #[error("failed to parse users file '{path}': {reason}")]
    Parse { path: String, reason: String },

    /// Hashing a password failed.
    #[error("password hashing failed: {reason}")]
    Hash { reason: String },

    /// A username is empty or contains whitespace.
    #[error("invalid username '{username}'")]
    InvalidUsername { username: String },

    /// The blocking verification task did not complete.
    #[error("credential verification task failed: {reason}")]
    Task { reason: String },
}
