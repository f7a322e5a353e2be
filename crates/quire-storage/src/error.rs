//! Storage error types.
//!
//! Every variant carries the document name or path involved so a log line is
//! enough to diagnose the failure.

/// Errors that can occur during document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Failed to open or create the store root.
    #[error("failed to open document store at '{path}': {reason}")]
    Open { path: String, reason: String },

    /// The supplied name cannot address a document.
    #[error("invalid document name '{name}': {reason}")]
    InvalidName { name: String, reason: String },

    /// No document with this name exists.
    #[error("document '{name}' does not exist")]
    NotFound { name: String },

    /// A document with this name already exists.
    #[error("document '{name}' already exists")]
    AlreadyExists { name: String },

    /// A resolved path would land outside the store root.
    #[error("document '{name}' resolves outside the store root")]
    OutsideRoot { name: String },

    /// Failed to read a document.
    #[error("failed to read document '{name}': {reason}")]
    Read { name: String, reason: String },

    /// Failed to create or write a document.
    #[error("failed to write document '{name}': {reason}")]
    Write { name: String, reason: String },

    /// Failed to delete a document.
    #[error("failed to delete document '{name}': {reason}")]
    Delete { name: String, reason: String },

    /// Failed to enumerate documents.
    #[error("failed to list documents: {reason}")]
    List { reason: String },
}
