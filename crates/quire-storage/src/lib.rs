//! Document storage for `Quire`.
//!
//! This crate defines the [`DocumentStore`] trait: a flat collection of
//! named documents whose content is an opaque byte sequence. It knows nothing
//! about rendering, sessions, or HTTP. Every operation takes a
//! [`DocumentName`], so a name that could escape the store never reaches a
//! backend.
//!
//! Two implementations are provided:
//!
//! - [`FsStore`] — production default, one regular file per document under a
//!   root directory
//! - [`MemoryStore`] — in-memory, for tests and throwaway instances

mod error;
mod fs_backend;
mod memory;
mod name;

pub use error::StorageError;
pub use fs_backend::FsStore;
pub use memory::MemoryStore;
pub use name::DocumentName;

/// A pluggable document store.
///
/// Documents are addressed by name only; there is no hierarchy. Writes
/// replace content wholesale and there is no locking between writers, so two
/// concurrent writes to one document resolve as last-writer-wins.
///
/// Implementations must be safe to share across async tasks (`Send + Sync`).
#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// List the names of all documents, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::List`] if the backend cannot be enumerated.
    async fn list(&self) -> Result<Vec<String>, StorageError>;

    /// Read the full content of a document.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if no such document exists, or
    /// [`StorageError::Read`] if the backend fails.
    async fn read(&self, name: &DocumentName) -> Result<Vec<u8>, StorageError>;

    /// Create a new, empty document.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::AlreadyExists`] if the name is taken, or
    /// [`StorageError::Write`] if the backend fails.
    async fn create(&self, name: &DocumentName) -> Result<(), StorageError>;

    /// Replace the content of an existing document.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if the document does not exist, or
    /// [`StorageError::Write`] if the backend fails.
    async fn write(&self, name: &DocumentName, content: &[u8]) -> Result<(), StorageError>;

    /// Delete a document. Deleting a missing document is not an error.
    ///
    /// Returns `true` if a document was removed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Delete`] if the backend fails.
    async fn delete(&self, name: &DocumentName) -> Result<bool, StorageError>;

    /// Check whether a document exists.
    ///
    /// The default implementation calls [`read`](DocumentStore::read) and
    /// maps `NotFound` to `false`. Backends may override this with a cheaper
    /// check.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Read`] if the backend fails.
    async fn exists(&self, name: &DocumentName) -> Result<bool, StorageError> {
        match self.read(name).await {
            Ok(_) => Ok(true),
            Err(StorageError::NotFound { .. }) => Ok(false),
            Err(e) => Err(e),
        }
    }
}
