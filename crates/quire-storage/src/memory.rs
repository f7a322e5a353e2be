//! In-memory document store.
//!
//! Keeps every document in a `BTreeMap` behind a `RwLock`. Nothing survives
//! the process. Used by unit and integration tests, and selectable for
//! throwaway server instances.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{DocumentName, DocumentStore, StorageError};

/// An in-memory document store. Clones share the same documents.
///
/// # Examples
///
/// ```
/// # use quire_storage::{DocumentName, DocumentStore, MemoryStore};
/// # #[tokio::main]
/// # async fn main() {
/// let store = MemoryStore::new();
/// let name = DocumentName::parse("about.md").unwrap();
/// store.create(&name).await.unwrap();
/// store.write(&name, b"# About").await.unwrap();
/// assert_eq!(store.read(&name).await.unwrap(), b"# About".to_vec());
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let docs = self.docs.read().await;
        Ok(docs.keys().cloned().collect())
    }

    async fn read(&self, name: &DocumentName) -> Result<Vec<u8>, StorageError> {
        let docs = self.docs.read().await;
        docs.get(name.as_str())
            .cloned()
            .ok_or_else(|| StorageError::NotFound {
                name: name.to_string(),
            })
    }

    async fn create(&self, name: &DocumentName) -> Result<(), StorageError> {
        let mut docs = self.docs.write().await;
        if docs.contains_key(name.as_str()) {
            return Err(StorageError::AlreadyExists {
                name: name.to_string(),
            });
        }
        docs.insert(name.to_string(), Vec::new());
        Ok(())
    }

    async fn write(&self, name: &DocumentName, content: &[u8]) -> Result<(), StorageError> {
        let mut docs = self.docs.write().await;
        let slot = docs
            .get_mut(name.as_str())
            .ok_or_else(|| StorageError::NotFound {
                name: name.to_string(),
            })?;
        *slot = content.to_vec();
        Ok(())
    }

    async fn delete(&self, name: &DocumentName) -> Result<bool, StorageError> {
        let mut docs = self.docs.write().await;
        Ok(docs.remove(name.as_str()).is_some())
    }

    async fn exists(&self, name: &DocumentName) -> Result<bool, StorageError> {
        let docs = self.docs.read().await;
        Ok(docs.contains_key(name.as_str()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn name(raw: &str) -> DocumentName {
        DocumentName::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn read_nonexistent_is_not_found() {
        let store = MemoryStore::new();
        let result = store.read(&name("missing.md")).await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
    }

    #[tokio::test]
    async fn list_is_sorted() {
        let store = MemoryStore::new();
        store.create(&name("zeta.txt")).await.unwrap();
        store.create(&name("alpha.md")).await.unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["alpha.md", "zeta.txt"]);
    }

    #[tokio::test]
    async fn create_twice_is_already_exists() {
        let store = MemoryStore::new();
        store.create(&name("a.md")).await.unwrap();
        let result = store.create(&name("a.md")).await;
        assert!(matches!(result, Err(StorageError::AlreadyExists { .. })));
    }

    #[tokio::test]
    async fn write_same_content_twice_is_stable() {
        let store = MemoryStore::new();
        let doc = name("same.txt");
        store.create(&doc).await.unwrap();
        store.write(&doc, b"identical").await.unwrap();
        let first = store.read(&doc).await.unwrap();
        store.write(&doc, b"identical").await.unwrap();
        assert_eq!(store.read(&doc).await.unwrap(), first);
    }

    #[tokio::test]
    async fn write_missing_is_not_found() {
        let store = MemoryStore::new();
        let result = store.write(&name("nope.md"), b"x").await;
        assert!(matches!(result, Err(StorageError::NotFound { .. })));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn delete_reports_whether_removed() {
        let store = MemoryStore::new();
        store.create(&name("d.md")).await.unwrap();
        assert!(store.delete(&name("d.md")).await.unwrap());
        assert!(!store.delete(&name("d.md")).await.unwrap());
    }

    #[tokio::test]
    async fn clone_shares_state() {
        let store = MemoryStore::new();
        let clone = store.clone();
        store.create(&name("shared.md")).await.unwrap();
        assert!(clone.exists(&name("shared.md")).await.unwrap());
    }
}
