//! Filesystem document store, the production default.
//!
//! Each document is one regular file directly under the store root. The root
//! is canonicalized when the store is opened and every resolved path is
//! checked to sit directly inside it. Symlinks and subdirectories are not
//! documents: they are neither listed nor readable.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;

use crate::{DocumentName, DocumentStore, StorageError};

/// A document store backed by a directory on disk.
///
/// # Examples
///
/// ```no_run
/// # use quire_storage::FsStore;
/// # #[tokio::main]
/// # async fn main() {
/// let store = FsStore::open("./data").await.unwrap();
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    /// Open a store rooted at `path`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::Open`] if the directory cannot be created or
    /// canonicalized.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let open_err = |e: std::io::Error| StorageError::Open {
            path: path.display().to_string(),
            reason: e.to_string(),
        };

        fs::create_dir_all(path).await.map_err(open_err)?;
        let root = fs::canonicalize(path).await.map_err(open_err)?;

        tracing::debug!(root = %root.display(), "document store opened");
        Ok(Self { root })
    }

    /// The canonical root directory of this store.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `name` onto the root and verify the result stays inside it.
    fn resolve(&self, name: &DocumentName) -> Result<PathBuf, StorageError> {
        let path = self.root.join(name.as_str());
        if path.parent() != Some(self.root.as_path()) {
            tracing::warn!(name = %name, "rejected document path outside store root");
            return Err(StorageError::OutsideRoot {
                name: name.to_string(),
            });
        }
        Ok(path)
    }

    /// Whether `path` is a regular file (not following symlinks).
    async fn is_regular_file(path: &Path, name: &DocumentName) -> Result<bool, StorageError> {
        match fs::symlink_metadata(path).await {
            Ok(meta) => Ok(meta.file_type().is_file()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Read {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for FsStore {
    async fn list(&self) -> Result<Vec<String>, StorageError> {
        let list_err = |e: std::io::Error| StorageError::List {
            reason: e.to_string(),
        };

        let mut entries = fs::read_dir(&self.root).await.map_err(list_err)?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(list_err)? {
            let file_type = entry.file_type().await.map_err(list_err)?;
            if !file_type.is_file() {
                continue;
            }
            match entry.file_name().into_string() {
                // Only list names that can be opened again by name.
                Ok(name) if DocumentName::parse(&name).is_ok_and(|d| d.as_str() == name) => {
                    names.push(name);
                }
                Ok(name) => {
                    tracing::debug!(name = ?name, "skipping file with unusable document name");
                }
                Err(raw) => {
                    tracing::debug!(name = ?raw, "skipping document with non-UTF-8 name");
                }
            }
        }
        names.sort();
        Ok(names)
    }

    async fn read(&self, name: &DocumentName) -> Result<Vec<u8>, StorageError> {
        let path = self.resolve(name)?;
        if !Self::is_regular_file(&path, name).await? {
            return Err(StorageError::NotFound {
                name: name.to_string(),
            });
        }

        fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => StorageError::NotFound {
                name: name.to_string(),
            },
            _ => StorageError::Read {
                name: name.to_string(),
                reason: e.to_string(),
            },
        })
    }

    async fn create(&self, name: &DocumentName) -> Result<(), StorageError> {
        let path = self.resolve(name)?;
        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::AlreadyExists => StorageError::AlreadyExists {
                    name: name.to_string(),
                },
                _ => StorageError::Write {
                    name: name.to_string(),
                    reason: e.to_string(),
                },
            })?;
        Ok(())
    }

    async fn write(&self, name: &DocumentName, content: &[u8]) -> Result<(), StorageError> {
        let path = self.resolve(name)?;
        if !Self::is_regular_file(&path, name).await? {
            return Err(StorageError::NotFound {
                name: name.to_string(),
            });
        }

        let write_err = |e: std::io::Error| StorageError::Write {
            name: name.to_string(),
            reason: e.to_string(),
        };

        // No `create`: a document removed since the check stays removed.
        let mut file = OpenOptions::new()
            .write(true)
            .truncate(true)
            .open(&path)
            .await
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => StorageError::NotFound {
                    name: name.to_string(),
                },
                _ => write_err(e),
            })?;
        file.write_all(content).await.map_err(write_err)?;
        file.flush().await.map_err(write_err)?;
        Ok(())
    }

    async fn delete(&self, name: &DocumentName) -> Result<bool, StorageError> {
        let path = self.resolve(name)?;
        if !Self::is_regular_file(&path, name).await? {
            return Ok(false);
        }

        match fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(StorageError::Delete {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn exists(&self, name: &DocumentName) -> Result<bool, StorageError> {
        let path = self.resolve(name)?;
        Self::is_regular_file(&path, name).await
    }
}
