//! Credential validation against the users file.
//!
//! The users file is a JSON object mapping each username to an Argon2id hash
//! in PHC string format:
//!
//! ```json
//! { "admin": "$argon2id$v=19$m=19456,t=2,p=1$..." }
//! ```
//!
//! It is re-read on every authentication attempt so edits take effect
//! without a restart. Passwords are only ever compared through Argon2
//! verification.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use argon2::Argon2;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};

use crate::error::CredentialError;

/// Flash shown when a sign-in attempt fails.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials.";

/// A known user and their stored password hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserCredential {
    pub username: String,
    pub password_hash: String,
}

/// Hash a password with Argon2id and a fresh random salt.
///
/// # Errors
///
/// Returns [`CredentialError::Hash`] if Argon2 rejects the input.
pub fn hash_password(password: &str) -> Result<String, CredentialError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| CredentialError::Hash {
            reason: e.to_string(),
        })
}

/// Verify a password against a stored PHC hash. Malformed hashes never
/// verify.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Hash checked when the username is unknown, so a miss costs as much as a
/// wrong password.
static DUMMY_HASH: LazyLock<String> =
    LazyLock::new(|| hash_password("quire-dummy-password").unwrap_or_default());

/// True iff `known` has `username` and its hash verifies against `password`.
///
/// An unknown username still runs one Argon2 verification.
#[must_use]
pub fn validate(username: &str, password: &str, known: &[UserCredential]) -> bool {
    match known.iter().find(|user| user.username == username) {
        Some(user) => verify_password(password, &user.password_hash),
        None => {
            let _ = verify_password(password, &DUMMY_HASH);
            false
        }
    }
}

/// Handle on the JSON users file.
#[derive(Debug, Clone)]
pub struct UsersFile {
    path: PathBuf,
}

impl UsersFile {
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> Result<Option<BTreeMap<String, String>>, CredentialError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CredentialError::Read {
                    path: self.path.display().to_string(),
                    reason: e.to_string(),
                });
            }
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|e| CredentialError::Parse {
                path: self.path.display().to_string(),
                reason: e.to_string(),
            })
    }

    /// Load every known user. A missing file means there are none.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Read`] or [`CredentialError::Parse`] when
    /// the file exists but cannot be used.
    pub async fn load(&self) -> Result<Vec<UserCredential>, CredentialError> {
        let Some(map) = self.read_map().await? else {
            tracing::warn!(path = %self.path.display(), "users file not found, no one can sign in");
            return Ok(Vec::new());
        };

        Ok(map
            .into_iter()
            .map(|(username, password_hash)| UserCredential {
                username,
                password_hash,
            })
            .collect())
    }

    /// Load the users file and validate one sign-in attempt. Argon2
    /// verification runs on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// Returns an error if the users file cannot be loaded or the blocking
    /// task fails. A wrong username or password is `Ok(false)`.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<bool, CredentialError> {
        let known = self.load().await?;
        let username = username.to_owned();
        let password = password.to_owned();

        tokio::task::spawn_blocking(move || validate(&username, &password, &known))
            .await
            .map_err(|e| CredentialError::Task {
                reason: e.to_string(),
            })
    }

    /// Insert or replace a user's hash. Returns `true` if the user already
    /// existed.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidUsername`] for empty or
    /// whitespace-containing names, or a read/parse/write error.
    pub async fn upsert(
        &self,
        username: &str,
        password_hash: &str,
    ) -> Result<bool, CredentialError> {
        if username.is_empty() || username.chars().any(char::is_whitespace) {
            return Err(CredentialError::InvalidUsername {
                username: username.to_owned(),
            });
        }

        let mut map = self.read_map().await?.unwrap_or_default();
        let replaced = map
            .insert(username.to_owned(), password_hash.to_owned())
            .is_some();

        let write_err = |reason: String| CredentialError::Write {
            path: self.path.display().to_string(),
            reason,
        };

        let mut body = serde_json::to_string_pretty(&map).map_err(|e| write_err(e.to_string()))?;
        body.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| write_err(e.to_string()))?;
        }
        tokio::fs::write(&self.path, body)
            .await
            .map_err(|e| write_err(e.to_string()))?;

        tracing::info!(user = %username, replaced, "users file updated");
        Ok(replaced)
    }
}
