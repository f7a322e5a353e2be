//! Auth gate for protected operations.
//!
//! Only the administrative user may read documents, mutate the store, or see
//! the new/edit forms. The gate runs before any of those and leaves an error
//! flash on the session when it refuses.

use crate::error::AuthError;
use crate::session::Session;

/// Flash shown when a protected operation is attempted without signing in.
pub const SIGN_IN_REQUIRED: &str = "You must be signed in to do that.";

/// Checks sessions against the single administrative identity.
#[derive(Debug, Clone)]
pub struct AuthGate {
    admin_username: String,
}

impl AuthGate {
    #[must_use]
    pub fn new(admin_username: impl Into<String>) -> Self {
        Self {
            admin_username: admin_username.into(),
        }
    }

    #[must_use]
    pub fn admin_username(&self) -> &str {
        &self.admin_username
    }

    /// Whether `session` is signed in as the administrative user. Pure.
    #[must_use]
    pub fn is_signed_in(&self, session: &Session) -> bool {
        session.username() == Some(self.admin_username.as_str())
    }

    /// Let the caller proceed only when signed in; otherwise record
    /// [`SIGN_IN_REQUIRED`] on the session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthenticated`] when the session is not signed
    /// in as the administrative user.
    pub fn require_signed_in(&self, session: &mut Session) -> Result<(), AuthError> {
        if self.is_signed_in(session) {
            return Ok(());
        }
        tracing::debug!(user = ?session.username(), "protected operation refused");
        session.flash_error(SIGN_IN_REQUIRED);
        Err(AuthError::Unauthenticated)
    }
}
