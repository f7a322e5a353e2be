//! Per-client session state.
//!
//! A [`Session`] is a plain value: the HTTP layer loads it at the start of a
//! request, handlers mutate it, and the HTTP layer saves it back. The
//! [`SessionStore`] keeps sessions server-side, keyed by an opaque random id,
//! and forgets them after an idle TTL.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

/// Whether a flash message reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

/// A one-shot status message shown on the next rendered page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

/// Authentication and flash state for one client.
///
/// Holds at most one username and at most one pending flash message; setting
/// a new flash replaces any pending one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    username: Option<String>,
    flash: Option<Flash>,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The signed-in username, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn sign_in(&mut self, username: impl Into<String>) {
        self.username = Some(username.into());
    }

    pub fn sign_out(&mut self) {
        self.username = None;
    }

    pub fn flash_success(&mut self, message: impl Into<String>) {
        self.flash = Some(Flash {
            kind: FlashKind::Success,
            message: message.into(),
        });
    }

    pub fn flash_error(&mut self, message: impl Into<String>) {
        self.flash = Some(Flash {
            kind: FlashKind::Error,
            message: message.into(),
        });
    }

    /// The pending flash, without consuming it.
    #[must_use]
    pub fn flash(&self) -> Option<&Flash> {
        self.flash.as_ref()
    }

    /// Remove and return the pending flash. Called by whatever renders it.
    pub fn take_flash(&mut self) -> Option<Flash> {
        self.flash.take()
    }

    /// True when the session carries nothing worth persisting.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.flash.is_none()
    }
}

#[derive(Debug)]
struct SessionRecord {
    session: Session,
    expires_at: DateTime<Utc>,
}

/// Server-side session table with idle expiry.
///
/// The lock is held only for a single lookup or update, never across a
/// request.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    records: RwLock<HashMap<String, SessionRecord>>,
}

impl SessionStore {
    /// Create a store whose sessions expire after `ttl_secs` without use.
    #[must_use]
    pub fn new(ttl_secs: u64) -> Self {
        let ttl = i64::try_from(ttl_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            ttl,
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Generate a fresh, unguessable session id.
    #[must_use]
    pub fn generate_id() -> String {
        uuid::Uuid::new_v4().simple().to_string()
    }

    /// Load the session for `id`. Unknown or expired ids yield `None`;
    /// expired records are dropped.
    pub async fn load(&self, id: &str) -> Option<Session> {
        let now = Utc::now();
        {
            let records = self.records.read().await;
            match records.get(id) {
                None => return None,
                Some(record) if record.expires_at > now => return Some(record.session.clone()),
                Some(_) => {}
            }
        }

        let mut records = self.records.write().await;
        if records.get(id).is_some_and(|r| r.expires_at <= now) {
            records.remove(id);
            tracing::debug!("dropped expired session");
        }
        None
    }

    /// Persist `session` under `id` and refresh its expiry. An empty session
    /// is removed instead of stored.
    pub async fn save(&self, id: &str, session: Session) {
        let mut records = self.records.write().await;
        if session.is_empty() {
            records.remove(id);
            return;
        }
        let expires_at = Utc::now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        records.insert(
            id.to_owned(),
            SessionRecord {
                session,
                expires_at,
            },
        );
    }

    /// Forget the session for `id`.
    pub async fn remove(&self, id: &str) {
        self.records.write().await.remove(id);
    }

    /// Drop every expired session and return how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Utc::now();
        let mut records = self.records.write().await;
        let before = records.len();
        records.retain(|_, r| r.expires_at > now);
        before - records.len()
    }

    /// Number of stored sessions, expired ones included until purged.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
