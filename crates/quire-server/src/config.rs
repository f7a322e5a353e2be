//! Server configuration for `Quire`.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `QUIRE_*` environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Default port when neither `QUIRE_BIND_ADDR` nor `PORT` is set.
const DEFAULT_PORT: u16 = 4567;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Document store backend.
    pub storage_backend: StorageBackendType,
    /// JSON file mapping usernames to password hashes.
    pub users_file: PathBuf,
    /// The administrative identity allowed past the auth gate.
    pub admin_username: String,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Idle lifetime of a session, in seconds.
    pub session_ttl_secs: u64,
    /// Seconds between sweeps of expired sessions.
    pub session_sweep_interval_secs: u64,
}

/// Supported document store backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackendType {
    /// In-memory (development only, documents lost on restart).
    Memory,
    /// One file per document under a directory.
    Filesystem { path: PathBuf },
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `QUIRE_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:4567`)
    /// - `PORT` — port to bind on, binds to `0.0.0.0`
    /// - `QUIRE_STORAGE` — `fs` or `memory` (default: `fs`)
    /// - `QUIRE_DATA_DIR` — document directory for `fs` (default: `./data`)
    /// - `QUIRE_USERS_FILE` — users file (default: `./users.json`)
    /// - `QUIRE_ADMIN_USER` — administrative username (default: `admin`)
    /// - `QUIRE_LOG_LEVEL` — log filter (default: `info`)
    /// - `QUIRE_SESSION_TTL` — session idle lifetime in seconds (default: `86400`)
    /// - `QUIRE_SESSION_SWEEP_INTERVAL` — seconds between session sweeps (default: `300`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    #[must_use]
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let default_addr = SocketAddr::from(([127, 0, 0, 1], DEFAULT_PORT));

        // Priority: QUIRE_BIND_ADDR > PORT > default
        let bind_addr = if let Some(addr) = var("QUIRE_BIND_ADDR") {
            addr.parse().unwrap_or(default_addr)
        } else if let Some(port) = var("PORT") {
            SocketAddr::from(([0, 0, 0, 0], port.parse().unwrap_or(DEFAULT_PORT)))
        } else {
            default_addr
        };

        let data_dir = var("QUIRE_DATA_DIR").unwrap_or_else(|| "./data".to_owned());

        let storage_backend = match var("QUIRE_STORAGE")
            .unwrap_or_else(|| "fs".to_owned())
            .to_lowercase()
            .as_str()
        {
            "memory" => StorageBackendType::Memory,
            _ => StorageBackendType::Filesystem {
                path: PathBuf::from(data_dir),
            },
        };

        let users_file =
            PathBuf::from(var("QUIRE_USERS_FILE").unwrap_or_else(|| "./users.json".to_owned()));

        let admin_username = var("QUIRE_ADMIN_USER")
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| "admin".to_owned());

        let log_level = var("QUIRE_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let session_ttl_secs = var("QUIRE_SESSION_TTL")
            .and_then(|v| v.parse().ok())
            .unwrap_or(86_400);

        let session_sweep_interval_secs = var("QUIRE_SESSION_SWEEP_INTERVAL")
            .and_then(|v| v.parse().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(300);

        Self {
            bind_addr,
            storage_backend,
            users_file,
            admin_username,
            log_level,
            session_ttl_secs,
            session_sweep_interval_secs,
        }
    }
}
