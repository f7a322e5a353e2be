//! Core library for `Quire`.
//!
//! Contains the document renderer, the auth gate guarding protected
//! operations, credential validation against the users file, and the
//! per-client session model with its server-side table. This crate depends on
//! `quire-storage` for validated document names and knows nothing about HTTP.

pub mod auth;
pub mod credentials;
pub mod error;
pub mod render;
pub mod session;
