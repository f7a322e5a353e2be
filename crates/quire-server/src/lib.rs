//! `Quire` HTTP server.
//!
//! Wires the document store, auth gate, credential validation and session
//! table into an Axum router serving HTML pages and document bodies.

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod views;
