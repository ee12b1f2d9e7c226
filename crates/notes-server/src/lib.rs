//! notes-server: HTTP API for sharing study notes.
//!
//! This crate provides:
//! - REST endpoints for listing, reading and editing notes
//! - Bearer token verification against the identity provider's JWKS
//! - Ownership checks and cursor pagination
//!
//! # Architecture
//!
//! Handlers extract and validate input, then call [`service::NoteService`],
//! which talks to a [`notes_store::NoteRepository`]. The middleware stack
//! adds request ids, request tracing and CORS. Every error leaves as a JSON
//! envelope (see [`error::ApiError`]).
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use notes_server::{AppState, ServerConfig, app::build_app, auth::TokenVerifier};
//! use notes_store::MemoryNoteRepository;
//!
//! let config = ServerConfig::from_env()?;
//! let state = AppState::new(
//!     Arc::new(MemoryNoteRepository::new()),
//!     TokenVerifier::new(&config.auth),
//! );
//! let app = build_app(state, &config);
//! ```

pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod routes;
pub mod service;
pub mod state;

#[cfg(test)]
mod test_support;

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use error::{ApiError, ApiResult};
pub use service::NoteService;
pub use state::AppState;

// Re-export dependent crates
pub use notes_core;
pub use notes_store;
