//! notes-store: storage layer for the notes API
//!
//! This crate provides:
//! - The `NoteRepository` trait the service layer talks to
//! - `PgNoteRepository`, a PostgreSQL implementation via sqlx
//! - `MemoryNoteRepository`, an in-process implementation for tests and
//!   local development
//! - Connection pool configuration and the embedded `notes` schema
//!
//! The repository only translates calls into queries. Ownership checks,
//! page-size limits and cursor decoding belong to the caller.
//!
//! # Usage
//!
//! ```rust,ignore
//! use notes_store::{PgNoteRepository, StoreConfig};
//!
//! let config = StoreConfig::from_env()?;
//! let repo = PgNoteRepository::connect(config).await?;
//!
//! let page = repo.list_public(Some("Physics"), None, 10).await?;
//! ```

pub mod error;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod schema;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use memory::MemoryNoteRepository;
pub use postgres::PgNoteRepository;
pub use repository::NoteRepository;
pub use store::StoreConfig;

// Re-export notes-core for downstream crates
pub use notes_core;
