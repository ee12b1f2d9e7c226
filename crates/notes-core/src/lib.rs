//! notes-core: domain types for the notes API
//!
//! This crate provides:
//! - The `Note` entity and its typed identifiers
//! - Input schemas for creating (`NewNote`) and patching (`NoteChanges`) notes
//! - Field validation producing per-field violations
//! - The keyset pagination `Cursor`
//!
//! Nothing in here performs I/O; the store and server crates build on these
//! types.

pub mod cursor;
pub mod input;
pub mod types;

pub use cursor::{Cursor, CursorError};
pub use input::{FieldViolation, NewNote, NoteChanges, Validate, ValidationErrors};
pub use types::{Note, NoteId, UserId};

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Largest page a single listing request may return.
pub const MAX_PAGE_SIZE: u32 = 50;

/// Clamp a requested page size into `[1, MAX_PAGE_SIZE]`.
#[must_use]
pub fn clamp_page_size(limit: u32) -> u32 {
    limit.clamp(1, MAX_PAGE_SIZE)
}
