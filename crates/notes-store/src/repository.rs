//! The repository seam between the service layer and the store.

use async_trait::async_trait;
use notes_core::{Cursor, NewNote, Note, NoteChanges, NoteId, UserId};

use crate::error::StoreResult;

/// Translates note operations into store queries.
///
/// Listing methods return notes newest first (`created_at` descending),
/// strictly older than `cursor.created_at` when a cursor is given, and at
/// most `limit` rows. Implementations apply no business rules.
#[async_trait]
pub trait NoteRepository: Send + Sync {
    /// Public notes, optionally restricted to one subject.
    async fn list_public(
        &self,
        subject: Option<&str>,
        cursor: Option<&Cursor>,
        limit: u32,
    ) -> StoreResult<Vec<Note>>;

    /// Every note owned by `owner`, public or not.
    async fn list_by_owner(
        &self,
        owner: UserId,
        cursor: Option<&Cursor>,
        limit: u32,
    ) -> StoreResult<Vec<Note>>;

    async fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>>;

    /// Insert a note owned by `owner`; the store assigns id and timestamps.
    async fn create(&self, owner: UserId, note: &NewNote) -> StoreResult<Note>;

    /// Apply the provided fields and bump `updated_at`.
    ///
    /// Returns `None` when no row with `id` exists.
    async fn update(&self, id: NoteId, changes: &NoteChanges) -> StoreResult<Option<Note>>;

    /// Remove a note permanently. Returns whether a row was removed.
    async fn delete(&self, id: NoteId) -> StoreResult<bool>;
}
