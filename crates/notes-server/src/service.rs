//! Business rules for notes: page-size limits, cursor decoding, ownership
//! checks and partial updates.
//!
//! Ownership is checked by reading the note first and comparing owners
//! before the mutating call. If the note disappears in between, the
//! mutating call's own "not found" answer is reported.

use std::sync::Arc;

use notes_core::{Cursor, NewNote, Note, NoteChanges, NoteId, UserId, clamp_page_size};
use notes_store::NoteRepository;
use serde::Serialize;

use crate::error::{ApiError, ApiResult};

/// One page of results plus what the client needs to fetch the next.
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub meta: PaginationMeta,
}

#[derive(Debug, PartialEq, Eq, Serialize)]
pub struct PaginationMeta {
    /// Cursor to pass back for the next page, if any.
    pub next_cursor: Option<String>,
    /// Whether the page came back full.
    pub has_next: bool,
}

/// Wrap a page of notes fetched with `limit`.
///
/// A full page is assumed to have a successor. When the total is an exact
/// multiple of `limit` the last page therefore reports `has_next` and the
/// following request returns an empty page.
pub fn paginate(notes: Vec<Note>, limit: u32) -> PaginatedResponse<Note> {
    let has_next = notes.len() == limit as usize;
    let next_cursor = match notes.last() {
        Some(last) if has_next => Some(Cursor::after(last).to_string()),
        _ => None,
    };

    PaginatedResponse {
        data: notes,
        meta: PaginationMeta {
            next_cursor,
            has_next,
        },
    }
}

/// Decode a client cursor. Malformed cursors restart from the first page.
fn decode_cursor(raw: Option<&str>) -> Option<Cursor> {
    let raw = raw?;
    match raw.parse::<Cursor>() {
        Ok(cursor) => Some(cursor),
        Err(e) => {
            tracing::debug!(cursor = %raw, error = %e, "Ignoring malformed cursor");
            None
        }
    }
}

/// Notes operations on behalf of a caller.
#[derive(Clone)]
pub struct NoteService {
    repository: Arc<dyn NoteRepository>,
}

impl NoteService {
    pub fn new(repository: Arc<dyn NoteRepository>) -> Self {
        Self { repository }
    }

    /// Public notes, newest first, optionally for one subject.
    pub async fn list_public_notes(
        &self,
        subject: Option<&str>,
        cursor: Option<&str>,
        limit: u32,
    ) -> ApiResult<PaginatedResponse<Note>> {
        let limit = clamp_page_size(limit);
        let cursor = decode_cursor(cursor);

        let notes = self
            .repository
            .list_public(subject, cursor.as_ref(), limit)
            .await?;

        Ok(paginate(notes, limit))
    }

    /// The caller's own notes, private ones included.
    pub async fn list_owner_notes(
        &self,
        user: UserId,
        cursor: Option<&str>,
        limit: u32,
    ) -> ApiResult<PaginatedResponse<Note>> {
        let limit = clamp_page_size(limit);
        let cursor = decode_cursor(cursor);

        let notes = self
            .repository
            .list_by_owner(user, cursor.as_ref(), limit)
            .await?;

        Ok(paginate(notes, limit))
    }

    pub async fn get_note(&self, id: NoteId) -> ApiResult<Note> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))
    }

    /// Create a note owned by `user`. `note` must already be validated.
    pub async fn create_note(&self, user: UserId, note: NewNote) -> ApiResult<Note> {
        let created = self.repository.create(user, &note).await?;
        tracing::info!(note_id = %created.id, owner = %user, "Note created");
        Ok(created)
    }

    /// Apply `changes` to a note owned by `user`.
    ///
    /// An empty change set returns the note as stored without writing.
    pub async fn update_note(
        &self,
        user: UserId,
        id: NoteId,
        changes: NoteChanges,
    ) -> ApiResult<Note> {
        let note = self.owned_note(user, id, "update").await?;

        if changes.is_empty() {
            return Ok(note);
        }

        let updated = self
            .repository
            .update(id, &changes)
            .await?
            .ok_or_else(|| ApiError::NotFound("Note not found".to_string()))?;

        tracing::info!(
            note_id = %id,
            fields = ?changes.field_names(),
            "Note updated"
        );
        Ok(updated)
    }

    /// Permanently delete a note owned by `user`.
    pub async fn delete_note(&self, user: UserId, id: NoteId) -> ApiResult<()> {
        self.owned_note(user, id, "delete").await?;

        if !self.repository.delete(id).await? {
            return Err(ApiError::NotFound("Note not found".to_string()));
        }

        tracing::info!(note_id = %id, owner = %user, "Note deleted");
        Ok(())
    }

    async fn owned_note(&self, user: UserId, id: NoteId, action: &str) -> ApiResult<Note> {
        let note = self.get_note(id).await?;
        if !note.is_owned_by(user) {
            tracing::warn!(note_id = %id, user = %user, action, "Ownership check failed");
            return Err(ApiError::Forbidden(format!(
                "Not authorized to {} this note",
                action
            )));
        }
        Ok(note)
    }
}

impl std::fmt::Debug for NoteService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteService").finish_non_exhaustive()
    }
}
