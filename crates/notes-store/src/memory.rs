//! In-process notes repository.
//!
//! Behaves like the PostgreSQL repository (same ordering, same cursor
//! bound, store-assigned ids and timestamps) without a database. Used by
//! the server's tests and for running the API locally.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Duration, SubsecRound, Utc};
use notes_core::{Cursor, NewNote, Note, NoteChanges, NoteId, UserId};
use tokio::sync::RwLock;

use crate::error::StoreResult;
use crate::repository::NoteRepository;

/// Notes held in a map guarded by an async lock.
#[derive(Debug, Default)]
pub struct MemoryNoteRepository {
    notes: RwLock<HashMap<NoteId, Note>>,
    /// Number of mutating calls that reached the store.
    writes: AtomicU64,
}

impl MemoryNoteRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many create/update/delete calls have been made.
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::SeqCst)
    }

    async fn list_where<F>(&self, keep: F, cursor: Option<&Cursor>, limit: u32) -> Vec<Note>
    where
        F: Fn(&Note) -> bool,
    {
        let notes = self.notes.read().await;
        let mut page: Vec<Note> = notes
            .values()
            .filter(|n| keep(*n))
            .filter(|n| cursor.is_none_or(|c| n.created_at < c.created_at))
            .cloned()
            .collect();

        page.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        });
        page.truncate(limit as usize);
        page
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::SeqCst);
    }
}

/// Current time at the store's microsecond precision.
fn now_micros() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// A timestamp strictly after `previous`, mirroring `now()` moving forward.
fn later_than(previous: DateTime<Utc>) -> DateTime<Utc> {
    let now = now_micros();
    if now > previous {
        now
    } else {
        previous + Duration::microseconds(1)
    }
}

#[async_trait]
impl NoteRepository for MemoryNoteRepository {
    async fn list_public(
        &self,
        subject: Option<&str>,
        cursor: Option<&Cursor>,
        limit: u32,
    ) -> StoreResult<Vec<Note>> {
        Ok(self
            .list_where(
                |n| n.is_public && subject.is_none_or(|s| n.subject == s),
                cursor,
                limit,
            )
            .await)
    }

    async fn list_by_owner(
        &self,
        owner: UserId,
        cursor: Option<&Cursor>,
        limit: u32,
    ) -> StoreResult<Vec<Note>> {
        Ok(self.list_where(|n| n.owner == owner, cursor, limit).await)
    }

    async fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>> {
        Ok(self.notes.read().await.get(&id).cloned())
    }

    async fn create(&self, owner: UserId, note: &NewNote) -> StoreResult<Note> {
        self.record_write();
        let mut notes = self.notes.write().await;

        // Keep creation times unique so keyset pages never tie.
        let newest = notes.values().map(|n| n.created_at).max();
        let now = match newest {
            Some(newest) => later_than(newest),
            None => now_micros(),
        };

        let created = Note {
            id: NoteId::new(),
            owner,
            title: note.title.clone(),
            description: note.description.clone(),
            college: note.college.clone(),
            stream: note.stream.clone(),
            branch: note.branch.clone(),
            semester: note.semester,
            subject: note.subject.clone(),
            file_url: note.file_url.clone(),
            is_public: note.is_public,
            created_at: now,
            updated_at: now,
        };
        notes.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(&self, id: NoteId, changes: &NoteChanges) -> StoreResult<Option<Note>> {
        self.record_write();
        let mut notes = self.notes.write().await;
        let Some(note) = notes.get_mut(&id) else {
            return Ok(None);
        };

        if let Some(title) = &changes.title {
            note.title = title.clone();
        }
        if let Some(description) = &changes.description {
            note.description = description.clone();
        }
        if let Some(college) = &changes.college {
            note.college = college.clone();
        }
        if let Some(stream) = &changes.stream {
            note.stream = stream.clone();
        }
        if let Some(branch) = &changes.branch {
            note.branch = branch.clone();
        }
        if let Some(semester) = changes.semester {
            note.semester = semester;
        }
        if let Some(subject) = &changes.subject {
            note.subject = subject.clone();
        }
        if let Some(file_url) = &changes.file_url {
            note.file_url = file_url.clone();
        }
        if let Some(is_public) = changes.is_public {
            note.is_public = is_public;
        }
        note.updated_at = later_than(note.updated_at);

        Ok(Some(note.clone()))
    }

    async fn delete(&self, id: NoteId) -> StoreResult<bool> {
        self.record_write();
        Ok(self.notes.write().await.remove(&id).is_some())
    }
}
