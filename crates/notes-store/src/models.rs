//! Database row types.

use chrono::{DateTime, Utc};
use notes_core::{Note, NoteId, UserId};
use sqlx::FromRow;
use uuid::Uuid;

/// Column list shared by every query that returns whole notes.
pub(crate) const NOTE_COLUMNS: &str = "id, user_id, title, description, college, stream, \
     branch, semester, subject, file_url, is_public, created_at, updated_at";

/// Database row for the `notes` table.
#[derive(Debug, Clone, FromRow)]
pub struct NoteRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub college: String,
    pub stream: String,
    pub branch: String,
    pub semester: i32,
    pub subject: String,
    pub file_url: String,
    pub is_public: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NoteRow> for Note {
    fn from(row: NoteRow) -> Self {
        Self {
            id: NoteId::from_uuid(row.id),
            owner: UserId::from_uuid(row.user_id),
            title: row.title,
            description: row.description,
            college: row.college,
            stream: row.stream,
            branch: row.branch,
            semester: row.semester,
            subject: row.subject,
            file_url: row.file_url,
            is_public: row.is_public,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
