//! PostgreSQL implementation of the notes repository.

use async_trait::async_trait;
use notes_core::{Cursor, NewNote, Note, NoteChanges, NoteId, UserId};
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::StoreResult;
use crate::models::{NOTE_COLUMNS, NoteRow};
use crate::repository::NoteRepository;
use crate::store::StoreConfig;

/// Notes repository over a shared connection pool.
///
/// Cloning is cheap; clones share the pool.
#[derive(Debug, Clone)]
pub struct PgNoteRepository {
    pool: PgPool,
}

impl PgNoteRepository {
    /// Create a repository from an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool from `config` and wrap it.
    pub async fn connect(config: StoreConfig) -> StoreResult<Self> {
        Ok(Self::new(config.connect().await?))
    }
}

#[async_trait]
impl NoteRepository for PgNoteRepository {
    async fn list_public(
        &self,
        subject: Option<&str>,
        cursor: Option<&Cursor>,
        limit: u32,
    ) -> StoreResult<Vec<Note>> {
        let sql = format!(
            r#"
            SELECT {NOTE_COLUMNS}
            FROM notes
            WHERE is_public = TRUE
              AND ($1::text IS NULL OR subject = $1)
              AND ($2::timestamptz IS NULL OR created_at < $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#
        );

        let rows = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(subject)
            .bind(cursor.map(|c| c.created_at))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn list_by_owner(
        &self,
        owner: UserId,
        cursor: Option<&Cursor>,
        limit: u32,
    ) -> StoreResult<Vec<Note>> {
        let sql = format!(
            r#"
            SELECT {NOTE_COLUMNS}
            FROM notes
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR created_at < $2)
            ORDER BY created_at DESC, id DESC
            LIMIT $3
            "#
        );

        let rows = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(owner.0)
            .bind(cursor.map(|c| c.created_at))
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Note::from).collect())
    }

    async fn get_by_id(&self, id: NoteId) -> StoreResult<Option<Note>> {
        let sql = format!("SELECT {NOTE_COLUMNS} FROM notes WHERE id = $1");

        let row = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Note::from))
    }

    async fn create(&self, owner: UserId, note: &NewNote) -> StoreResult<Note> {
        let sql = format!(
            r#"
            INSERT INTO notes (
                user_id, title, description, college, stream,
                branch, semester, subject, file_url, is_public
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING {NOTE_COLUMNS}
            "#
        );

        let row = sqlx::query_as::<_, NoteRow>(&sql)
            .bind(owner.0)
            .bind(&note.title)
            .bind(note.description.as_deref())
            .bind(&note.college)
            .bind(&note.stream)
            .bind(&note.branch)
            .bind(note.semester)
            .bind(&note.subject)
            .bind(&note.file_url)
            .bind(note.is_public)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn update(&self, id: NoteId, changes: &NoteChanges) -> StoreResult<Option<Note>> {
        let mut query = QueryBuilder::<Postgres>::new("UPDATE notes SET updated_at = now()");

        if let Some(title) = &changes.title {
            query.push(", title = ").push_bind(title.clone());
        }
        if let Some(description) = &changes.description {
            query.push(", description = ").push_bind(description.clone());
        }
        if let Some(college) = &changes.college {
            query.push(", college = ").push_bind(college.clone());
        }
        if let Some(stream) = &changes.stream {
            query.push(", stream = ").push_bind(stream.clone());
        }
        if let Some(branch) = &changes.branch {
            query.push(", branch = ").push_bind(branch.clone());
        }
        if let Some(semester) = changes.semester {
            query.push(", semester = ").push_bind(semester);
        }
        if let Some(subject) = &changes.subject {
            query.push(", subject = ").push_bind(subject.clone());
        }
        if let Some(file_url) = &changes.file_url {
            query.push(", file_url = ").push_bind(file_url.clone());
        }
        if let Some(is_public) = changes.is_public {
            query.push(", is_public = ").push_bind(is_public);
        }

        query
            .push(" WHERE id = ")
            .push_bind(id.0)
            .push(" RETURNING ")
            .push(NOTE_COLUMNS);

        let row = query
            .build_query_as::<NoteRow>()
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Note::from))
    }

    async fn delete(&self, id: NoteId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM notes WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(all(test, feature = "integration-tests"))]
mod integration_tests {
    use super::*;

    async fn repo() -> PgNoteRepository {
        let config = StoreConfig::from_env().expect("DATABASE_URL must be set");
        PgNoteRepository::connect(config).await.unwrap()
    }

    fn new_note(subject: &str) -> NewNote {
        NewNote {
            title: "Integration".to_string(),
            description: Some("created by integration test".to_string()),
            college: "X".to_string(),
            stream: "Y".to_string(),
            branch: "Z".to_string(),
            semester: 2,
            subject: subject.to_string(),
            file_url: "it/file.pdf".to_string(),
            is_public: true,
        }
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let repo = repo().await;
        let owner = UserId::from_uuid(uuid::Uuid::new_v4());

        let created = repo.create(owner, &new_note("it-crud")).await.unwrap();
        assert_eq!(created.owner, owner);
        assert_eq!(created.created_at, created.updated_at);

        let changes = NoteChanges {
            title: Some("Renamed".to_string()),
            description: Some(None),
            ..Default::default()
        };
        let updated = repo.update(created.id, &changes).await.unwrap().unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description, None);
        assert_eq!(updated.subject, "it-crud");
        assert!(updated.updated_at >= created.updated_at);

        assert!(repo.delete(created.id).await.unwrap());
        assert!(!repo.delete(created.id).await.unwrap());
        assert!(repo.get_by_id(created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_by_owner_pages_backwards() {
        let repo = repo().await;
        let owner = UserId::from_uuid(uuid::Uuid::new_v4());
        for _ in 0..3 {
            repo.create(owner, &new_note("it-pages")).await.unwrap();
        }

        let first = repo.list_by_owner(owner, None, 2).await.unwrap();
        assert_eq!(first.len(), 2);
        let cursor = Cursor::after(first.last().unwrap());
        let second = repo.list_by_owner(owner, Some(&cursor), 2).await.unwrap();
        assert!(second.iter().all(|n| n.created_at < cursor.created_at));

        for note in first.iter().chain(second.iter()) {
            repo.delete(note.id).await.unwrap();
        }
    }
}
