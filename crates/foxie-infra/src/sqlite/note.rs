//! SQLite note repository implementation.

use foxie_core::notes::repository::NoteRepository;
use foxie_types::error::RepositoryError;
use foxie_types::note::{Note, ResourceType};
use sqlx::Row;

use super::chat::{format_datetime, parse_datetime};
use super::pool::DatabasePool;

/// SQLite-backed implementation of `NoteRepository`.
pub struct SqliteNoteRepository {
    pool: DatabasePool,
}

impl SqliteNoteRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

struct NoteRow {
    user_id: String,
    id: String,
    file_name: String,
    file_type: String,
    file_url: String,
    public_id: String,
    resource_type: Option<String>,
    created_at: String,
}

impl NoteRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            id: row.try_get("id")?,
            file_name: row.try_get("file_name")?,
            file_type: row.try_get("file_type")?,
            file_url: row.try_get("file_url")?,
            public_id: row.try_get("public_id")?,
            resource_type: row.try_get("resource_type")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_note(self) -> Result<Note, RepositoryError> {
        let resource_type = self
            .resource_type
            .as_deref()
            .map(str::parse::<ResourceType>)
            .transpose()
            .map_err(RepositoryError::Query)?;

        Ok(Note {
            id: self.id,
            user_id: self.user_id,
            file_name: self.file_name,
            file_type: self.file_type,
            file_url: self.file_url,
            public_id: self.public_id,
            resource_type,
            created_at: parse_datetime(&self.created_at)?,
        })
    }
}

impl NoteRepository for SqliteNoteRepository {
    async fn create_note(&self, note: &Note) -> Result<Note, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO notes (user_id, id, file_name, file_type, file_url, public_id, resource_type, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&note.user_id)
        .bind(&note.id)
        .bind(&note.file_name)
        .bind(&note.file_type)
        .bind(&note.file_url)
        .bind(&note.public_id)
        .bind(note.resource_type.map(|rt| rt.as_str()))
        .bind(format_datetime(&note.created_at))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(note.clone())
    }

    async fn list_notes(&self, user_id: &str) -> Result<Vec<Note>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM notes WHERE user_id = ? ORDER BY created_at DESC")
            .bind(user_id)
            .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut notes = Vec::with_capacity(rows.len());
        for row in &rows {
            let note_row =
                NoteRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            notes.push(note_row.into_note()?);
        }
        Ok(notes)
    }

    async fn delete_note(&self, user_id: &str, note_id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM notes WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(note_id)
            .execute(&self.pool.writer)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_list_delete_note() {
        let repo = SqliteNoteRepository::new(test_pool().await);

        let mut older = Note::new(
            "student-1",
            "syllabus.pdf",
            "application/pdf",
            "https://cdn.example/syllabus",
            "syllabus",
        );
        older.created_at = Utc::now() - Duration::minutes(5);
        let newer = Note::new(
            "student-1",
            "diagram.png",
            "image/png",
            "https://cdn.example/diagram",
            "diagram",
        );
        repo.create_note(&older).await.unwrap();
        repo.create_note(&newer).await.unwrap();

        let notes = repo.list_notes("student-1").await.unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].id, newer.id);
        assert_eq!(notes[1].resource_type, Some(ResourceType::Raw));
        assert!(repo.list_notes("student-2").await.unwrap().is_empty());

        repo.delete_note("student-1", &older.id).await.unwrap();
        assert_eq!(repo.list_notes("student-1").await.unwrap().len(), 1);
        assert!(matches!(
            repo.delete_note("student-1", &older.id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_missing_resource_type_roundtrips_as_none() {
        let repo = SqliteNoteRepository::new(test_pool().await);
        let mut note = Note::new("student-1", "a.png", "image/png", "https://x/a", "a");
        note.resource_type = None;
        repo.create_note(&note).await.unwrap();

        let notes = repo.list_notes("student-1").await.unwrap();
        assert!(notes[0].resource_type.is_none());
        assert_eq!(notes[0].effective_resource_type(), ResourceType::Image);
    }
}
