//! SQLite session store implementation.
//!
//! Implements `SessionStore` from `foxie-core` using sqlx with split read/write
//! pools. Each session is one row keyed by `(user_id, id)`; the message list
//! is a JSON column so an update replaces the whole document at once.

use chrono::{DateTime, SecondsFormat, Utc};
use foxie_core::chat::repository::SessionStore;
use foxie_types::chat::{ChatMessage, ChatSession};
use foxie_types::error::RepositoryError;
use sqlx::Row;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `SessionStore`.
pub struct SqliteSessionStore {
    pool: DatabasePool,
}

impl SqliteSessionStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row type for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

/// Internal row type for mapping SQLite rows to domain ChatSession.
struct ChatSessionRow {
    user_id: String,
    id: String,
    name: String,
    messages: String,
    created_at: String,
    updated_at: String,
    is_first_ever_session: bool,
}

impl ChatSessionRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            user_id: row.try_get("user_id")?,
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            messages: row.try_get("messages")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            is_first_ever_session: row.try_get("is_first_ever_session")?,
        })
    }

    fn into_session(self) -> Result<ChatSession, RepositoryError> {
        let messages: Vec<ChatMessage> = serde_json::from_str(&self.messages)
            .map_err(|e| RepositoryError::Query(format!("invalid messages document: {e}")))?;

        Ok(ChatSession {
            id: self.id,
            user_id: self.user_id,
            name: self.name,
            messages,
            created_at: parse_datetime(&self.created_at)?,
            updated_at: parse_datetime(&self.updated_at)?,
            is_first_ever_session: self.is_first_ever_session,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub(crate) fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
pub(crate) fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn encode_messages(messages: &[ChatMessage]) -> Result<String, RepositoryError> {
    serde_json::to_string(messages)
        .map_err(|e| RepositoryError::Query(format!("failed to encode messages: {e}")))
}

// ---------------------------------------------------------------------------
// SessionStore implementation
// ---------------------------------------------------------------------------

impl SessionStore for SqliteSessionStore {
    async fn create_session(&self, session: &ChatSession) -> Result<ChatSession, RepositoryError> {
        let result = sqlx::query(
            r#"INSERT INTO chat_sessions (user_id, id, name, messages, created_at, updated_at, is_first_ever_session)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(&session.user_id)
        .bind(&session.id)
        .bind(&session.name)
        .bind(encode_messages(&session.messages)?)
        .bind(format_datetime(&session.created_at))
        .bind(format_datetime(&session.updated_at))
        .bind(session.is_first_ever_session)
        .execute(&self.pool.writer)
        .await;

        match result {
            Ok(_) => Ok(session.clone()),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
                RepositoryError::Conflict(format!("session '{}' already exists", session.id)),
            ),
            Err(e) => Err(RepositoryError::Query(e.to_string())),
        }
    }

    async fn get_session(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> Result<Option<ChatSession>, RepositoryError> {
        let row = sqlx::query("SELECT * FROM chat_sessions WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(session_id)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let session_row = ChatSessionRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(session_row.into_session()?))
            }
            None => Ok(None),
        }
    }

    async fn update_session(&self, session: &ChatSession) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE chat_sessions
               SET name = ?, messages = ?, updated_at = ?
               WHERE user_id = ? AND id = ?"#,
        )
        .bind(&session.name)
        .bind(encode_messages(&session.messages)?)
        .bind(format_datetime(&session.updated_at))
        .bind(&session.user_id)
        .bind(&session.id)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn list_sessions(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> Result<Vec<ChatSession>, RepositoryError> {
        // SQLite treats a negative LIMIT as no limit.
        let limit = limit.map_or(-1, |limit| i64::try_from(limit).unwrap_or(i64::MAX));

        let rows = sqlx::query(
            "SELECT * FROM chat_sessions WHERE user_id = ? ORDER BY updated_at DESC LIMIT ?",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut sessions = Vec::with_capacity(rows.len());
        for row in &rows {
            let session_row = ChatSessionRow::from_row(row)
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            sessions.push(session_row.into_session()?);
        }

        Ok(sessions)
    }

    async fn count_sessions(&self, user_id: &str) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as count FROM chat_sessions WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("count")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        Ok(count as u64)
    }

    async fn delete_session(&self, user_id: &str, session_id: &str) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM chat_sessions WHERE user_id = ? AND id = ?")
            .bind(user_id)
            .bind(session_id)
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
    use chrono::Duration;
    use foxie_types::chat::MessageRole;

    async fn test_pool() -> DatabasePool {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let url = format!("sqlite://{}?mode=rwc", db_path.display());
        // Leak tempdir so it lives for the test
        std::mem::forget(dir);
        DatabasePool::new(&url).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get_session() {
        let store = SqliteSessionStore::new(test_pool().await);
        let mut session = ChatSession::new("student-1", true);
        session.messages.push(ChatMessage::user("Hello"));
        session.messages.push(ChatMessage::assistant("Hi!"));

        store.create_session(&session).await.unwrap();
        let loaded = store
            .get_session("student-1", &session.id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(loaded.user_id, "student-1");
        assert_eq!(loaded.name, session.name);
        assert_eq!(loaded.messages, session.messages);
        assert_eq!(loaded.messages[1].role, MessageRole::Assistant);
        assert!(loaded.is_first_ever_session);
        assert_eq!(loaded.created_at, session.created_at);
        assert_eq!(loaded.updated_at, session.updated_at);
    }

    #[tokio::test]
    async fn test_sessions_are_namespaced_by_user() {
        let store = SqliteSessionStore::new(test_pool().await);
        let session = ChatSession::new("student-1", true);
        store.create_session(&session).await.unwrap();

        assert!(
            store
                .get_session("student-2", &session.id)
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(store.count_sessions("student-1").await.unwrap(), 1);
        assert_eq!(store.count_sessions("student-2").await.unwrap(), 0);
        assert!(matches!(
            store.delete_session("student-2", &session.id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_update_overwrites_document() {
        let store = SqliteSessionStore::new(test_pool().await);
        let mut session = ChatSession::new("student-1", false);
        store.create_session(&session).await.unwrap();

        session.name = "Renamed".to_string();
        session.messages.push(ChatMessage::user("Question"));
        session.updated_at = session.updated_at + Duration::seconds(1);
        store.update_session(&session).await.unwrap();

        let loaded = store
            .get_session("student-1", &session.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.name, "Renamed");
        assert_eq!(loaded.messages.len(), 1);
        assert_eq!(loaded.updated_at, session.updated_at);
        assert!(!loaded.is_first_ever_session);
    }

    #[tokio::test]
    async fn test_update_missing_session_is_not_found() {
        let store = SqliteSessionStore::new(test_pool().await);
        let session = ChatSession::new("student-1", false);
        assert!(matches!(
            store.update_session(&session).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_list_orders_by_updated_at_desc_with_limit() {
        let store = SqliteSessionStore::new(test_pool().await);
        let base = Utc::now();

        let mut ids = Vec::new();
        for i in 0..3 {
            let mut session = ChatSession::new("student-1", i == 0);
            session.updated_at = base + Duration::seconds(i);
            store.create_session(&session).await.unwrap();
            ids.push(session.id);
        }

        let all = store.list_sessions("student-1", None).await.unwrap();
        let listed: Vec<&str> = all.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(listed, vec![ids[2].as_str(), ids[1].as_str(), ids[0].as_str()]);

        let capped = store.list_sessions("student-1", Some(2)).await.unwrap();
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].id, ids[2]);
    }

    #[tokio::test]
    async fn test_list_with_huge_limit_returns_everything() {
        let store = SqliteSessionStore::new(test_pool().await);
        for i in 0..2 {
            store
                .create_session(&ChatSession::new("student-1", i == 0))
                .await
                .unwrap();
        }

        let all = store
            .list_sessions("student-1", Some(usize::MAX))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let none = store.list_sessions("student-1", Some(0)).await.unwrap();
        assert!(none.is_empty());
    }

    #[tokio::test]
    async fn test_delete_session() {
        let store = SqliteSessionStore::new(test_pool().await);
        let session = ChatSession::new("student-1", true);
        store.create_session(&session).await.unwrap();

        store.delete_session("student-1", &session.id).await.unwrap();
        assert!(
            store
                .get_session("student-1", &session.id)
                .await
                .unwrap()
                .is_none()
        );
        assert!(matches!(
            store.delete_session("student-1", &session.id).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_create_is_conflict() {
        let store = SqliteSessionStore::new(test_pool().await);
        let session = ChatSession::new("student-1", true);
        store.create_session(&session).await.unwrap();
        assert!(matches!(
            store.create_session(&session).await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[test]
    fn test_format_datetime_is_fixed_width() {
        let a = format_datetime(
            &DateTime::parse_from_rfc3339("2024-10-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        );
        let b = format_datetime(
            &DateTime::parse_from_rfc3339("2024-10-01T12:00:00.5Z")
                .unwrap()
                .with_timezone(&Utc),
        );
        assert_eq!(a.len(), b.len());
        assert!(a < b);
    }
}
