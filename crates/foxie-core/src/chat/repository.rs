//! SessionStore trait definition.
//!
//! Sessions live in a per-user namespaced collection. Every lookup is keyed
//! by `(user_id, session_id)`, so a session owned by someone else is simply
//! absent from the caller's point of view.

use foxie_types::chat::ChatSession;
use foxie_types::error::RepositoryError;

/// Repository trait for chat session documents.
///
/// Implementations live in foxie-infra (e.g., `SqliteSessionStore`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
///
/// `update_session` overwrites the whole document: there is no version
/// check, so concurrent writers to the same session resolve as last writer
/// wins.
pub trait SessionStore: Send + Sync {
    /// Insert a new session document.
    fn create_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<ChatSession, RepositoryError>> + Send;

    /// Get a session from the user's namespace.
    fn get_session(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Option<ChatSession>, RepositoryError>> + Send;

    /// Overwrite name, messages, and `updated_at` of an existing session.
    ///
    /// Returns `RepositoryError::NotFound` if the session no longer exists.
    fn update_session(
        &self,
        session: &ChatSession,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// List the user's sessions ordered by `updated_at` DESC.
    ///
    /// `None` means unbounded.
    fn list_sessions(
        &self,
        user_id: &str,
        limit: Option<usize>,
    ) -> impl std::future::Future<Output = Result<Vec<ChatSession>, RepositoryError>> + Send;

    /// Count the user's sessions.
    fn count_sessions(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Hard-delete a session.
    ///
    /// Returns `RepositoryError::NotFound` if there was nothing to delete.
    fn delete_session(
        &self,
        user_id: &str,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
