//! NoteRepository trait definition.

use foxie_types::error::RepositoryError;
use foxie_types::note::Note;

/// Repository trait for note records in a user's namespace.
///
/// Implementations live in foxie-infra (e.g., `SqliteNoteRepository`).
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait NoteRepository: Send + Sync {
    /// Insert a new note record.
    fn create_note(
        &self,
        note: &Note,
    ) -> impl std::future::Future<Output = Result<Note, RepositoryError>> + Send;

    /// List the user's notes ordered by `created_at` DESC.
    fn list_notes(
        &self,
        user_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Note>, RepositoryError>> + Send;

    /// Delete a note record. Returns `RepositoryError::NotFound` if absent.
    fn delete_note(
        &self,
        user_id: &str,
        note_id: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
