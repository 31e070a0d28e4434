use thiserror::Error;

use crate::llm::LlmError;

/// Errors from repository operations (used by trait definitions in foxie-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors related to chat session operations.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("session not found")]
    NotFound,

    /// The caller does not own the session. Surfaced to clients as not-found.
    #[error("session does not belong to caller")]
    Unauthorized,

    #[error("completion service unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for ChatError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => ChatError::NotFound,
            other => ChatError::Storage(other.to_string()),
        }
    }
}

impl From<LlmError> for ChatError {
    fn from(e: LlmError) -> Self {
        ChatError::UpstreamUnavailable(e.to_string())
    }
}

/// Errors from the external blob store.
#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found")]
    NotFound,

    #[error("blob store authentication failed")]
    Auth,

    #[error("blob store error: {0}")]
    Upstream(String),
}

/// Errors related to note and file operations.
#[derive(Debug, Error)]
pub enum NoteError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("note not found")]
    NotFound,

    #[error("file store error: {0}")]
    Upstream(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl From<RepositoryError> for NoteError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => NoteError::NotFound,
            other => NoteError::Storage(other.to_string()),
        }
    }
}

impl From<BlobError> for NoteError {
    fn from(e: BlobError) -> Self {
        NoteError::Upstream(e.to_string())
    }
}
