//! Session change notifications.
//!
//! Emitted by the chat service after every successful persist so callers
//! can refresh their view without assuming a push channel from the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A new session document was inserted.
    Created { user_id: String, session_id: String },

    /// Messages, name, or timestamp of a session changed.
    Updated {
        user_id: String,
        session_id: String,
        updated_at: DateTime<Utc>,
        message_count: usize,
    },

    /// The session document was removed.
    Deleted { user_id: String, session_id: String },
}

impl SessionEvent {
    pub fn session_id(&self) -> &str {
        match self {
            SessionEvent::Created { session_id, .. }
            | SessionEvent::Updated { session_id, .. }
            | SessionEvent::Deleted { session_id, .. } => session_id,
        }
    }
}
