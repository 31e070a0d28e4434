//! Chat session and message types for Foxie.
//!
//! A session is one conversation between a student and the assistant,
//! stored as a single document in the user's namespace. Messages are kept
//! in conversational order inside the session document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Name given to every new session until it is auto-named or renamed.
pub const DEFAULT_SESSION_NAME: &str = "New Session";

/// Number of sessions shown in the sidebar listing.
pub const SIDEBAR_PAGE_SIZE: usize = 10;

/// Author of a message within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::User => write!(f, "user"),
            MessageRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single turn within a chat session.
///
/// The `id` survives in-place edits; position in the session's message
/// list is the only ordering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    /// A new user turn with a fresh id.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role: MessageRole::User,
            content: content.into(),
        }
    }

    /// A new assistant turn with a fresh id.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

/// A named, ordered conversation persisted as one document.
///
/// Serialized in camelCase to match the web client. The owning user id is
/// kept server-side and never sent back to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    #[serde(skip_serializing, default)]
    pub user_id: String,
    pub name: String,
    pub messages: Vec<ChatMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Whether this was the user's first session ever. Fixed at creation.
    pub is_first_ever_session: bool,
}

impl ChatSession {
    /// Build an empty session for `user_id` with the sentinel name.
    pub fn new(user_id: impl Into<String>, is_first_ever_session: bool) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7().to_string(),
            user_id: user_id.into(),
            name: DEFAULT_SESSION_NAME.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            is_first_ever_session,
        }
    }

    /// Whether the session has no user turn yet.
    pub fn has_user_message(&self) -> bool {
        self.messages.iter().any(ChatMessage::is_user)
    }
}

/// Result of a send: the assistant reply plus the updated session view.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub bot_reply: String,
    pub session: ChatSession,
}
