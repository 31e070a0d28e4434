//! Chat message HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/chat                                - Send a prompt
//! - PUT    /api/sessions/{id}/messages/{index}      - Edit a message
//! - DELETE /api/sessions/{id}/messages/{index}      - Delete a message
//!
//! Edits and deletes that touch a user turn regenerate the assistant reply
//! before responding, so these calls can take as long as a send.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use foxie_types::chat::{ChatReply, ChatSession};

use crate::http::error::AppError;
use crate::http::extractors::query::UserQuery;
use crate::state::AppState;

/// Request body for the chat endpoint.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub prompt: String,
    /// Older clients send their local copy of the history. The stored
    /// session is authoritative, so this is accepted and ignored.
    #[serde(default)]
    pub messages: Option<serde_json::Value>,
}

/// Request body for editing a message.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMessageRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub content: String,
}

/// POST /api/chat - Send a prompt and get the assistant's reply.
pub async fn send_message(
    State(state): State<AppState>,
    Json(body): Json<SendMessageRequest>,
) -> Result<Json<ChatReply>, AppError> {
    if body.messages.is_some() {
        tracing::debug!(session_id = %body.session_id, "Ignoring client-supplied history");
    }

    let reply = state
        .chat_service
        .send_message(&body.user_id, &body.session_id, &body.prompt)
        .await?;
    Ok(Json(reply))
}

/// PUT /api/sessions/{id}/messages/{index} - Replace a message's text.
pub async fn edit_message(
    State(state): State<AppState>,
    Path((session_id, index)): Path<(String, usize)>,
    Json(body): Json<EditMessageRequest>,
) -> Result<Json<ChatSession>, AppError> {
    let session = state
        .chat_service
        .edit_message(&body.user_id, &session_id, index, &body.content)
        .await?;
    Ok(Json(session))
}

/// DELETE /api/sessions/{id}/messages/{index} - Remove a message.
pub async fn delete_message(
    State(state): State<AppState>,
    Path((session_id, index)): Path<(String, usize)>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ChatSession>, AppError> {
    let session = state
        .chat_service
        .delete_message(&query.user_id, &session_id, index)
        .await?;
    Ok(Json(session))
}
