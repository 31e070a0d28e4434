//! Session CRUD HTTP handlers.
//!
//! Endpoints:
//! - POST   /api/sessions          - Create a session
//! - GET    /api/sessions          - List the caller's sessions
//! - GET    /api/sessions/{id}     - Get a single session
//! - PATCH  /api/sessions/{id}     - Rename a session
//! - DELETE /api/sessions/{id}     - Delete a session

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;
use serde_json::{Value, json};

use foxie_types::chat::ChatSession;

use crate::http::error::AppError;
use crate::http::extractors::query::{SessionListQuery, UserQuery};
use crate::state::AppState;

/// Request body for session creation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest {
    #[serde(default)]
    pub user_id: String,
}

/// Request body for renaming a session.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenameSessionRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub name: String,
}

/// POST /api/sessions - Create an empty session.
pub async fn create_session(
    State(state): State<AppState>,
    Json(body): Json<CreateSessionRequest>,
) -> Result<(StatusCode, Json<ChatSession>), AppError> {
    let session = state.chat_service.create_session(&body.user_id).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/sessions - List sessions, most recently updated first.
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<SessionListQuery>,
) -> Result<Json<Vec<ChatSession>>, AppError> {
    let sessions = state
        .chat_service
        .list_sessions(&query.user_id, query.limit)
        .await?;
    Ok(Json(sessions))
}

/// GET /api/sessions/{id} - Get a session by ID.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<ChatSession>, AppError> {
    let session = state
        .chat_service
        .get_session(&query.user_id, &session_id)
        .await?;
    Ok(Json(session))
}

/// PATCH /api/sessions/{id} - Give a session an explicit name.
pub async fn rename_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(body): Json<RenameSessionRequest>,
) -> Result<Json<ChatSession>, AppError> {
    let session = state
        .chat_service
        .rename_session(&body.user_id, &session_id, &body.name)
        .await?;
    Ok(Json(session))
}

/// DELETE /api/sessions/{id} - Delete a session and its messages.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>, AppError> {
    state
        .chat_service
        .delete_session(&query.user_id, &session_id)
        .await?;
    Ok(Json(json!({ "message": "Session deleted successfully" })))
}
