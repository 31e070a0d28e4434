//! Note HTTP handlers.
//!
//! Endpoints:
//! - GET  /api/notes       - List the caller's notes
//! - POST /api/notes       - Record an uploaded file
//! - POST /api/notes/sync  - Drop notes whose file is gone

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use foxie_core::notes::service::NewNote;
use foxie_types::note::{Note, SyncReport};

use crate::http::error::AppError;
use crate::http::extractors::query::UserQuery;
use crate::http::handlers::files::parse_resource_type;
use crate::state::AppState;

/// Request body for recording an uploaded file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteRequest {
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub public_id: String,
    pub resource_type: Option<String>,
}

/// Request body for the attachment sweep.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncNotesRequest {
    #[serde(default)]
    pub user_id: String,
}

/// GET /api/notes - List notes, newest first.
pub async fn list_notes(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<Note>>, AppError> {
    let notes = state.note_service.list_notes(&query.user_id).await?;
    Ok(Json(notes))
}

/// POST /api/notes - Record an uploaded file as a note.
pub async fn create_note(
    State(state): State<AppState>,
    Json(body): Json<CreateNoteRequest>,
) -> Result<(StatusCode, Json<Note>), AppError> {
    let resource_type = body
        .resource_type
        .as_deref()
        .map(parse_resource_type)
        .transpose()?;

    let note = state
        .note_service
        .add_note(
            &body.user_id,
            NewNote {
                file_name: body.file_name,
                file_type: body.file_type,
                file_url: body.file_url,
                public_id: body.public_id,
                resource_type,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(note)))
}

/// POST /api/notes/sync - Reconcile notes against the blob store.
pub async fn sync_notes(
    State(state): State<AppState>,
    Json(body): Json<SyncNotesRequest>,
) -> Result<Json<SyncReport>, AppError> {
    let report = state.note_service.sync_attachments(&body.user_id).await?;
    Ok(Json(report))
}
