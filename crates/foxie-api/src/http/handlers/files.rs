//! File deletion handler.
//!
//! POST /api/files/delete (also reachable as the legacy `/api/deleteFile`)
//!
//! A file that is already gone from the blob store is reported as success.

use axum::Json;
use axum::extract::State;
use serde::Deserialize;
use serde_json::{Value, json};

use foxie_types::note::{DeleteOutcome, ResourceType};

use crate::http::error::AppError;
use crate::state::AppState;

/// Request body for deleting an uploaded file.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteFileRequest {
    #[serde(default)]
    pub public_id: String,
    pub resource_type: Option<String>,
    /// MIME type, used to pick the resource type when none is given.
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
}

/// Parse a client-supplied resource type, rejecting unknown values.
pub fn parse_resource_type(value: &str) -> Result<ResourceType, AppError> {
    value.parse().map_err(AppError::Validation)
}

/// Explicit resource type, else one derived from the MIME type, else `auto`.
fn resolve_resource_type(body: &DeleteFileRequest) -> Result<ResourceType, AppError> {
    match (&body.resource_type, &body.file_type) {
        (Some(resource_type), _) => parse_resource_type(resource_type),
        (None, Some(file_type)) => Ok(ResourceType::from_mime(file_type)),
        (None, None) => Ok(ResourceType::Auto),
    }
}

/// POST /api/files/delete - Remove a file from the blob store.
pub async fn delete_file(
    State(state): State<AppState>,
    Json(body): Json<DeleteFileRequest>,
) -> Result<Json<Value>, AppError> {
    let resource_type = resolve_resource_type(&body)?;

    let outcome = state
        .note_service
        .delete_file(&body.public_id, resource_type, body.file_size)
        .await?;

    let status = match outcome {
        DeleteOutcome::Deleted => "deleted",
        DeleteOutcome::AlreadyAbsent => "already_absent",
    };
    Ok(Json(json!({ "status": status, "message": outcome.message() })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(resource_type: Option<&str>, file_type: Option<&str>) -> DeleteFileRequest {
        DeleteFileRequest {
            public_id: "notes/a".to_string(),
            resource_type: resource_type.map(str::to_string),
            file_type: file_type.map(str::to_string),
            file_size: None,
        }
    }

    #[test]
    fn test_resolve_resource_type_precedence() {
        assert_eq!(
            resolve_resource_type(&request(Some("video"), Some("application/pdf"))).unwrap(),
            ResourceType::Video
        );
        assert_eq!(
            resolve_resource_type(&request(None, Some("application/pdf"))).unwrap(),
            ResourceType::Raw
        );
        assert_eq!(
            resolve_resource_type(&request(None, None)).unwrap(),
            ResourceType::Auto
        );
    }

    #[test]
    fn test_unknown_resource_type_is_rejected() {
        assert!(matches!(
            resolve_resource_type(&request(Some("document"), None)),
            Err(AppError::Validation(_))
        ));
    }
}
