//! Application error type mapping to HTTP status codes.
//!
//! Error bodies are `{ "error": "..." }`. Raw upstream or storage text is
//! attached to the response as an [`ErrorDetails`] extension and only
//! written into the body (as `details`) by [`expose_error_details`] when
//! the server is not running in production.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use foxie_types::error::{ChatError, NoteError};

use crate::state::AppState;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Chat session errors.
    Chat(ChatError),
    /// Note and file errors.
    Note(NoteError),
    /// Malformed request input caught before reaching a service.
    Validation(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl From<NoteError> for AppError {
    fn from(e: NoteError) -> Self {
        AppError::Note(e)
    }
}

/// Client-facing message plus the raw cause, carried as a response
/// extension until [`expose_error_details`] decides whether to show it.
#[derive(Debug, Clone)]
pub struct ErrorDetails {
    pub error: String,
    pub details: String,
}

impl AppError {
    /// Status code, client-facing message, and optional raw detail.
    fn parts(&self) -> (StatusCode, String, Option<String>) {
        match self {
            AppError::Chat(ChatError::Validation(msg))
            | AppError::Note(NoteError::Validation(msg))
            | AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), None),
            // A foreign session is reported exactly like a missing one.
            AppError::Chat(ChatError::NotFound | ChatError::Unauthorized) => {
                (StatusCode::NOT_FOUND, "Session not found".to_string(), None)
            }
            AppError::Chat(ChatError::UpstreamUnavailable(detail)) => (
                StatusCode::BAD_GATEWAY,
                "Failed to get a reply from the assistant".to_string(),
                Some(detail.clone()),
            ),
            AppError::Chat(ChatError::Storage(detail))
            | AppError::Note(NoteError::Storage(detail)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
                Some(detail.clone()),
            ),
            AppError::Note(NoteError::NotFound) => {
                (StatusCode::NOT_FOUND, "Note not found".to_string(), None)
            }
            AppError::Note(NoteError::Upstream(detail)) => (
                StatusCode::BAD_GATEWAY,
                "File store request failed".to_string(),
                Some(detail.clone()),
            ),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = self.parts();

        if status.is_server_error() {
            tracing::error!(status = %status, error = ?self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = ?self, "Request rejected");
        }

        let mut response = (status, Json(json!({ "error": error }))).into_response();
        if let Some(details) = details {
            response
                .extensions_mut()
                .insert(ErrorDetails { error, details });
        }
        response
    }
}

/// Middleware that adds `details` to error bodies outside production.
pub async fn expose_error_details(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    let Some(ErrorDetails { error, details }) = response.extensions_mut().remove::<ErrorDetails>()
    else {
        return response;
    };
    if state.config.environment.is_production() {
        return response;
    }

    let status = response.status();
    (status, Json(json!({ "error": error, "details": details }))).into_response()
}
