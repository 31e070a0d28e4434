//! Axum router configuration with middleware.
//!
//! All routes are under `/api/`.
//! Middleware: CORS, tracing, error details outside production.

use axum::Router;
use axum::http::HeaderValue;
use axum::middleware;
use axum::routing::{get, post, put};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::error::expose_error_details;
use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&state.config.server.allowed_origins))
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Sessions
        .route(
            "/sessions",
            post(handlers::session::create_session).get(handlers::session::list_sessions),
        )
        .route(
            "/sessions/{id}",
            get(handlers::session::get_session)
                .patch(handlers::session::rename_session)
                .delete(handlers::session::delete_session),
        )
        // Messages
        .route("/chat", post(handlers::chat::send_message))
        .route(
            "/sessions/{id}/messages/{index}",
            put(handlers::chat::edit_message).delete(handlers::chat::delete_message),
        )
        // Notes
        .route(
            "/notes",
            get(handlers::notes::list_notes).post(handlers::notes::create_note),
        )
        .route("/notes/sync", post(handlers::notes::sync_notes))
        // Files
        .route("/files/delete", post(handlers::files::delete_file))
        .route("/deleteFile", post(handlers::files::delete_file));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            expose_error_details,
        ))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Configured origins, or any origin when none are configured.
fn allowed_origins(origins: &[String]) -> AllowOrigin {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        AllowOrigin::from(Any)
    } else {
        AllowOrigin::list(parsed)
    }
}

/// GET /health - Simple health check endpoint.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use tower::ServiceExt;

    use foxie_core::llm::box_provider::BoxLlmProvider;
    use foxie_core::llm::provider::LlmProvider;
    use foxie_core::storage::blob_store::{BlobStore, BoxBlobStore};
    use foxie_infra::sqlite::pool::DatabasePool;
    use foxie_types::config::{AppConfig, Environment};
    use foxie_types::error::BlobError;
    use foxie_types::llm::{CompletionRequest, CompletionResponse, LlmError, StopReason, Usage};
    use foxie_types::note::ResourceType;

    use super::*;

    /// Replies "reply N", or times out when `fail` is set.
    struct FakeProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    impl LlmProvider for FakeProvider {
        fn name(&self) -> &str {
            "fake"
        }

        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            if self.fail {
                return Err(LlmError::Timeout);
            }
            let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(CompletionResponse {
                id: format!("cmpl-{n}"),
                content: format!("  reply {n}\n"),
                model: "gpt-4".to_string(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }
    }

    /// Blob store holding a fixed set of public ids.
    struct FakeBlobs {
        present: Mutex<HashSet<String>>,
    }

    impl BlobStore for FakeBlobs {
        async fn exists(
            &self,
            public_id: &str,
            _resource_type: ResourceType,
        ) -> Result<bool, BlobError> {
            Ok(self.present.lock().unwrap().contains(public_id))
        }

        async fn destroy(
            &self,
            public_id: &str,
            _resource_type: ResourceType,
        ) -> Result<String, BlobError> {
            let removed = self.present.lock().unwrap().remove(public_id);
            Ok(if removed { "ok" } else { "not found" }.to_string())
        }
    }

    struct TestApp {
        router: Router,
        _dir: TempDir,
    }

    async fn app(fail_completions: bool, environment: Environment, blobs: &[&str]) -> TestApp {
        let dir = TempDir::new().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
        let pool = DatabasePool::new(&url).await.unwrap();

        let provider = BoxLlmProvider::new(FakeProvider {
            calls: AtomicUsize::new(0),
            fail: fail_completions,
        });
        let blobs = BoxBlobStore::new(FakeBlobs {
            present: Mutex::new(blobs.iter().map(|id| id.to_string()).collect()),
        });
        let config = AppConfig {
            environment,
            ..AppConfig::default()
        };

        let state = AppState::from_parts(pool, provider, blobs, config, dir.path().to_path_buf());
        TestApp {
            router: build_router(state),
            _dir: dir,
        }
    }

    async fn call(
        app: &TestApp,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn create(app: &TestApp, user_id: &str) -> Value {
        let (status, session) =
            call(app, Method::POST, "/api/sessions", Some(json!({ "userId": user_id }))).await;
        assert_eq!(status, StatusCode::CREATED);
        session
    }

    async fn send(
        app: &TestApp,
        user_id: &str,
        session_id: &str,
        prompt: &str,
    ) -> (StatusCode, Value) {
        call(
            app,
            Method::POST,
            "/api/chat",
            Some(json!({ "sessionId": session_id, "userId": user_id, "prompt": prompt })),
        )
        .await
    }

    #[tokio::test]
    async fn test_health() {
        let app = app(false, Environment::Development, &[]).await;
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_create_session_requires_user_id() {
        let app = app(false, Environment::Development, &[]).await;
        let (status, body) = call(&app, Method::POST, "/api/sessions", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "userId is required");
    }

    #[tokio::test]
    async fn test_first_session_lifecycle() {
        let app = app(false, Environment::Development, &[]).await;

        let session = create(&app, "student-1").await;
        assert_eq!(session["isFirstEverSession"], true);
        assert_eq!(session["name"], "New Session");
        let id = session["id"].as_str().unwrap().to_string();

        let (status, reply) = send(&app, "student-1", &id, "Hello").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reply["botReply"], "reply 1");
        assert_eq!(reply["session"]["name"], "New Session");
        let messages = reply["session"]["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "Hello");
        assert_eq!(messages[1]["role"], "assistant");

        let uri = format!("/api/sessions/{id}?userId=student-1");
        let (status, body) = call(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Session deleted successfully");

        let (status, _) = call(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = call(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_later_sessions_are_named_after_first_prompt() {
        let app = app(false, Environment::Development, &[]).await;
        create(&app, "student-1").await;
        let second = create(&app, "student-1").await;
        assert_eq!(second["isFirstEverSession"], false);
        let id = second["id"].as_str().unwrap();

        let (_, reply) = send(&app, "student-1", id, "Photosynthesis basics").await;
        assert_eq!(reply["session"]["name"], "Photosynthesis basics");

        let (_, reply) = send(&app, "student-1", id, "And respiration?").await;
        assert_eq!(reply["session"]["name"], "Photosynthesis basics");
        assert_eq!(reply["session"]["messages"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_foreign_session_is_not_found() {
        let app = app(false, Environment::Development, &[]).await;
        let session = create(&app, "student-1").await;
        let id = session["id"].as_str().unwrap();

        let (status, body) = call(
            &app,
            Method::GET,
            &format!("/api/sessions/{id}?userId=student-2"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Session not found");

        let (status, _) = send(&app, "student-2", id, "Hi").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_sessions_limit() {
        let app = app(false, Environment::Development, &[]).await;
        for _ in 0..3 {
            create(&app, "student-1").await;
        }
        create(&app, "student-2").await;

        let (status, all) = call(&app, Method::GET, "/api/sessions?userId=student-1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 3);

        let (_, capped) =
            call(&app, Method::GET, "/api/sessions?userId=student-1&limit=2", None).await;
        assert_eq!(capped.as_array().unwrap().len(), 2);

        let (status, _) = call(&app, Method::GET, "/api/sessions", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_rename_session() {
        let app = app(false, Environment::Development, &[]).await;
        let session = create(&app, "student-1").await;
        let id = session["id"].as_str().unwrap();

        let (status, renamed) = call(
            &app,
            Method::PATCH,
            &format!("/api/sessions/{id}"),
            Some(json!({ "userId": "student-1", "name": "  Biology  " })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["name"], "Biology");
        assert_ne!(renamed["updatedAt"], session["updatedAt"]);
    }

    #[tokio::test]
    async fn test_failed_send_reports_upstream_and_keeps_session() {
        let app = app(true, Environment::Development, &[]).await;
        let session = create(&app, "student-1").await;
        let id = session["id"].as_str().unwrap();

        let (status, body) = send(&app, "student-1", id, "Hello").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "Failed to get a reply from the assistant");
        assert!(body["details"].as_str().unwrap().contains("timed out"));

        let (_, stored) = call(
            &app,
            Method::GET,
            &format!("/api/sessions/{id}?userId=student-1"),
            None,
        )
        .await;
        assert!(stored["messages"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_production_hides_error_details() {
        let app = app(true, Environment::Production, &[]).await;
        let session = create(&app, "student-1").await;
        let id = session["id"].as_str().unwrap();

        let (status, body) = send(&app, "student-1", id, "Hello").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_edit_and_delete_messages() {
        let app = app(false, Environment::Development, &[]).await;
        let session = create(&app, "student-1").await;
        let id = session["id"].as_str().unwrap();
        send(&app, "student-1", id, "one").await;
        send(&app, "student-1", id, "two").await;

        // Editing the first prompt drops the rest and regenerates one reply.
        let (status, edited) = call(
            &app,
            Method::PUT,
            &format!("/api/sessions/{id}/messages/0"),
            Some(json!({ "userId": "student-1", "content": "uno" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let messages = edited["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["content"], "uno");
        assert_eq!(messages[1]["content"], "reply 3");

        // Deleting the assistant reply only shortens the list.
        let (status, deleted) = call(
            &app,
            Method::DELETE,
            &format!("/api/sessions/{id}/messages/1?userId=student-1"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(deleted["messages"].as_array().unwrap().len(), 1);

        let (status, body) = call(
            &app,
            Method::DELETE,
            &format!("/api/sessions/{id}/messages/7?userId=student-1"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_delete_file_is_idempotent() {
        let app = app(false, Environment::Development, &["notes/a"]).await;
        let body = json!({ "publicId": "notes/a", "resourceType": "raw" });

        let (status, first) =
            call(&app, Method::POST, "/api/files/delete", Some(body.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["status"], "deleted");

        let (status, second) = call(&app, Method::POST, "/api/files/delete", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(second["status"], "already_absent");
        assert_eq!(second["message"], "File not found, no action taken");

        let (status, _) = call(
            &app,
            Method::POST,
            "/api/files/delete",
            Some(json!({ "publicId": "notes/a", "resourceType": "document" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_notes_sync_removes_missing_files() {
        let app = app(false, Environment::Development, &["notes/a", "notes/b"]).await;
        for public_id in ["notes/a", "notes/b", "notes/c"] {
            let (status, _) = call(
                &app,
                Method::POST,
                "/api/notes",
                Some(json!({
                    "userId": "student-1",
                    "fileName": format!("{public_id}.pdf"),
                    "fileType": "application/pdf",
                    "fileUrl": format!("https://files.example/{public_id}"),
                    "publicId": public_id,
                })),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, report) = call(
            &app,
            Method::POST,
            "/api/notes/sync",
            Some(json!({ "userId": "student-1" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(report, json!({ "synced": 2, "removed": 1, "errors": [] }));

        let (_, notes) = call(&app, Method::GET, "/api/notes?userId=student-1", None).await;
        let remaining: Vec<&str> = notes
            .as_array()
            .unwrap()
            .iter()
            .map(|n| n["publicId"].as_str().unwrap())
            .collect();
        assert_eq!(remaining.len(), 2);
        assert!(!remaining.contains(&"notes/c"));
    }
}
