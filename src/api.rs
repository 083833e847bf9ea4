//! HTTP surface for docchat.
//!
//! This module exposes a compact Axum router:
//!
//! - `POST /users/:user_id/documents` – Multipart upload of one or more files (PDF, image, or
//!   text). Every file part is extracted, the results are joined into the user's document, and
//!   the previous document is replaced.
//! - `GET /users/:user_id/documents` – Preview of the current document.
//! - `DELETE /users/:user_id/documents` – Clear the current document; history is kept.
//! - `POST /users/:user_id/ask` – Answer `{ "query": "..." }` from the current document.
//! - `GET /users/:user_id/history` – Ordered chat log.
//! - `GET /metrics` – Upload and query counters.
//! - `GET /commands` – Machine-readable command catalog for quick discovery by tools/hosts.

use crate::extraction::{UploadedFile, mime_from_path};
use crate::metrics::MetricsSnapshot;
use crate::retrieval::AnswerKind;
use crate::session::{ChatApi, DocumentPreview, ServiceError, SessionContext, UploadOutcome};
use crate::storage::ChatMessage;
use axum::{
    Json, Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the document chat API.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: ChatApi + 'static,
{
    Router::new()
        .route(
            "/users/:user_id/documents",
            post(upload_documents::<S>)
                .get(get_document::<S>)
                .delete(clear_document::<S>),
        )
        .route("/users/:user_id/ask", post(ask::<S>))
        .route("/users/:user_id/history", get(get_history::<S>))
        .route("/metrics", get(get_metrics::<S>))
        .route("/commands", get(get_commands))
        .with_state(service)
}

/// Upload a batch of files and replace the user's document.
///
/// Every multipart part that carries a file name is treated as a file. The part's content type
/// selects the extractor; when absent, it is guessed from the file extension.
async fn upload_documents<S>(
    State(service): State<Arc<S>>,
    Path(user_id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<UploadOutcome>, AppError>
where
    S: ChatApi,
{
    let ctx = SessionContext::new(&user_id)?;
    let mut files = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::BadRequest(format!("invalid multipart body: {err}")))?
    {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let mime_type = field
            .content_type()
            .map(str::to_string)
            .unwrap_or_else(|| mime_from_path(std::path::Path::new(&file_name)).to_string());
        let bytes = field
            .bytes()
            .await
            .map_err(|err| AppError::BadRequest(format!("failed to read {file_name}: {err}")))?;
        files.push(UploadedFile::new(file_name, mime_type, bytes.to_vec()));
    }

    let outcome = service.upload(&ctx, files).await?;
    tracing::info!(
        user = ctx.user_id(),
        files = outcome.files,
        characters = outcome.characters,
        "Upload request completed"
    );
    Ok(Json(outcome))
}

/// Return a preview of the user's current document.
async fn get_document<S>(
    State(service): State<Arc<S>>,
    Path(user_id): Path<String>,
) -> Result<Json<DocumentPreview>, AppError>
where
    S: ChatApi,
{
    let ctx = SessionContext::new(&user_id)?;
    Ok(Json(service.document_preview(&ctx).await?))
}

/// Clear the user's current document.
async fn clear_document<S>(
    State(service): State<Arc<S>>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError>
where
    S: ChatApi,
{
    let ctx = SessionContext::new(&user_id)?;
    service.clear_document(&ctx).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Request body for `POST /users/:user_id/ask`.
#[derive(Deserialize)]
struct AskRequest {
    /// Free-text question.
    query: String,
}

/// Success response for `POST /users/:user_id/ask`.
#[derive(Serialize)]
struct AskResponse {
    /// Query text as received.
    query: String,
    /// Rendered answer.
    answer: String,
    /// Which retrieval branch answered.
    kind: AnswerKind,
}

/// Answer a question from the user's document.
async fn ask<S>(
    State(service): State<Arc<S>>,
    Path(user_id): Path<String>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, AppError>
where
    S: ChatApi,
{
    let ctx = SessionContext::new(&user_id)?;
    let outcome = service.ask(&ctx, &request.query).await?;
    Ok(Json(AskResponse {
        query: request.query,
        answer: outcome.answer,
        kind: outcome.kind,
    }))
}

/// Response body for `GET /users/:user_id/history`.
#[derive(Serialize)]
struct HistoryResponse {
    messages: Vec<ChatMessage>,
}

/// Return the user's chat log.
async fn get_history<S>(
    State(service): State<Arc<S>>,
    Path(user_id): Path<String>,
) -> Result<Json<HistoryResponse>, AppError>
where
    S: ChatApi,
{
    let ctx = SessionContext::new(&user_id)?;
    let messages = service.history(&ctx).await?;
    Ok(Json(HistoryResponse { messages }))
}

/// Return the activity counters.
async fn get_metrics<S>(State(service): State<Arc<S>>) -> Json<MetricsSnapshot>
where
    S: ChatApi,
{
    Json(service.metrics_snapshot())
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    request_example: Option<serde_json::Value>,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

/// Enumerate supported HTTP commands for discovery/UX in hosts and tools.
async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "upload",
                method: "POST",
                path: "/users/:user_id/documents",
                description: "Multipart upload of PDF, image, or text files. Extracted text replaces the current document. Response returns { \"files\", \"failed_files\", \"characters\", \"fingerprint\", \"preview\" }.",
                request_example: None,
            },
            CommandDescriptor {
                name: "document",
                method: "GET",
                path: "/users/:user_id/documents",
                description: "Preview the current document text.",
                request_example: None,
            },
            CommandDescriptor {
                name: "clear_document",
                method: "DELETE",
                path: "/users/:user_id/documents",
                description: "Clear the current document. Chat history is kept.",
                request_example: None,
            },
            CommandDescriptor {
                name: "ask",
                method: "POST",
                path: "/users/:user_id/ask",
                description: "Answer a question with the most relevant excerpts from the current document.",
                request_example: Some(json!({ "query": "What did the cat do?" })),
            },
            CommandDescriptor {
                name: "history",
                method: "GET",
                path: "/users/:user_id/history",
                description: "Return the chat log for the user in order.",
                request_example: None,
            },
            CommandDescriptor {
                name: "metrics",
                method: "GET",
                path: "/metrics",
                description: "Return upload and query counters useful for observability dashboards.",
                request_example: None,
            },
        ],
    })
}

enum AppError {
    BadRequest(String),
    Service(ServiceError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            Self::Service(
                err @ (ServiceError::InvalidUser | ServiceError::NoFiles | ServiceError::Query(_)),
            ) => (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
            Self::Service(err) => {
                tracing::error!(error = %err, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(inner: ServiceError) -> Self {
        Self::Service(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{create_router, get_commands};
    use crate::extraction::UploadedFile;
    use crate::metrics::MetricsSnapshot;
    use crate::retrieval::AnswerKind;
    use crate::session::{
        AskOutcome, ChatApi, DocumentPreview, ServiceError, SessionContext, UploadOutcome,
    };
    use crate::storage::{ChatMessage, Role};
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode},
    };
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    #[tokio::test]
    async fn commands_catalog_exposes_ask_endpoint() {
        let response = get_commands().await;
        let commands = response.0.commands;
        let ask = commands
            .iter()
            .find(|cmd| cmd.name == "ask")
            .expect("ask command present");

        assert_eq!(ask.method, "POST");
        assert_eq!(ask.path, "/users/:user_id/ask");
        assert!(ask.request_example.is_some());
        assert!(commands.iter().any(|cmd| cmd.name == "upload"));
    }

    #[tokio::test]
    async fn ask_route_passes_user_and_query() {
        let service = Arc::new(StubChatService::default());
        let app = create_router(service.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/users/alice/ask")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "query": "where is the cat" }).to_string()))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["answer"], "stub answer");
        assert_eq!(json["kind"], "matches");
        assert_eq!(json["query"], "where is the cat");

        let calls = service.asked.lock().await.clone();
        assert_eq!(calls, vec![("alice".to_string(), "where is the cat".to_string())]);
    }

    #[tokio::test]
    async fn blank_query_maps_to_bad_request() {
        let app = create_router(Arc::new(StubChatService::default()));
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/users/alice/ask")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "query": "   " }).to_string()))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn upload_route_collects_file_parts() {
        let service = Arc::new(StubChatService::default());
        let app = create_router(service.clone());

        let boundary = "docchat-boundary";
        let body = format!(
            "--{boundary}\r\n\
             Content-Disposition: form-data; name=\"files\"; filename=\"notes.txt\"\r\n\
             Content-Type: text/plain\r\n\r\n\
             The cat sat.\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"files\"; filename=\"scan.png\"\r\n\r\n\
             PNGDATA\r\n\
             --{boundary}\r\n\
             Content-Disposition: form-data; name=\"comment\"\r\n\r\n\
             ignored\r\n\
             --{boundary}--\r\n"
        );

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/users/alice/documents")
                    .header(
                        "content-type",
                        format!("multipart/form-data; boundary={boundary}"),
                    )
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["files"], 2);

        let uploads = service.uploaded.lock().await.clone();
        assert_eq!(uploads.len(), 2);
        assert_eq!(uploads[0].file_name, "notes.txt");
        assert_eq!(uploads[0].mime_type, "text/plain");
        assert_eq!(uploads[0].bytes, b"The cat sat.");
        assert_eq!(uploads[1].file_name, "scan.png");
        assert_eq!(uploads[1].mime_type, "image/png");
    }

    #[tokio::test]
    async fn history_route_serializes_roles() {
        let app = create_router(Arc::new(StubChatService::default()));
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/users/alice/history")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][0]["text"], "hello");
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json body")
    }

    #[derive(Default)]
    struct StubChatService {
        asked: Mutex<Vec<(String, String)>>,
        uploaded: Mutex<Vec<UploadedFile>>,
    }

    #[async_trait]
    impl ChatApi for StubChatService {
        async fn upload(
            &self,
            _ctx: &SessionContext,
            files: Vec<UploadedFile>,
        ) -> Result<UploadOutcome, ServiceError> {
            let count = files.len();
            self.uploaded.lock().await.extend(files);
            Ok(UploadOutcome {
                files: count,
                failed_files: Vec::new(),
                characters: 0,
                fingerprint: String::new(),
                preview: String::new(),
            })
        }

        async fn clear_document(&self, _ctx: &SessionContext) -> Result<(), ServiceError> {
            Ok(())
        }

        async fn document_preview(
            &self,
            _ctx: &SessionContext,
        ) -> Result<DocumentPreview, ServiceError> {
            Ok(DocumentPreview {
                loaded: false,
                characters: 0,
                preview: String::new(),
            })
        }

        async fn ask(
            &self,
            ctx: &SessionContext,
            query: &str,
        ) -> Result<AskOutcome, ServiceError> {
            crate::retrieval::Query::new(query)?;
            self.asked
                .lock()
                .await
                .push((ctx.user_id().to_string(), query.to_string()));
            Ok(AskOutcome {
                answer: "stub answer".into(),
                kind: AnswerKind::Matches,
            })
        }

        async fn history(&self, _ctx: &SessionContext) -> Result<Vec<ChatMessage>, ServiceError> {
            Ok(vec![ChatMessage::new(Role::User, "hello")])
        }

        fn metrics_snapshot(&self) -> MetricsSnapshot {
            crate::metrics::ChatMetrics::new().snapshot()
        }
    }
}
