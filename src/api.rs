//! HTTP surface for deskbot.
//!
//! The router exposes the chat endpoint, the ingestion endpoints for both user and
//! admin origins, and the read-only dashboard endpoints:
//!
//! - `POST /chat` – Answer a message with display-ready HTML.
//! - `POST /uploads`, `POST /urls` – End-user ingestion from the chat widget.
//! - `POST /admin/documents`, `POST /admin/urls` – Admin ingestion.
//! - `GET /stats`, `GET /knowledge`, `GET /sessions`, `GET /chat-logs` – Dashboard reads.
//! - `POST /sessions/end` – Mark a session ended.
//!
//! Handlers are generic over [`BackendApi`], so router tests run against a stub
//! service without a database or outbound network.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;
use uuid::Uuid;

use crate::ingest::{IngestError, IngestReport, Source};
use crate::ledger::{LedgerError, Origin, SourceKind};
use crate::service::BackendApi;

/// Largest accepted PDF upload.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
/// Chat turns returned by `GET /chat-logs`.
const CHAT_LOG_LIMIT: i64 = 50;
/// Display truncation applied to logged messages and responses.
const CHAT_LOG_PREVIEW_CHARS: usize = 100;

/// Build the HTTP router over the given backend.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: BackendApi + 'static,
{
    Router::new()
        .route("/chat", post(chat::<S>))
        .route("/uploads", post(user_upload::<S>))
        .route("/urls", post(user_url::<S>))
        .route("/admin/documents", post(admin_upload::<S>))
        .route("/admin/urls", post(admin_url::<S>))
        .route("/stats", get(stats::<S>))
        .route("/knowledge", get(knowledge::<S>))
        .route("/sessions", get(sessions::<S>))
        .route("/chat-logs", get(chat_logs::<S>))
        .route("/sessions/end", post(end_session::<S>))
        // leave headroom for multipart framing around the file itself
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 64 * 1024))
        .with_state(service)
}

/// Request body for `POST /chat`.
#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    session_id: Option<String>,
}

/// Answer a chat message. A missing session identifier gets a fresh UUID so the
/// turn is still grouped under some session.
async fn chat<S>(State(service): State<Arc<S>>, Json(request): Json<ChatRequest>) -> Html<String>
where
    S: BackendApi,
{
    let session_id = request
        .session_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());
    Html(service.respond(&request.message, &session_id).await)
}

/// Success response for the ingestion endpoints.
#[derive(Serialize)]
struct IngestResponse {
    success: bool,
    message: &'static str,
    name: String,
    /// Chunks produced from the extracted text.
    chunks_attempted: usize,
    /// Chunks that made it into the vector index.
    chunks_indexed: usize,
}

impl IngestResponse {
    fn from_report(report: IngestReport, kind: SourceKind) -> Self {
        Self {
            success: true,
            message: match kind {
                SourceKind::Pdf => "PDF uploaded and processed successfully",
                SourceKind::Url => "URL content added to knowledge base successfully",
            },
            name: report.name,
            chunks_attempted: report.chunks_attempted,
            chunks_indexed: report.chunks_indexed,
        }
    }
}

async fn user_upload<S>(
    State(service): State<Arc<S>>,
    multipart: Multipart,
) -> Result<Json<IngestResponse>, AppError>
where
    S: BackendApi,
{
    ingest_pdf(&*service, multipart, Origin::User).await
}

async fn admin_upload<S>(
    State(service): State<Arc<S>>,
    multipart: Multipart,
) -> Result<Json<IngestResponse>, AppError>
where
    S: BackendApi,
{
    ingest_pdf(&*service, multipart, Origin::Admin).await
}

async fn ingest_pdf<S>(
    service: &S,
    multipart: Multipart,
    origin: Origin,
) -> Result<Json<IngestResponse>, AppError>
where
    S: BackendApi + ?Sized,
{
    let upload = read_pdf_upload(multipart).await?;
    tracing::info!(
        name = %upload.file_name,
        bytes = upload.bytes.len(),
        origin = origin.as_str(),
        "Accepted PDF upload"
    );
    let report = service
        .ingest(
            Source::Pdf {
                file_name: upload.file_name,
                bytes: upload.bytes,
            },
            origin,
            upload.session_id.as_deref(),
        )
        .await?;
    Ok(Json(IngestResponse::from_report(report, SourceKind::Pdf)))
}

/// Request body for the URL ingestion endpoints.
#[derive(Deserialize)]
struct UrlRequest {
    url: String,
    #[serde(default)]
    session_id: Option<String>,
}

async fn user_url<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<UrlRequest>,
) -> Result<Json<IngestResponse>, AppError>
where
    S: BackendApi,
{
    ingest_url(&*service, request, Origin::User).await
}

async fn admin_url<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<UrlRequest>,
) -> Result<Json<IngestResponse>, AppError>
where
    S: BackendApi,
{
    ingest_url(&*service, request, Origin::Admin).await
}

async fn ingest_url<S>(
    service: &S,
    request: UrlRequest,
    origin: Origin,
) -> Result<Json<IngestResponse>, AppError>
where
    S: BackendApi + ?Sized,
{
    let url = parse_public_url(&request.url)?;
    tracing::info!(url = %url, origin = origin.as_str(), "Accepted URL ingestion");
    let report = service
        .ingest(
            Source::Url { url },
            origin,
            request.session_id.as_deref(),
        )
        .await?;
    Ok(Json(IngestResponse::from_report(report, SourceKind::Url)))
}

async fn stats<S>(State(service): State<Arc<S>>) -> Result<Response, AppError>
where
    S: BackendApi,
{
    Ok(Json(service.stats().await?).into_response())
}

async fn knowledge<S>(State(service): State<Arc<S>>) -> Result<Response, AppError>
where
    S: BackendApi,
{
    Ok(Json(service.knowledge_items().await?).into_response())
}

async fn sessions<S>(State(service): State<Arc<S>>) -> Result<Response, AppError>
where
    S: BackendApi,
{
    Ok(Json(service.sessions().await?).into_response())
}

/// Display row for `GET /chat-logs`, with long texts truncated.
#[derive(Serialize)]
struct ChatLogPreview {
    session_id: String,
    timestamp: String,
    user_message: String,
    bot_response: String,
    response_time: f64,
}

async fn chat_logs<S>(State(service): State<Arc<S>>) -> Result<Json<Vec<ChatLogPreview>>, AppError>
where
    S: BackendApi,
{
    let rows = service.recent_chats(CHAT_LOG_LIMIT).await?;
    let previews = rows
        .into_iter()
        .map(|row| ChatLogPreview {
            session_id: row.session_id,
            timestamp: row.timestamp,
            user_message: truncate_chars(&row.user_message, CHAT_LOG_PREVIEW_CHARS),
            bot_response: truncate_chars(&row.bot_response, CHAT_LOG_PREVIEW_CHARS),
            response_time: row.response_time,
        })
        .collect();
    Ok(Json(previews))
}

/// Request body for `POST /sessions/end`.
#[derive(Deserialize)]
struct EndSessionRequest {
    session_id: String,
}

async fn end_session<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<EndSessionRequest>,
) -> Result<Json<serde_json::Value>, AppError>
where
    S: BackendApi,
{
    service.end_session(&request.session_id).await?;
    Ok(Json(json!({ "success": true })))
}

struct PdfUpload {
    file_name: String,
    bytes: Vec<u8>,
    session_id: Option<String>,
}

async fn read_pdf_upload(mut multipart: Multipart) -> Result<PdfUpload, AppError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut session_id = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::Validation(format!("malformed multipart body: {err}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field
                    .file_name()
                    .map(str::to_string)
                    .filter(|name| !name.is_empty())
                    .ok_or_else(|| AppError::Validation("upload is missing a file name".into()))?;
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|err| AppError::Validation(format!("failed to read upload: {err}")))?;
                file = Some((file_name, bytes.to_vec()));
            }
            Some("session_id") => {
                let value = field
                    .text()
                    .await
                    .map_err(|err| AppError::Validation(format!("failed to read upload: {err}")))?;
                if !value.trim().is_empty() {
                    session_id = Some(value);
                }
            }
            _ => {}
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| AppError::Validation("missing multipart field 'file'".into()))?;
    if !file_name.to_lowercase().ends_with(".pdf") {
        return Err(AppError::Validation("only PDF files are supported".into()));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(
            "file exceeds the 10 MB upload limit".into(),
        ));
    }

    Ok(PdfUpload {
        file_name,
        bytes,
        session_id,
    })
}

/// Validate an ingestion URL: absolute, http(s), and host-bearing.
fn parse_public_url(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw.trim())
        .map_err(|err| AppError::Validation(format!("invalid URL: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(AppError::Validation(
            "URL must use http or https and include a host".into(),
        ));
    }
    Ok(url)
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

/// Error envelope for the HTTP surface.
enum AppError {
    /// Caller mistake, reported verbatim with a 400.
    Validation(String),
    /// Ingestion failure; extraction causes are reported, everything else is logged.
    Ingest(IngestError),
    /// Ledger read/write failure behind a dashboard endpoint.
    Ledger(LedgerError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            Self::Validation(message) => (StatusCode::BAD_REQUEST, message),
            Self::Ingest(IngestError::Extraction(err)) => {
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
            Self::Ingest(err) => {
                tracing::error!(error = %err, "Ingestion failed internally");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
            }
            Self::Ledger(err) => {
                tracing::error!(error = %err, "Dashboard query failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal error".into())
            }
        };
        (status, Json(json!({ "error": error }))).into_response()
    }
}

impl From<IngestError> for AppError {
    fn from(inner: IngestError) -> Self {
        Self::Ingest(inner)
    }
}

impl From<LedgerError> for AppError {
    fn from(inner: LedgerError) -> Self {
        Self::Ledger(inner)
    }
}

#[cfg(test)]
mod tests {
    use super::{create_router, parse_public_url, truncate_chars};
    use crate::extract::ExtractError;
    use crate::ingest::{IngestError, IngestReport, Source};
    use crate::ledger::{
        ChatLogRow, DashboardStats, KnowledgeItem, LedgerError, Origin, SessionRow,
    };
    use crate::service::BackendApi;
    use async_trait::async_trait;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request, StatusCode, header::CONTENT_TYPE},
    };
    use serde_json::json;
    use std::sync::Arc;
    use tokio::sync::Mutex;
    use tower::ServiceExt;
    use uuid::Uuid;

    const BOUNDARY: &str = "test-boundary";

    #[derive(Clone, Debug)]
    struct RecordedIngest {
        name: String,
        origin: Origin,
        session_id: Option<String>,
    }

    #[derive(Default)]
    struct StubBackend {
        ingests: Mutex<Vec<RecordedIngest>>,
        chats: Mutex<Vec<(String, String)>>,
        fail_url_fetch: bool,
        chat_log: Vec<ChatLogRow>,
    }

    impl StubBackend {
        async fn recorded_ingests(&self) -> Vec<RecordedIngest> {
            self.ingests.lock().await.clone()
        }
    }

    #[async_trait]
    impl BackendApi for StubBackend {
        async fn respond(&self, message: &str, session_id: &str) -> String {
            self.chats
                .lock()
                .await
                .push((message.to_string(), session_id.to_string()));
            "<p>stub answer</p>".to_string()
        }

        async fn ingest(
            &self,
            source: Source,
            origin: Origin,
            session_id: Option<&str>,
        ) -> Result<IngestReport, IngestError> {
            if self.fail_url_fetch && matches!(source, Source::Url { .. }) {
                return Err(IngestError::Extraction(ExtractError::Fetch(
                    "connection refused".into(),
                )));
            }
            let name = source.display_name();
            self.ingests.lock().await.push(RecordedIngest {
                name: name.clone(),
                origin,
                session_id: session_id.map(str::to_string),
            });
            Ok(IngestReport {
                item_id: "item-1".into(),
                name,
                chunks_attempted: 3,
                chunks_indexed: 2,
            })
        }

        async fn stats(&self) -> Result<DashboardStats, LedgerError> {
            Ok(DashboardStats {
                total_chats: 7,
                active_sessions: 2,
                knowledge_items: 4,
            })
        }

        async fn knowledge_items(&self) -> Result<Vec<KnowledgeItem>, LedgerError> {
            Ok(Vec::new())
        }

        async fn sessions(&self) -> Result<Vec<SessionRow>, LedgerError> {
            Ok(Vec::new())
        }

        async fn recent_chats(&self, _limit: i64) -> Result<Vec<ChatLogRow>, LedgerError> {
            Ok(self.chat_log.clone())
        }

        async fn end_session(&self, _session_id: &str) -> Result<(), LedgerError> {
            Ok(())
        }
    }

    fn multipart_pdf(file_name: &str, session_id: Option<&str>) -> (String, String) {
        let mut body = String::new();
        if let Some(session) = session_id {
            body.push_str(&format!(
                "--{BOUNDARY}\r\ncontent-disposition: form-data; name=\"session_id\"\r\n\r\n{session}\r\n"
            ));
        }
        body.push_str(&format!(
            "--{BOUNDARY}\r\ncontent-disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\ncontent-type: application/pdf\r\n\r\n%PDF-1.4 stub\r\n--{BOUNDARY}--\r\n"
        ));
        (
            format!("multipart/form-data; boundary={BOUNDARY}"),
            body,
        )
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn chat_generates_a_session_when_none_is_supplied() {
        let backend = Arc::new(StubBackend::default());
        let app = create_router(backend.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/chat")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "message": "hello" }).to_string()))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        assert_eq!(&bytes[..], b"<p>stub answer</p>");

        let chats = backend.chats.lock().await;
        assert_eq!(chats.len(), 1);
        assert_eq!(chats[0].0, "hello");
        Uuid::parse_str(&chats[0].1).expect("generated session id is a UUID");
    }

    #[tokio::test]
    async fn admin_document_upload_runs_with_admin_origin() {
        let backend = Arc::new(StubBackend::default());
        let app = create_router(backend.clone());

        let (content_type, body) = multipart_pdf("guide.pdf", None);
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/admin/documents")
                    .header(CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["success"], true);
        assert_eq!(json["name"], "guide.pdf");
        assert_eq!(json["chunks_attempted"], 3);
        assert_eq!(json["chunks_indexed"], 2);

        let calls = backend.recorded_ingests().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].origin, Origin::Admin);
        assert_eq!(calls[0].session_id, None);
    }

    #[tokio::test]
    async fn user_upload_carries_the_session_and_user_origin() {
        let backend = Arc::new(StubBackend::default());
        let app = create_router(backend.clone());

        let (content_type, body) = multipart_pdf("notes.pdf", Some("session-9"));
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/uploads")
                    .header(CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let calls = backend.recorded_ingests().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].origin, Origin::User);
        assert_eq!(calls[0].session_id.as_deref(), Some("session-9"));
    }

    #[tokio::test]
    async fn non_pdf_upload_is_rejected_before_the_pipeline() {
        let backend = Arc::new(StubBackend::default());
        let app = create_router(backend.clone());

        let (content_type, body) = multipart_pdf("notes.txt", None);
        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/uploads")
                    .header(CONTENT_TYPE, content_type)
                    .body(Body::from(body))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"], "only PDF files are supported");
        assert!(backend.recorded_ingests().await.is_empty());
    }

    #[tokio::test]
    async fn malformed_url_is_rejected_before_the_pipeline() {
        let backend = Arc::new(StubBackend::default());
        let app = create_router(backend.clone());

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/urls")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(json!({ "url": "not a url" }).to_string()))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(backend.recorded_ingests().await.is_empty());
    }

    #[tokio::test]
    async fn extraction_failure_surfaces_the_cause() {
        let backend = Arc::new(StubBackend {
            fail_url_fetch: true,
            ..StubBackend::default()
        });
        let app = create_router(backend);

        let response = app
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/admin/urls")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "url": "https://help.example.org/faq" }).to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let json = body_json(response).await;
        let error = json["error"].as_str().expect("error string");
        assert!(error.contains("connection refused"));
    }

    #[tokio::test]
    async fn chat_logs_truncate_long_texts_for_display() {
        let backend = Arc::new(StubBackend {
            chat_log: vec![ChatLogRow {
                session_id: "s".into(),
                timestamp: "2026-01-01T00:00:00Z".into(),
                user_message: "m".repeat(400),
                bot_response: "r".repeat(400),
                response_time: 0.4,
            }],
            ..StubBackend::default()
        });
        let app = create_router(backend);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/chat-logs")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json[0]["user_message"].as_str().map(str::len), Some(100));
        assert_eq!(json[0]["bot_response"].as_str().map(str::len), Some(100));
    }

    #[tokio::test]
    async fn stats_endpoint_reports_counters() {
        let app = create_router(Arc::new(StubBackend::default()));

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/stats")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router response");

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["total_chats"], 7);
        assert_eq!(json["active_sessions"], 2);
        assert_eq!(json["knowledge_items"], 4);
    }

    #[test]
    fn url_validation_requires_http_scheme_and_host() {
        assert!(parse_public_url("https://help.example.org/faq").is_ok());
        assert!(parse_public_url(" http://example.org ").is_ok());
        assert!(parse_public_url("ftp://example.org/file").is_err());
        assert!(parse_public_url("example.org/faq").is_err());
        assert!(parse_public_url("data:text/plain,hello").is_err());
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        assert_eq!(truncate_chars("héllo", 3), "hél");
        assert_eq!(truncate_chars("short", 100), "short");
    }
}
