use crate::app::{SessionError, SessionService};
use crate::domain::{DeleteItem, SessionSource, SourceFilter};
use crate::infra::SessionTarget;
use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::net::TcpListener;

#[derive(Debug, Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("http server failed: {0}")]
    Serve(#[source] std::io::Error),
}

/// JSON error body: `{"error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(value: SessionError) -> Self {
        let status = match value {
            SessionError::NotFound(_) => StatusCode::NOT_FOUND,
            SessionError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            SessionError::Empty(_) => StatusCode::UNPROCESSABLE_ENTITY,
            SessionError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: value.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(serde_json::json!({ "error": self.message })),
        )
            .into_response()
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListQuery {
    source: Option<String>,
    limit: Option<usize>,
    #[serde(default)]
    refresh: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SessionQuery {
    source: String,
    session_id: Option<String>,
    file_path: Option<PathBuf>,
    limit: Option<usize>,
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DeleteRequest {
    source: String,
    session_id: Option<String>,
    file_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct BatchDeleteRequest {
    #[serde(default)]
    items: Vec<DeleteItem>,
}

pub fn build_router(service: Arc<SessionService>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/sessions", get(list_sessions))
        .route("/api/sessions/detail", get(session_detail))
        .route("/api/sessions/export", get(export_session))
        .route("/api/sessions/delete", post(delete_session))
        .route("/api/sessions/delete-batch", post(delete_sessions_batch))
        .with_state(service)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

async fn list_sessions(
    State(service): State<Arc<SessionService>>,
    Query(query): Query<ListQuery>,
) -> Result<Response, ApiError> {
    let filter = match query.source.as_deref() {
        Some(raw) => SourceFilter::parse_flag(raw)
            .ok_or_else(|| ApiError::bad_request(format!("unknown source: {raw}")))?,
        None => SourceFilter::All,
    };
    let sessions = service.list_sessions(filter, query.limit, query.refresh);
    Ok(Json(serde_json::json!({ "sessions": sessions })).into_response())
}

async fn session_detail(
    State(service): State<Arc<SessionService>>,
    Query(query): Query<SessionQuery>,
) -> Result<Response, ApiError> {
    let (source, target) = resolve_target(&query.source, query.session_id, query.file_path)?;
    let detail = service.session_detail(source, &target, query.limit).await?;
    Ok(Json(detail).into_response())
}

async fn export_session(
    State(service): State<Arc<SessionService>>,
    Query(query): Query<SessionQuery>,
) -> Result<Response, ApiError> {
    let (source, target) = resolve_target(&query.source, query.session_id, query.file_path)?;
    let export = service.export_session(source, &target).await?;

    match query.format.as_deref() {
        None | Some("json") => Ok(Json(export).into_response()),
        Some("markdown" | "md") => {
            let disposition = format!("attachment; filename=\"{}\"", export.file_name);
            Ok((
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
                    (header::CONTENT_DISPOSITION, disposition),
                ],
                export.content,
            )
                .into_response())
        }
        Some(other) => Err(ApiError::bad_request(format!("unknown export format: {other}"))),
    }
}

async fn delete_session(
    State(service): State<Arc<SessionService>>,
    Json(body): Json<DeleteRequest>,
) -> Result<Response, ApiError> {
    let (source, target) = resolve_target(&body.source, body.session_id, body.file_path)?;
    let path = service.delete_session(source, &target)?;
    Ok(Json(serde_json::json!({ "ok": true, "filePath": path })).into_response())
}

async fn delete_sessions_batch(
    State(service): State<Arc<SessionService>>,
    Json(body): Json<BatchDeleteRequest>,
) -> Result<Response, ApiError> {
    let outcome = service.delete_sessions_batch(&body.items)?;
    Ok(Json(outcome).into_response())
}

fn resolve_target(
    source: &str,
    session_id: Option<String>,
    file_path: Option<PathBuf>,
) -> Result<(SessionSource, SessionTarget), ApiError> {
    let source = SessionSource::parse_flag(source)
        .ok_or_else(|| ApiError::bad_request(format!("unknown source: {source}")))?;
    let target = SessionTarget::from_parts(file_path.as_deref(), session_id.as_deref())
        .ok_or_else(|| ApiError::bad_request("either sessionId or filePath is required"))?;
    Ok((source, target))
}

pub async fn run_http_server(
    addr: SocketAddr,
    service: Arc<SessionService>,
) -> Result<(), ServeError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: addr.to_string(),
            source,
        })?;
    tracing::info!(%addr, "serving session api");

    axum::serve(listener, build_router(service))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(ServeError::Serve)
}

pub async fn run_http_server_on(
    listener: TcpListener,
    service: Arc<SessionService>,
) -> Result<(), ServeError> {
    axum::serve(listener, build_router(service))
        .await
        .map_err(ServeError::Serve)
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::warn!(%error, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppConfig;
    use crate::infra::SourceRoots;
    use serde_json::Value;
    use std::fs;
    use tempfile::tempdir;

    fn get_json(url: String) -> Result<Value, ureq::Error> {
        ureq::get(&url).call()?.body_mut().read_json::<Value>()
    }

    fn status_of(result: Result<Value, ureq::Error>) -> Option<u16> {
        match result {
            Err(ureq::Error::StatusCode(code)) => Some(code),
            _ => None,
        }
    }

    #[test]
    fn maps_session_errors_to_statuses() {
        let cases = [
            (SessionError::NotFound("x".into()), StatusCode::NOT_FOUND),
            (SessionError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (SessionError::Empty("x".into()), StatusCode::UNPROCESSABLE_ENTITY),
            (SessionError::Io("x".into()), StatusCode::INTERNAL_SERVER_ERROR),
        ];
        for (error, expected) in cases {
            assert_eq!(ApiError::from(error).status, expected);
        }
    }

    #[tokio::test]
    async fn serves_list_detail_export_and_delete() {
        let dir = tempdir().expect("tempdir");
        let roots = SourceRoots {
            codex: dir.path().join("codex"),
            claude: dir.path().join("claude"),
        };
        let day = roots.codex.join("2026/02/19");
        fs::create_dir_all(&day).expect("mkdir");
        fs::create_dir_all(&roots.claude).expect("mkdir");
        fs::write(
            day.join("rollout-2026-02-19T10-00-00-abc.jsonl"),
            concat!(
                r#"{"timestamp":"2026-02-19T10:00:00Z","type":"session_meta","payload":{"id":"abc","cwd":"/tmp"}}"#,
                "\n",
                r#"{"timestamp":"2026-02-19T10:00:01Z","type":"response_item","payload":{"type":"message","role":"user","content":[{"type":"input_text","text":"Fix bug"}]}}"#,
                "\n",
                r#"{"timestamp":"2026-02-19T10:00:02Z","type":"response_item","payload":{"type":"message","role":"assistant","content":[{"type":"output_text","text":"Done"}]}}"#,
                "\n"
            ),
        )
        .expect("write");

        let service = Arc::new(SessionService::new(AppConfig::with_roots(roots)));
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0)))
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let server = tokio::spawn(run_http_server_on(listener, service));

        let base = format!("http://{addr}");
        let client = tokio::task::spawn_blocking(move || {
            let health = get_json(format!("{base}/health")).expect("health");
            assert_eq!(health["ok"], true);

            let list = get_json(format!("{base}/api/sessions?source=codex&limit=10")).expect("list");
            let sessions = list["sessions"].as_array().expect("sessions");
            assert_eq!(sessions.len(), 1);
            assert_eq!(sessions[0]["sessionId"], "abc");
            assert_eq!(sessions[0]["title"], "Fix bug");
            assert_eq!(sessions[0]["messageCount"], 2);

            let detail = get_json(format!("{base}/api/sessions/detail?source=codex&sessionId=abc"))
                .expect("detail");
            assert_eq!(detail["totalMessages"], 2);
            assert_eq!(detail["messages"][1]["text"], "Done");

            let export = get_json(format!("{base}/api/sessions/export?source=codex&sessionId=abc"))
                .expect("export");
            assert_eq!(export["fileName"], "codex-abc.md");
            assert!(export["content"].as_str().is_some_and(|c| c.contains("Fix bug")));

            let bad_source = get_json(format!("{base}/api/sessions/detail?source=nope&sessionId=abc"));
            assert_eq!(status_of(bad_source), Some(400));
            let missing = get_json(format!("{base}/api/sessions/detail?source=claude&sessionId=abc"));
            assert_eq!(status_of(missing), Some(404));

            let deleted: Value = ureq::post(&format!("{base}/api/sessions/delete"))
                .send_json(serde_json::json!({ "source": "codex", "sessionId": "abc" }))
                .expect("delete")
                .body_mut()
                .read_json()
                .expect("delete body");
            assert_eq!(deleted["ok"], true);

            let empty_batch = ureq::post(&format!("{base}/api/sessions/delete-batch"))
                .send_json(serde_json::json!({ "items": [] }));
            assert!(matches!(empty_batch, Err(ureq::Error::StatusCode(400))));

            let after = get_json(format!("{base}/api/sessions?source=codex")).expect("list");
            assert_eq!(after["sessions"].as_array().map(Vec::len), Some(0));
        });
        client.await.expect("client checks");
        server.abort();
    }
}
