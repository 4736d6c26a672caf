//! HTTP server for the funnel dashboard.
//!
//! # API Endpoints
//!
//! | Method | Path                          | Description                      |
//! |--------|-------------------------------|----------------------------------|
//! | GET    | `/health`                     | Health check                     |
//! | POST   | `/api/upload`                 | Upload CSV files, open a session |
//! | GET    | `/api/sessions/{id}`          | Current dashboard snapshot       |
//! | POST   | `/api/sessions/{id}/filters`  | Apply filters, new snapshot      |
//! | DELETE | `/api/sessions/{id}`          | Drop a session                   |
//! | GET    | `/api/logs?session={id}`      | SSE stream for real-time logs    |
//!
//! An upload may carry a `session` field (a UUID) naming the session it
//! fills; the client can then follow that session's logs while the upload
//! runs.

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Multipart, Path, Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use std::{convert::Infallible, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use super::logs::{log_session, LogLevel, LOG_BROADCASTER};
use super::types::{error_response, SnapshotResponse, UploadResponse};
use crate::clean::UploadedFile;
use crate::config::ServerConfig;
use crate::dashboard::Filters;
use crate::error::{ServerError, ServerResult};
use crate::session::{Session, SessionStore};
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct AppState {
    pub sessions: SessionStore,
}

impl AppState {
    pub fn new(config: &ServerConfig) -> Self {
        Self {
            sessions: SessionStore::with_limits(config.session_idle, config.max_sessions),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct LogQuery {
    session: Option<String>,
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(error_response(&self.to_string()))).into_response()
    }
}

/// Build the application router.
pub fn router(state: AppState, config: &ServerConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    let app = Router::new()
        .route("/health", get(health))
        .route("/api/upload", post(upload_csv))
        .route("/api/sessions/{id}", get(get_session).delete(delete_session))
        .route("/api/sessions/{id}/filters", post(apply_filters))
        .route("/api/logs", get(sse_logs));

    let app = match &config.static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app.route("/", get(health)),
    };

    app.layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let app = router(AppState::new(&config), &config);
    let addr = config.addr();

    println!("🚀 Funnel server running on http://{}", addr);
    println!("   POST   /api/upload                 - Upload CSV files");
    println!("   GET    /api/sessions/{{id}}          - Dashboard snapshot");
    println!("   POST   /api/sessions/{{id}}/filters  - Apply filters");
    println!("   GET    /api/logs                   - SSE log stream");
    println!("   GET    /health                     - Health check");
    if let Some(dir) = &config.static_dir {
        println!("   📁 Serving frontend from {}", dir.display());
    }
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "funnel",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "POST /api/upload",
            "session": "GET /api/sessions/{id}",
            "filters": "POST /api/sessions/{id}/filters",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming, limited to one session's entries
async fn sse_logs(
    Query(query): Query<LogQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(move |result| {
        let entry = result.ok()?;
        if !entry.visible_to(query.session.as_deref()) {
            return None;
        }
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload endpoint: every `file` field is part of one batch.
async fn upload_csv(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ServerResult<Json<UploadResponse>> {
    let mut files: Vec<UploadedFile> = Vec::new();
    let mut session_id: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        match field.name() {
            Some("file") => {}
            Some("session") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
                session_id = Some(parse_session_id(&text)?);
                continue;
            }
            _ => continue,
        }
        let name = field
            .file_name()
            .map(String::from)
            .unwrap_or_else(|| format!("file-{}.csv", files.len() + 1));
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?;
        files.push(UploadedFile::new(name, bytes.to_vec()));
    }

    if files.is_empty() {
        return Err(ServerError::BadRequest("No file provided".into()));
    }

    println!("\n{}", "=".repeat(70));
    println!("📄 NEW UPLOAD: {} file(s)", files.len());
    for f in &files {
        println!("   {} ({} bytes)", f.name, f.bytes.len());
    }
    println!("{}\n", "=".repeat(70));

    let mut session = match &session_id {
        Some(id) => match state.sessions.get(id).await {
            Some(existing) => existing,
            None => Session::with_id(id.clone()),
        },
        None => Session::new(),
    };

    let (session, outcome) = tokio::task::spawn_blocking(move || {
        let outcome = session.on_upload(&files);
        (session, outcome)
    })
    .await
    .map_err(|e| ServerError::Internal(e.to_string()))?;

    let outcome = outcome.map_err(|e| {
        log_session(&session.id, LogLevel::Error, e.to_string());
        ServerError::from(e)
    })?;

    let counts = outcome.snapshot.tables;
    println!("\n{}", "=".repeat(70));
    println!("📊 SUMMARY");
    println!("{}", "=".repeat(70));
    println!("   Session:  {}", session.id);
    println!("   MQL:      {}", display_count(counts.mql));
    println!("   CLD:      {}", display_count(counts.cld));
    println!("   Orders:   {}", display_count(counts.order));
    println!("   Merged:   {}", display_count(counts.merged));
    if !outcome.ignored.is_empty() {
        println!("   Ignored:  {}", outcome.ignored.join(", "));
    }
    println!("{}\n", "=".repeat(70));

    let response = UploadResponse::new(session.id.clone(), outcome);
    state.sessions.insert(session).await;

    Ok(Json(response))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<Json<SnapshotResponse>> {
    let snapshot = state
        .sessions
        .snapshot(&id)
        .await
        .ok_or_else(|| ServerError::SessionNotFound(id.clone()))?;

    Ok(Json(SnapshotResponse {
        session_id: id,
        snapshot: (*snapshot).clone(),
    }))
}

async fn apply_filters(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<Filters>, JsonRejection>,
) -> ServerResult<Json<SnapshotResponse>> {
    let Json(filters) = body.map_err(|e| ServerError::BadRequest(e.body_text()))?;

    let snapshot = state
        .sessions
        .update(&id, |session| session.on_filter_change(filters))
        .await
        .ok_or_else(|| ServerError::SessionNotFound(id.clone()))?;

    Ok(Json(SnapshotResponse {
        session_id: id,
        snapshot: (*snapshot).clone(),
    }))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ServerResult<StatusCode> {
    if state.sessions.remove(&id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ServerError::SessionNotFound(id))
    }
}

fn parse_session_id(text: &str) -> ServerResult<String> {
    Uuid::parse_str(text.trim())
        .map(|id| id.to_string())
        .map_err(|_| ServerError::BadRequest(format!("Invalid session id: {:?}", text)))
}

fn display_count(n: Option<usize>) -> String {
    n.map_or_else(|| "-".to_string(), |n| n.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tower::ServiceExt;

    const BOUNDARY: &str = "funnel-test-boundary";

    const LEADS: &str = "mql_id,first_contact_date,landing_page_id,origin\n\
                         1,2021-01-01,lp1,ads\n\
                         2,2021-01-03,lp2,social";

    const DEALS: &str = "mql_id,seller_id,sdr_id,sr_id,won_date,business_segment,lead_type,\
lead_behaviour_profile,has_company,has_gtin,average_stock,business_type,declared_product_catalog_size\n\
                         1,s1,d1,r1,2021-01-10,retail,online_big,cat,,,,reseller,";

    fn app() -> Router {
        router(AppState::default(), &ServerConfig::default())
    }

    fn multipart(files: &[(&str, &str)]) -> Request<Body> {
        multipart_for(None, files)
    }

    fn multipart_for(session: Option<&str>, files: &[(&str, &str)]) -> Request<Body> {
        let mut body = String::new();
        if let Some(id) = session {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"session\"\r\n\r\n{id}\r\n"
            ));
        }
        for (name, content) in files {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\n\
                 Content-Type: text/csv\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));

        Request::post("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(resp: Response) -> Value {
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let resp = app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_upload_then_filter_then_delete() {
        let state = AppState::default();
        let app = router(state.clone(), &ServerConfig::default());

        let resp = app
            .clone()
            .oneshot(multipart(&[("leads.csv", LEADS), ("deals.csv", DEALS)]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["status"], "ready");
        assert_eq!(body["snapshot"]["kpis"]["closedDeals"], 1);
        assert_eq!(body["snapshot"]["tables"]["merged"], 1);
        let id = body["sessionId"].as_str().unwrap().to_string();

        let resp = app
            .clone()
            .oneshot(
                Request::post(format!("/api/sessions/{id}/filters"))
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(r#"{"segments":[]}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["snapshot"]["kpis"]["closedDeals"], 0);

        let resp = app
            .clone()
            .oneshot(
                Request::delete(format!("/api/sessions/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert_eq!(state.sessions.count().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_session_is_404() {
        let resp = app()
            .oneshot(
                Request::get("/api/sessions/nope")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(resp).await["status"], "error");
    }

    #[tokio::test]
    async fn test_cleaning_failure_is_400() {
        let resp = app()
            .oneshot(multipart(&[(
                "broken.csv",
                "mql_id,first_contact_date,origin\n1,someday,ads",
            )]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body = json_body(resp).await;
        assert!(body["error"].as_str().unwrap().contains("broken.csv"));
    }

    #[tokio::test]
    async fn test_ignored_files_reported() {
        let resp = app()
            .oneshot(multipart(&[
                ("customers.csv", "customer_id,customer_city\nc1,rio"),
                ("leads.csv", LEADS),
            ]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["status"], "warning");
        assert_eq!(body["ignored"][0], "customers.csv");
    }

    #[tokio::test]
    async fn test_upload_into_named_session() {
        let state = AppState::default();
        let app = router(state.clone(), &ServerConfig::default());
        let id = Uuid::new_v4().to_string();

        let resp = app
            .clone()
            .oneshot(multipart_for(Some(&id), &[("leads.csv", LEADS)]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["sessionId"], id.as_str());

        // a second batch replaces the tables of the same session
        let resp = app
            .oneshot(multipart_for(Some(&id), &[("leads.csv", LEADS), ("deals.csv", DEALS)]))
            .await
            .unwrap();
        assert_eq!(json_body(resp).await["snapshot"]["kpis"]["closedDeals"], 1);
        assert_eq!(state.sessions.count().await, 1);
    }

    #[tokio::test]
    async fn test_invalid_session_field_is_400() {
        let resp = app()
            .oneshot(multipart_for(Some("../../etc"), &[("leads.csv", LEADS)]))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_state_follows_session_limits() {
        let config = ServerConfig {
            max_sessions: 2,
            ..ServerConfig::default()
        };
        let state = AppState::new(&config);
        let app = router(state.clone(), &config);
        for _ in 0..4 {
            let resp = app
                .clone()
                .oneshot(multipart(&[("leads.csv", LEADS)]))
                .await
                .unwrap();
            assert_eq!(resp.status(), StatusCode::OK);
        }
        assert_eq!(state.sessions.count().await, 2);
    }

    #[tokio::test]
    async fn test_upload_without_files_is_400() {
        let resp = app().oneshot(multipart(&[])).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
