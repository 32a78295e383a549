//! Dashboard HTTP API.
//!
//! Serves chart-ready JSON for every dashboard panel so any front end can
//! draw the pies, bubbles and bars without re-implementing aggregation.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET` | `/health` | Health check |
//! | `GET` | `/api/projects?search=&selected=` | Projects table |
//! | `GET` | `/api/licenses` | License types pie |
//! | `GET` | `/api/mime/top?count=` | Top-N MIME types pie |
//! | `GET` | `/api/mime/all` | All MIME types bubble hierarchy |
//! | `GET` | `/api/audit` | Per-project license bars |
//! | `GET` | `/api/files?repo=&search=` | Files of one repository |
//! | `POST` | `/api/actions` | Submit an action form |
//! | `GET` | `/api/state` | Shared application state |
//!
//! # Error Responses
//!
//! All errors return JSON with a consistent shape:
//!
//! ```json
//! { "error": { "code": "backend_unavailable", "message": "audit: Error fetching data" } }
//! ```
//!
//! # CORS
//!
//! All origins are allowed to support browser-based dashboards.

use anyhow::Result;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use proteus_core::chart::TopNPolicy;
use proteus_core::state::{AppState, SharedState};

use crate::action::{ActionForm, ActionSubmitter, SubmitError};
use crate::backends::{self, Backends};
use crate::config::Config;
use crate::fetch::FetchCoordinator;
use crate::panels::{
    AllMimeTypes, AuditSummary, LicenseTypes, ProjectFiles, ProjectsTable, TopMimeTypes,
};
use crate::view::{Panel, ViewController, ViewState};

/// Shared state for the server.
#[derive(Clone)]
pub struct ServerState {
    backends: Backends,
    page_rows: usize,
    top_n: TopNPolicy,
    session: SharedState,
}

impl ServerState {
    pub fn new(config: &Config, backends: Backends) -> Self {
        Self {
            backends,
            page_rows: config.backend.page_rows,
            top_n: config.dashboard.top_n_policy(),
            session: SharedState::new(),
        }
    }

    /// Mount a view for `panel`, wait for its load and return the data.
    async fn load<P: Panel>(&self, panel: P) -> Result<P::Output, AppError> {
        let name = panel.name();
        let fetch = FetchCoordinator::new(name, self.backends.search.clone(), self.page_rows);
        let view = ViewController::new(panel, fetch);
        view.mount().await;
        let state = view.state();
        view.unmount();

        match state {
            ViewState::Ready { data, .. } => Ok(data),
            ViewState::Failed { message } => Err(backend_unavailable(format!("{}: {}", name, message))),
            ViewState::Idle | ViewState::Loading => {
                Err(internal(format!("{}: load did not complete", name)))
            }
        }
    }
}

/// Build the API router. Split out from [`run_server`] so tests can serve
/// it on an ephemeral port.
pub fn router(state: ServerState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/api/projects", get(handle_projects))
        .route("/api/licenses", get(handle_licenses))
        .route("/api/mime/top", get(handle_mime_top))
        .route("/api/mime/all", get(handle_mime_all))
        .route("/api/audit", get(handle_audit))
        .route("/api/files", get(handle_files))
        .route("/api/actions", post(handle_action))
        .route("/api/state", get(handle_state))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// Start the dashboard API on `server.bind` and serve until the process
/// exits.
pub async fn run_server(config: &Config) -> Result<()> {
    let bind_addr = config.server.bind.clone();
    let state = ServerState::new(config, backends::connect(config)?);
    let app = router(state);

    tracing::info!(%bind_addr, "dashboard API listening");
    println!("Dashboard API listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    /// Machine-readable error code (e.g., `"bad_request"`).
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

/// Constructs a 400 Bad Request error.
fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

/// Constructs a 502 error for a failed backend request.
fn backend_unavailable(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_GATEWAY,
        code: "backend_unavailable".to_string(),
        message: message.into(),
    }
}

fn internal(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

impl From<SubmitError> for AppError {
    fn from(err: SubmitError) -> Self {
        match err {
            SubmitError::Validation(e) => bad_request(e.to_string()),
            SubmitError::Backend(e) => backend_unavailable(format!("action request failed: {}", e)),
        }
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ Panels ============

type ApiState = State<Arc<ServerState>>;

#[derive(Deserialize, Default)]
struct ProjectsParams {
    #[serde(default)]
    search: String,
    selected: Option<String>,
}

async fn handle_projects(
    State(state): ApiState,
    Query(params): Query<ProjectsParams>,
) -> Result<impl IntoResponse, AppError> {
    let panel = ProjectsTable {
        search: params.search,
        selected: params.selected.filter(|s| !s.trim().is_empty()),
    };
    Ok(Json(state.load(panel).await?))
}

async fn handle_licenses(State(state): ApiState) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.load(LicenseTypes).await?))
}

#[derive(Deserialize, Default)]
struct TopParams {
    /// Raw count field; absent means the configured default.
    count: Option<String>,
}

async fn handle_mime_top(
    State(state): ApiState,
    Query(params): Query<TopParams>,
) -> Result<impl IntoResponse, AppError> {
    let count = match params.count {
        Some(raw) => state.top_n.parse(&raw),
        None => state.top_n.initial(),
    };
    Ok(Json(state.load(TopMimeTypes { count }).await?))
}

async fn handle_mime_all(State(state): ApiState) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.load(AllMimeTypes).await?))
}

async fn handle_audit(State(state): ApiState) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.load(AuditSummary::default()).await?))
}

#[derive(Deserialize, Default)]
struct FilesParams {
    #[serde(default)]
    repo: String,
    #[serde(default)]
    search: String,
}

async fn handle_files(
    State(state): ApiState,
    Query(params): Query<FilesParams>,
) -> Result<impl IntoResponse, AppError> {
    if params.repo.trim().is_empty() {
        return Err(bad_request("repo must not be empty"));
    }
    let panel = ProjectFiles {
        repo: params.repo,
        search: params.search,
    };
    Ok(Json(state.load(panel).await?))
}

// ============ Actions and state ============

async fn handle_action(
    State(state): ApiState,
    Json(form): Json<ActionForm>,
) -> Result<Json<AppState>, AppError> {
    let submitter = ActionSubmitter::new(state.backends.actions.clone(), state.session.clone());
    submitter.submit(&form).await?;
    Ok(Json(state.session.snapshot()))
}

async fn handle_state(State(state): ApiState) -> Json<AppState> {
    Json(state.session.snapshot())
}
