use std::sync::Arc;

use anyhow::Result;
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::info;

use crate::contract::ScanMode;
use crate::view::{ScanClient, SkipReason};

#[derive(Clone)]
pub struct AppState {
    client: Arc<ScanClient>, // one view shared by every browser tab
}

impl AppState {
    pub fn new(client: Arc<ScanClient>) -> Self {
        Self { client }
    }
}

#[derive(Debug, Deserialize)]
pub struct TargetRequest {
    pub target: String,
}

#[derive(Debug, Deserialize)]
pub struct ModeRequest {
    pub mode: ScanMode,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub mode: Option<ScanMode>,
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: &'static str,
}

/// JSON API under `/api`, static UI from `ui_dir` for everything else.
pub fn router(state: AppState, ui_dir: &str) -> Router {
    let api = Router::new()
        .route("/state", get(get_state))
        .route("/target", post(post_target))
        .route("/mode", post(post_mode))
        .route("/scan", post(post_scan))
        .route("/reset", post(post_reset))
        .with_state(state);

    let static_svc = ServeDir::new(ui_dir).append_index_html_on_directories(true);

    Router::new()
        .nest("/api", api)
        .fallback_service(static_svc)
        .layer(TraceLayer::new_for_http())
}

/// Serve the UI on `bind` until `shutdown` is cancelled.
pub async fn spawn_server(bind: &str, client: Arc<ScanClient>, shutdown: CancellationToken) -> Result<()> {
    let app = router(AppState::new(client), "ui");
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("serving UI on http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await?;
    Ok(())
}

async fn get_state(State(app): State<AppState>) -> impl IntoResponse {
    (StatusCode::OK, Json(app.client.snapshot().await))
}

async fn post_target(State(app): State<AppState>, Json(req): Json<TargetRequest>) -> impl IntoResponse {
    app.client.set_target(req.target).await;
    (StatusCode::OK, Json(app.client.snapshot().await))
}

async fn post_mode(State(app): State<AppState>, Json(req): Json<ModeRequest>) -> impl IntoResponse {
    app.client.select_mode(req.mode).await;
    (StatusCode::OK, Json(app.client.snapshot().await))
}

async fn post_reset(State(app): State<AppState>) -> impl IntoResponse {
    app.client.reset().await;
    (StatusCode::OK, Json(app.client.snapshot().await))
}

async fn post_scan(State(app): State<AppState>, Json(req): Json<ScanRequest>) -> impl IntoResponse {
    if let Some(target) = req.target {
        app.client.set_target(target).await;
    }
    if let Some(mode) = req.mode {
        app.client.select_mode(mode).await;
    }

    let ticket = match app.client.begin().await {
        Ok(t) => t,
        Err(reason) => {
            let (status, error) = match reason {
                SkipReason::EmptyTarget => (StatusCode::BAD_REQUEST, "target is empty"),
                SkipReason::InFlight => (StatusCode::CONFLICT, "a scan is already running"),
                SkipReason::Locked => (StatusCode::PAYMENT_REQUIRED, "bulk scan requires Pro access"),
            };
            return (status, Json(ApiError { error })).into_response();
        }
    };

    // The request outlives this handler; the view picks up the outcome.
    let client = app.client.clone();
    tokio::spawn(async move {
        client.run(ticket).await;
    });

    (StatusCode::ACCEPTED, Json(app.client.snapshot().await)).into_response()
}
