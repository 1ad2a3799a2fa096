//! HTTP front end over a shared [`Session`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/health` | Status, version, and whether an index is loaded |
//! | `POST` | `/load` | Load `{ "paths": [...] }`, returns `{ "status": "..." }` |
//! | `POST` | `/chat` | Answer `{ "message", "history" }`, returns `{ "history": [...] }` |
//!
//! Load and chat failures are part of the normal response text, exactly as
//! on the command line. Only malformed request bodies produce a non-200
//! status, and those come from axum's `Json` extractor.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted so a browser UI can be
//! served from anywhere.

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::models::Turn;
use crate::session::Session;

#[derive(Clone)]
struct AppState {
    session: Arc<Session>,
}

/// Build the router. Split out from [`run_server`] so tests can drive it
/// without binding a socket.
pub fn router(session: Arc<Session>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/load", post(handle_load))
        .route("/chat", post(handle_chat))
        .layer(cors)
        .with_state(AppState { session })
}

/// Bind to `[server].bind` and serve until the process is terminated.
pub async fn run_server(session: Arc<Session>) -> anyhow::Result<()> {
    let bind_addr = session.config().server.bind.clone();
    let app = router(session);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "quote desk listening");
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    indexed: bool,
    chunks: usize,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        indexed: state.session.is_indexed(),
        chunks: state.session.chunk_count(),
    })
}

// ============ POST /load ============

#[derive(Deserialize)]
struct LoadRequest {
    #[serde(default)]
    paths: Vec<PathBuf>,
}

#[derive(Serialize)]
struct LoadResponse {
    status: String,
}

async fn handle_load(
    State(state): State<AppState>,
    Json(req): Json<LoadRequest>,
) -> Json<LoadResponse> {
    let status = state.session.load(&req.paths).await;
    Json(LoadResponse { status })
}

// ============ POST /chat ============

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    #[serde(default)]
    history: Vec<Turn>,
}

#[derive(Serialize)]
struct ChatResponse {
    history: Vec<Turn>,
}

async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let history = state.session.chat(&req.message, &req.history).await;
    Json(ChatResponse { history })
}
