//! Slip API — Axum server over a shared slip session.
//!
//! Exposes the store operations, the submit trigger and the derived read
//! model as a JSON REST API. CORS enabled for the web client.

pub mod routes;

use anyhow::{Context, Result};
use axum::{
    http::{header, Method},
    routing::{delete, get, post, put},
    Router,
};
use std::future::Future;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use routes::AppState;

/// Serve the API until `shutdown` resolves.
pub async fn serve<F>(state: AppState, port: u16, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = build_router(state);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind API port {port}"))?;
    info!(port, "Slip API listening on http://localhost:{port}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
        .context("Slip API server error")
}

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/api/slip", get(routes::get_slip).delete(routes::clear_slip))
        .route("/api/slip/selections", post(routes::add_selection))
        .route(
            "/api/slip/selections/:event_id/:selection_id",
            delete(routes::remove_selection),
        )
        .route(
            "/api/slip/selections/:event_id/:selection_id/stake",
            put(routes::edit_stake),
        )
        .route("/api/slip/stake", put(routes::set_uniform_stake))
        .route("/api/slip/submit", post(routes::submit))
        .route("/health", get(routes::health))
        .layer(cors)
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
