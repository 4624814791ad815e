//! Liveness endpoints (/, /health)

use axum::{Json, Router, routing::get};
use serde::Serialize;
use std::sync::Arc;

use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
}

#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
    status: &'static str,
}

/// GET / - Service banner
async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Violence Detection API",
        status: "active",
    })
}

async fn health() -> &'static str {
    "ok"
}
