// Copyright (c) 2025 - Cowboy AI, Inc.

//! HTTP server setup with Axum

use axum::{routing::get, Router};
use std::path::Path;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use super::hub::SubscriptionHub;
use super::socket::ws_handler;

/// Router with the WebSocket endpoint, a health check and static assets
/// served from `static_dir` (its `index.html` answers `/`).
pub fn create_router(hub: Arc<SubscriptionHub>, static_dir: impl AsRef<Path>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health_check))
        .fallback_service(ServeDir::new(static_dir.as_ref()))
        .layer(cors)
        .with_state(hub)
}

async fn health_check() -> &'static str {
    "OK"
}
