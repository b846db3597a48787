//! HTTP server setup with Axum

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};

use super::sse::handler::{
    mcp_delete_handler, mcp_post_handler, mcp_sse_handler, server_info_handler, AppState,
};

/// Create the Axum router with all endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration - allow all origins for development. Headers
    // are exposed so browser clients can read Mcp-Session-Id.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any)
        .expose_headers(Any);

    Router::new()
        // Streamable HTTP endpoint: POST requests, GET stream, DELETE session
        .route(
            "/mcp",
            post(mcp_post_handler)
                .get(mcp_sse_handler)
                .delete(mcp_delete_handler),
        )
        // Server info
        .route("/mcp/info", get(server_info_handler))
        // Health check
        .route("/health", get(health_check))
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
