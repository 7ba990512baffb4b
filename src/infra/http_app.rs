use axum::{
    routing::{get, post},
    Router,
};

use crate::api::mcp::{self, McpServer};

/// `/healthz` plus the JSON-RPC endpoint at `/mcp`.
pub fn build_app(server: McpServer) -> Router {
    Router::new()
        .route("/healthz", get(|| async { "ok" }))
        .route("/mcp", post(mcp::http))
        .with_state(server)
}
