use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

pub mod config;
pub mod domain;
pub mod errors;
pub mod http;
pub mod logging;
pub mod mcp;

use domain::resources::GreetingResource;
use domain::tools::{AddHandler, CurrentTimeHandler};
use mcp::server::McpServer;

#[derive(Clone)]
pub struct AppState {
    pub mcp_server: Arc<McpServer>,
}

impl AppState {
    pub fn new(mcp_server: Arc<McpServer>) -> Self {
        Self { mcp_server }
    }
}

/// Builds the process-wide protocol server with the demo capabilities
/// registered. Mutation ends here; the returned server is shared read-only
/// by every request transport.
pub fn build_mcp_server() -> Arc<McpServer> {
    let mut server = McpServer::new(env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    server.register_tool(AddHandler);
    server.register_tool(CurrentTimeHandler);
    server.register_resource(GreetingResource);
    Arc::new(server)
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(http::handlers::health))
        .route("/.well-known/mcp", get(http::handlers::discovery))
        .route("/mcp", post(http::handlers::mcp_endpoint))
        .layer(middleware::from_fn(http::cors::allow_localhost_cors))
        .layer(middleware::from_fn(logging::request_logging_middleware))
        .with_state(state)
}
