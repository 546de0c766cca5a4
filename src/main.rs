use demo_mcp_server::{build_app, build_mcp_server, config::Config, logging, AppState};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    logging::init_logging();

    let config = Config::from_env();
    let state = AppState::new(build_mcp_server());
    let app = build_app(state);

    let listener = match tokio::net::TcpListener::bind(config.bind_socket()).await {
        Ok(listener) => listener,
        Err(error) => {
            error!(error = %error, port = config.port, "failed to bind http listener");
            std::process::exit(1);
        }
    };

    info!(
        "Demo MCP Server running on http://localhost:{}/mcp",
        config.port
    );

    if let Err(error) = axum::serve(listener, app.into_make_service()).await {
        error!(error = %error, "http server terminated");
        std::process::exit(1);
    }
}
