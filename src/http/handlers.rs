//! Axum HTTP handlers for the web server
//!
//! Provides the primary Model Context Protocol endpoint, and general metadata endpoints.

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::mcp::rpc::{json_rpc_error, INTERNAL_ERROR, PARSE_ERROR};
use crate::mcp::transport::{RequestTransport, TransportError};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct DiscoveryResponse {
    pub name: &'static str,
    pub version: &'static str,
    pub mcp_endpoint: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn discovery() -> Json<DiscoveryResponse> {
    Json(DiscoveryResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        mcp_endpoint: "/mcp",
    })
}

/// One fresh transport per request. The transport closes when it drops at
/// the end of the request scope, so release is guaranteed on every path.
pub async fn mcp_endpoint(State(state): State<AppState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(_) => {
            return (
                StatusCode::OK,
                Json(json_rpc_error(None, PARSE_ERROR, "Parse error")),
            )
                .into_response()
        }
    };

    let mut transport = RequestTransport::for_request();
    if let Err(error) = transport.attach(state.mcp_server.clone()) {
        return transport_failure(error);
    }

    match transport.handle(payload).await {
        Ok(Some(response)) => (StatusCode::OK, Json(response)).into_response(),
        Ok(None) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => transport_failure(error),
    }
}

/// Transport state errors cannot come from client input on this path, so
/// they are reported in-band as an internal protocol error rather than an
/// HTTP failure.
fn transport_failure(error: TransportError) -> Response {
    error!(error = %error, "mcp transport failed");
    (
        StatusCode::OK,
        Json(json_rpc_error(None, INTERNAL_ERROR, "Internal error")),
    )
        .into_response()
}
