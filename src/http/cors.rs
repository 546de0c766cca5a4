//! Localhost CORS filter
//!
//! Stateless interceptor permitting cross-origin calls from any localhost
//! origin. Non-matching origins are not rejected; they receive no CORS
//! headers and enforcement is left to the browser's same-origin rules.

use std::sync::OnceLock;

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use regex::Regex;

const ALLOW_METHODS: &str = "GET,POST,PUT,DELETE,OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type,Authorization,mcp-protocol-version";

fn is_localhost_origin(origin: &str) -> bool {
    static LOCALHOST_ORIGIN: OnceLock<Regex> = OnceLock::new();
    LOCALHOST_ORIGIN
        .get_or_init(|| {
            Regex::new(r"^https?://localhost(:\d+)?$").expect("localhost origin regex")
        })
        .is_match(origin)
}

/// Echoes the `Origin` back with the allow headers when it is a localhost
/// origin. `OPTIONS` preflights short-circuit with 204 regardless of origin;
/// every other request passes through unconditionally.
pub async fn allow_localhost_cors(request: Request, next: Next) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .filter(|value| value.to_str().is_ok_and(is_localhost_origin))
        .cloned();

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(request).await
    };

    if let Some(origin) = origin {
        let headers = response.headers_mut();
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
    }

    response
}
