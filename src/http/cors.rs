//! Permissive CORS for browser callers.
//!
//! Every response carries the same four headers, and `OPTIONS` on any path is
//! answered immediately with an empty body. tower-http's `CorsLayer` refuses
//! a wildcard origin together with credentials, so the headers are set
//! directly.

use axum::{
    extract::Request,
    http::{header, HeaderName, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tower_http::set_header::SetResponseHeaderLayer;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type, Authorization, Cookie, SESSDATA";
pub const ALLOW_CREDENTIALS: &str = "true";

/// The header set attached to every response.
pub fn cors_headers() -> [(HeaderName, HeaderValue); 4] {
    [
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(ALLOW_ORIGIN),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static(ALLOW_METHODS),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOW_HEADERS),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static(ALLOW_CREDENTIALS),
        ),
    ]
}

/// Short-circuit preflight requests before they reach a handler.
pub async fn preflight(request: Request, next: Next) -> Response {
    if request.method() == Method::OPTIONS {
        return StatusCode::OK.into_response();
    }
    next.run(request).await
}

/// Wrap `router` with preflight handling and the CORS header set.
pub fn apply(router: Router) -> Router {
    let [origin, methods, headers, credentials] = cors_headers();
    router
        .layer(middleware::from_fn(preflight))
        .layer(SetResponseHeaderLayer::overriding(origin.0, origin.1))
        .layer(SetResponseHeaderLayer::overriding(methods.0, methods.1))
        .layer(SetResponseHeaderLayer::overriding(headers.0, headers.1))
        .layer(SetResponseHeaderLayer::overriding(credentials.0, credentials.1))
}
