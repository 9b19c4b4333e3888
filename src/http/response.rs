//! Response shaping for the three kinds of success plus the unknown-path listing.

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use futures_util::TryStreamExt;
use serde::Serialize;

/// Headers that describe a single connection and must not be relayed.
const HOP_BY_HOP: [&str; 8] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
];

pub fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str()) || name == header::UPGRADE
}

/// Upstream JSON, re-encoded.
pub fn json(value: serde_json::Value) -> Response {
    Json(value).into_response()
}

/// Upstream XML, passed through unchanged.
pub fn xml(body: Bytes) -> Response {
    (
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/xml"))],
        body,
    )
        .into_response()
}

#[derive(Debug, Serialize)]
struct UnknownEndpoint {
    error: &'static str,
    available: Vec<String>,
}

/// 404 listing every known route.
pub fn not_found(available: Vec<String>) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(UnknownEndpoint {
            error: "unknown endpoint",
            available,
        }),
    )
        .into_response()
}

/// Stream an upstream response back with its status and end-to-end headers.
pub fn relay(upstream: reqwest::Response) -> Response {
    let status = upstream.status();
    let headers: HeaderMap = upstream
        .headers()
        .iter()
        .filter(|(name, _)| !is_hop_by_hop(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect();

    let body = upstream
        .bytes_stream()
        .inspect_err(|e| tracing::warn!(error = %e, "Relay stream interrupted"));
    let mut response = Response::new(Body::from_stream(body));
    *response.status_mut() = status;
    *response.headers_mut() = headers;
    response
}
