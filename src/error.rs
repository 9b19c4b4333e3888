//! Proxy error type and the uniform JSON error envelope.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Failures raised while handling a single proxied request.
///
/// Every variant is terminal for that request and surfaces to the caller as
/// the same envelope; only the message text differs.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// A required query parameter was absent or empty. Raised before any I/O.
    #[error("missing required parameter: {0}")]
    MissingParameter(&'static str),

    /// Network error or non-success status from the upstream call.
    #[error("upstream request failed: {0}")]
    UpstreamFailure(String),

    /// Upstream body did not have the expected shape.
    #[error("failed to decode upstream response: {0}")]
    DecodeFailure(String),

    /// The relay target URL was malformed or not allowed.
    #[error("invalid relay target: {0}")]
    InvalidTarget(String),
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProxyError::DecodeFailure(err.to_string())
        } else {
            ProxyError::UpstreamFailure(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ProxyError {
    fn from(err: serde_json::Error) -> Self {
        ProxyError::DecodeFailure(err.to_string())
    }
}

/// Body returned for every failed request: `{"error": ..., "code": -1}`.
#[derive(Debug, Serialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub code: i32,
}

impl ErrorEnvelope {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
            code: -1,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorEnvelope::new(self.to_string())),
        )
            .into_response()
    }
}

pub type ProxyResult<T> = Result<T, ProxyError>;

/// Failures building the server from a validated configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("invalid URL in {0}: {1}")]
    Base(&'static str, url::ParseError),

    #[error("invalid header value in {0}")]
    Header(&'static str),

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_parameter_message_names_the_parameter() {
        let err = ProxyError::MissingParameter("bvid");
        assert_eq!(err.to_string(), "missing required parameter: bvid");
    }

    #[tokio::test]
    async fn every_error_maps_to_the_500_envelope() {
        let response = ProxyError::DecodeFailure("eof".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], -1);
        assert_eq!(body["error"], "failed to decode upstream response: eof");
    }
}
