//! HTTP client for upstream calls.
//!
//! # Responsibilities
//! - Send named-route requests and reject non-success statuses
//! - Send open-relay requests untouched (no decompression, status kept)
//! - Count upstream calls per route
//!
//! # Design Decisions
//! - Two reqwest clients: the API client transparently decompresses (the
//!   danmaku endpoint answers deflate), the relay client must not so bodies
//!   stay byte-identical
//! - Connect timeout only; the server's outer timeout bounds the rest
//! - No retries

use std::time::Duration;

use crate::config::UpstreamConfig;
use crate::error::{ProxyError, ProxyResult, SetupError};
use crate::observability::metrics;
use crate::upstream::request::{Identity, OutboundRequest};

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    api: reqwest::Client,
    relay: reqwest::Client,
    identity: Identity,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, SetupError> {
        let connect_timeout = Duration::from_secs(config.connect_timeout_secs);
        let api = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()?;
        let relay = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .no_gzip()
            .no_deflate()
            .build()?;

        Ok(Self {
            api,
            relay,
            identity: Identity::from_config(config)?,
        })
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Send a named-route request. Non-2xx statuses are `UpstreamFailure`.
    pub async fn send(&self, route: &'static str, req: OutboundRequest) -> ProxyResult<reqwest::Response> {
        metrics::record_upstream_call(route);
        tracing::debug!(route, method = %req.method, url = %req.url, "Forwarding upstream");

        let response = build(&self.api, req).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::UpstreamFailure(format!(
                "upstream returned status {}",
                status
            )));
        }
        Ok(response)
    }

    /// Send an open-relay request; the caller relays whatever status comes back.
    pub async fn send_raw(&self, req: OutboundRequest) -> ProxyResult<reqwest::Response> {
        metrics::record_upstream_call("relay");
        tracing::debug!(method = %req.method, url = %req.url, "Relaying upstream");

        Ok(build(&self.relay, req).send().await?)
    }
}

fn build(client: &reqwest::Client, req: OutboundRequest) -> reqwest::RequestBuilder {
    let builder = client.request(req.method, req.url).headers(req.headers);
    match req.body {
        Some(body) => builder.body(body),
        None => builder,
    }
}
