//! Open-relay mode: fetch a caller-supplied URL and stream it back.
//!
//! Used by media players, which cannot attach the `Referer` the CDN insists
//! on. Targets are limited to http(s) and to the configured host suffixes.

use axum::{
    http::{HeaderMap, Method},
    response::Response,
};
use url::Url;

use crate::config::OpenRelayConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::http::response;
use crate::routing::QueryParams;
use crate::upstream::{OutboundRequest, UpstreamClient};

/// Relay `?url=<target>[&referer=<referer>]`.
pub async fn relay(
    upstream: &UpstreamClient,
    config: &OpenRelayConfig,
    method: &Method,
    headers: &HeaderMap,
    query: Option<&str>,
) -> ProxyResult<Response> {
    let params = QueryParams::parse(query);
    let target = parse_target(params.required("url")?, &config.allowed_hosts)?;

    let method = if *method == Method::HEAD {
        Method::HEAD
    } else {
        Method::GET
    };
    let outbound = OutboundRequest::passthrough(
        method,
        target,
        upstream.identity().relay_headers(headers, params.get("referer")),
    );

    let upstream_response = upstream.send_raw(outbound).await?;
    Ok(response::relay(upstream_response))
}

/// Parse and authorize a relay target.
pub fn parse_target(raw: &str, allowed_hosts: &[String]) -> ProxyResult<Url> {
    let url = Url::parse(raw).map_err(|e| ProxyError::InvalidTarget(format!("{raw}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProxyError::InvalidTarget(format!(
            "unsupported scheme '{}'",
            url.scheme()
        )));
    }
    let host = url
        .host_str()
        .ok_or_else(|| ProxyError::InvalidTarget(format!("{raw}: no host")))?;
    if !host_allowed(host, allowed_hosts) {
        return Err(ProxyError::InvalidTarget(format!("host '{host}' is not allowed")));
    }
    Ok(url)
}

/// Exact or subdomain match against the suffix list. Empty list allows all.
pub fn host_allowed(host: &str, allowed_hosts: &[String]) -> bool {
    if allowed_hosts.is_empty() {
        return true;
    }
    let host = host.to_ascii_lowercase();
    allowed_hosts.iter().any(|suffix| {
        let suffix = suffix.trim_start_matches('.').to_ascii_lowercase();
        host == suffix
            || host
                .strip_suffix(suffix.as_str())
                .is_some_and(|rest| rest.ends_with('.'))
    })
}
