//! Outbound request construction.
//!
//! Outbound headers are built from scratch for every call: nothing from the
//! inbound request is forwarded unless it is explicitly picked here.

use axum::http::{header, HeaderMap, HeaderName, HeaderValue, Method};
use url::Url;

use crate::config::UpstreamConfig;
use crate::error::SetupError;
use crate::routing::QueryParams;

/// Header and query key carrying the caller's session token.
pub const SESSDATA: &str = "SESSDATA";

/// Fixed header values presented to the upstream platform.
#[derive(Debug, Clone)]
pub struct Identity {
    referer: HeaderValue,
    origin: HeaderValue,
    fallback_user_agent: HeaderValue,
    /// Referer used by the relay when the caller names none.
    default_relay_referer: String,
}

impl Identity {
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, SetupError> {
        let origin = config.web_origin.trim_end_matches('/');
        let value = |s: &str, field| HeaderValue::from_str(s).map_err(|_| SetupError::Header(field));
        Ok(Self {
            referer: value(origin, "upstream.web_origin")?,
            origin: value(origin, "upstream.web_origin")?,
            fallback_user_agent: value(&config.fallback_user_agent, "upstream.fallback_user_agent")?,
            default_relay_referer: format!("{}/", origin),
        })
    }

    /// Caller's user agent when it sent one, else the configured fallback.
    fn user_agent(&self, inbound: &HeaderMap) -> HeaderValue {
        inbound
            .get(header::USER_AGENT)
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| self.fallback_user_agent.clone())
    }

    /// Headers for a named-route call: user agent, referer, origin and the
    /// session cookie when a token was supplied.
    pub fn api_headers(&self, inbound: &HeaderMap, session: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, self.user_agent(inbound));
        headers.insert(header::REFERER, self.referer.clone());
        headers.insert(header::ORIGIN, self.origin.clone());
        if let Some(token) = session {
            match HeaderValue::from_str(&format!("{}={}", SESSDATA, token)) {
                Ok(cookie) => {
                    headers.insert(header::COOKIE, cookie);
                }
                Err(_) => tracing::warn!("Ignoring session token with invalid header characters"),
            }
        }
        headers
    }

    /// Headers for an open-relay fetch: user agent, referer and the range
    /// headers a media player needs for seeking.
    pub fn relay_headers(&self, inbound: &HeaderMap, referer: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, self.user_agent(inbound));
        let referer = referer
            .and_then(|r| HeaderValue::from_str(r).ok())
            .unwrap_or_else(|| {
                HeaderValue::from_str(&self.default_relay_referer)
                    .unwrap_or_else(|_| self.referer.clone())
            });
        headers.insert(header::REFERER, referer);
        for name in [header::RANGE, header::IF_RANGE] {
            if let Some(value) = inbound.get(&name) {
                headers.insert(name, value.clone());
            }
        }
        headers
    }
}

/// Session token from the `SESSDATA` header, else the `SESSDATA` query parameter.
pub fn session_token<'a>(inbound: &'a HeaderMap, params: &'a QueryParams) -> Option<&'a str> {
    inbound
        .get(HeaderName::from_static("sessdata"))
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .or_else(|| params.get(SESSDATA))
}

/// `application/x-www-form-urlencoded` body with fields in the given order.
pub fn encode_form(fields: &[(&str, String)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields.iter().map(|(k, v)| (*k, v.as_str())))
        .finish()
}

/// A fully-built request ready to send upstream.
#[derive(Debug, Clone)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl OutboundRequest {
    /// Request copying the inbound method with no body.
    pub fn passthrough(method: Method, url: Url, headers: HeaderMap) -> Self {
        Self {
            method,
            url,
            headers,
            body: None,
        }
    }

    /// Form POST used by the action routes, whatever the inbound method was.
    pub fn form_post(url: Url, mut headers: HeaderMap, fields: &[(&str, String)]) -> Self {
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded"),
        );
        Self {
            method: Method::POST,
            url,
            headers,
            body: Some(encode_form(fields)),
        }
    }
}
