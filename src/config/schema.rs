//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files, and
//! every section has defaults that reproduce the public Bilibili deployment.

use serde::{Deserialize, Serialize};

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RelayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream platform endpoints and injected header values.
    pub upstream: UpstreamConfig,

    /// Named-route table settings.
    pub routes: RoutesConfig,

    /// Open-relay (arbitrary URL) settings.
    pub relay: OpenRelayConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8787").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8787".to_string(),
        }
    }
}

/// Where requests are forwarded and which identity they carry.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the main web API.
    pub api_base: String,

    /// Base URL of the passport (login) API.
    pub passport_base: String,

    /// Web origin sent as `Referer` and `Origin`.
    pub web_origin: String,

    /// User agent used when the caller did not send one.
    pub fallback_user_agent: String,

    /// TCP connect timeout for upstream calls in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.bilibili.com".to_string(),
            passport_base: "https://passport.bilibili.com".to_string(),
            web_origin: "https://www.bilibili.com".to_string(),
            fallback_user_agent:
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".to_string(),
            connect_timeout_secs: 10,
        }
    }
}

/// Named-route settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RoutesConfig {
    /// Path prefix every named route lives under.
    pub prefix: String,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            prefix: "/api".to_string(),
        }
    }
}

/// Open-relay settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OpenRelayConfig {
    /// Mount the relay endpoint.
    pub enabled: bool,

    /// Path the relay answers on.
    pub path: String,

    /// Host suffixes the relay may fetch from. Empty allows any host.
    pub allowed_hosts: Vec<String>,
}

impl Default for OpenRelayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: "/".to_string(),
            allowed_hosts: vec![
                "bilivideo.com".to_string(),
                "bilivideo.cn".to_string(),
                "akamaized.net".to_string(),
                "hdslb.com".to_string(),
                "bilibili.com".to_string(),
            ],
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Outer limit on producing a response, in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 30 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
