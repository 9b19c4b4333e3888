//! Configuration validation.
//!
//! Semantic checks that serde cannot express: addresses parse, upstream bases
//! are absolute http(s) URLs, mount paths are absolute and do not collide.
//! All errors are collected rather than stopping at the first.

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem in a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address '{value}'")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field}: '{value}' is not an absolute http(s) URL")]
    InvalidBaseUrl { field: &'static str, value: String },

    #[error("{field}: path '{value}' must start with '/'")]
    InvalidPath { field: &'static str, value: String },

    #[error("relay.path '{relay}' must not live under routes.prefix '{prefix}'")]
    PathConflict { relay: String, prefix: String },

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
}

/// Validate a configuration, returning every problem found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(
        &mut errors,
        "listener.bind_address",
        &config.listener.bind_address,
    );
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    check_base(&mut errors, "upstream.api_base", &config.upstream.api_base);
    check_base(
        &mut errors,
        "upstream.passport_base",
        &config.upstream.passport_base,
    );
    check_base(&mut errors, "upstream.web_origin", &config.upstream.web_origin);

    check_path(&mut errors, "routes.prefix", &config.routes.prefix);
    if config.relay.enabled {
        check_path(&mut errors, "relay.path", &config.relay.path);
        let prefix = config.routes.prefix.trim_end_matches('/');
        if !prefix.is_empty() && config.relay.path.starts_with(prefix) {
            errors.push(ValidationError::PathConflict {
                relay: config.relay.path.clone(),
                prefix: config.routes.prefix.clone(),
            });
        }
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "timeouts.request_secs",
        });
    }
    if config.upstream.connect_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout {
            field: "upstream.connect_timeout_secs",
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}

fn check_base(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    let ok = Url::parse(value)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host().is_some())
        .unwrap_or(false);
    if !ok {
        errors.push(ValidationError::InvalidBaseUrl {
            field,
            value: value.to_string(),
        });
    }
}

fn check_path(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if !value.starts_with('/') {
        errors.push(ValidationError::InvalidPath {
            field,
            value: value.to_string(),
        });
    }
}
