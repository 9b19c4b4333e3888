//! Query parameter access for route planning.
//!
//! Lookup follows browser `URLSearchParams.get` semantics: the first
//! occurrence of a key wins. An empty value is treated as absent, so it
//! neither satisfies a required parameter nor suppresses a default.

use crate::error::{ProxyError, ProxyResult};

/// Decoded query string of an inbound request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Decode a raw (still percent-encoded) query string.
    pub fn parse(raw: Option<&str>) -> Self {
        let pairs = raw
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();
        Self { pairs }
    }

    /// First value for `key`; empty counts as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    /// Value for `key`, or `MissingParameter` if absent.
    pub fn required(&self, key: &'static str) -> ProxyResult<&str> {
        self.get(key).ok_or(ProxyError::MissingParameter(key))
    }

    /// Value for `key`, falling back to `default`.
    pub fn or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }
}
