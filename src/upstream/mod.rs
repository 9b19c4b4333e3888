//! Upstream subsystem.
//!
//! # Data Flow
//! ```text
//! UpstreamTarget + inbound headers
//!     → request.rs (fresh header set, form body)
//!     → OutboundRequest
//!     → client.rs (reqwest send)
//!     → reqwest::Response back to the HTTP layer
//! ```

pub mod client;
pub mod request;

pub use client::UpstreamClient;
pub use request::{session_token, Identity, OutboundRequest, SESSDATA};
