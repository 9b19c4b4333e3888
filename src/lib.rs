//! Bilibili API relay library.
//!
//! A stateless edge proxy that forwards browser requests to the Bilibili web
//! API with the headers it expects, plus a small client for driving the
//! login, lookup and playback flows through it.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod upstream;

pub use config::RelayConfig;
pub use error::{ProxyError, ProxyResult};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
