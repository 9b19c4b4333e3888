//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (path, query)
//!     → table.rs (strip prefix, look up RouteSpec)
//!     → params.rs (required params, defaults)
//!     → RouteSpec::plan → UpstreamTarget
//!     → RouteTable::upstream_url → concrete Url
//!
//! Table construction (at startup):
//!     ROUTES (static) + RoutesConfig + UpstreamConfig
//!     → RouteTable (immutable, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - Exact path matching only; unknown paths get an explicit listing
//! - Missing parameters fail before any network call

pub mod params;
pub mod table;

pub use params::QueryParams;
pub use table::{ResponseFormat, RouteSpec, RouteTable, UpstreamHost, UpstreamTarget, ROUTES};
