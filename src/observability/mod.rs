//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! HTTP layer and upstream client produce:
//!     → logging.rs (structured log events via tracing)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (fmt subscriber)
//!     → Prometheus scrape endpoint (optional)
//! ```
//!
//! # Design Decisions
//! - Request ID is attached to every response and carried in log fields
//! - Metric updates are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
