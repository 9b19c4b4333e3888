//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every subscriber's recv() completes
//!             → server stops accepting and drains in-flight requests
//!             → client login poll stops
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
