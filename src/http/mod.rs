//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, dispatch)
//!     → request.rs (request ID)
//!     → cors.rs (preflight short-circuit, CORS headers)
//!     → routing table or relay.rs
//!     → response.rs (JSON / XML / streamed relay body)
//!     → Send to client
//! ```

pub mod cors;
pub mod relay;
pub mod request;
pub mod response;
pub mod server;

pub use request::{UuidRequestId, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
