//! Client shell for driving the relay.
//!
//! # Data Flow
//! ```text
//! relay-cli command
//!     → api.rs (RelayClient, named routes + relay URLs)
//!     → login.rs (QR poll loop) / video.rs (BV id, stream pick)
//!     → session.rs (credential file)
//! ```

pub mod api;
pub mod error;
pub mod login;
pub mod session;
pub mod types;
pub mod video;

pub use api::RelayClient;
pub use error::{ClientError, ClientResult};
pub use login::{wait_for_login, LoginOutcome, PollStatus, POLL_PERIOD};
pub use session::{Credential, CredentialStore};
pub use video::{extract_bvid, pick_stream};
