//! Client-side error type.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Could not reach the relay, or the transfer failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The relay answered with its error envelope.
    #[error("relay error: {0}")]
    Relay(String),

    /// The upstream API answered with a non-zero code.
    #[error("API error {code}: {message}")]
    Api { code: i64, message: String },

    /// The body did not match the expected shape.
    #[error("unexpected response shape: {0}")]
    Decode(String),

    #[error("invalid relay URL: {0}")]
    InvalidUrl(String),

    /// The operation needs a stored credential with the relevant cookie.
    #[error("not logged in")]
    NotLoggedIn,

    #[error("no BV id found in '{0}'")]
    InvalidVideoId(String),

    #[error("no playable stream in play URL response")]
    NoPlayableStream,

    #[error("credential store error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
