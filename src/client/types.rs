//! Typed shapes of the upstream responses the client consumes.
//!
//! Only the fields the client reads are declared; anything else in the body
//! is ignored. A body that lacks a declared non-optional field fails to decode.

use serde::Deserialize;

/// Standard `{code, message, data}` wrapper used by every API endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub code: i64,
    #[serde(default)]
    pub message: String,
    pub data: Option<T>,
}

/// Error body produced by the relay itself.
#[derive(Debug, Clone, Deserialize)]
pub struct RelayErrorBody {
    pub error: String,
    pub code: i64,
}

/// `/api/qrcode/generate`
#[derive(Debug, Clone, Deserialize)]
pub struct QrCode {
    /// URL to encode into the QR image.
    pub url: String,
    pub qrcode_key: String,
}

/// `/api/qrcode/poll`
#[derive(Debug, Clone, Deserialize)]
pub struct QrPoll {
    /// Login status code (see `PollStatus`).
    pub code: i64,
    #[serde(default)]
    pub message: String,
    /// Cross-domain URL whose query carries the session cookies on success.
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub refresh_token: String,
    #[serde(default)]
    pub timestamp: i64,
}

/// `/api/nav`
#[derive(Debug, Clone, Deserialize)]
pub struct NavInfo {
    #[serde(rename = "isLogin")]
    pub is_login: bool,
    pub mid: Option<u64>,
    pub uname: Option<String>,
    pub face: Option<String>,
}

/// `/api/video/detail`
#[derive(Debug, Clone, Deserialize)]
pub struct VideoDetail {
    pub bvid: String,
    pub aid: u64,
    /// Content id of the first page.
    pub cid: u64,
    pub title: String,
    #[serde(default)]
    pub duration: u64,
}

/// `/api/playurl`
#[derive(Debug, Clone, Deserialize)]
pub struct PlayUrl {
    #[serde(default)]
    pub quality: u32,
    pub durl: Option<Vec<ProgressiveSegment>>,
    pub dash: Option<Dash>,
}

/// A progressive (FLV/MP4) segment.
#[derive(Debug, Clone, Deserialize)]
pub struct ProgressiveSegment {
    pub url: String,
    #[serde(default)]
    pub size: u64,
    /// Milliseconds.
    #[serde(default)]
    pub length: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Dash {
    #[serde(default)]
    pub video: Vec<DashStream>,
    #[serde(default)]
    pub audio: Option<Vec<DashStream>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashStream {
    pub id: u32,
    #[serde(rename = "baseUrl")]
    pub base_url: String,
    #[serde(default)]
    pub bandwidth: u64,
}
