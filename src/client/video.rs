//! Video identifier extraction and stream selection.

use std::sync::LazyLock;

use regex::Regex;

use crate::client::error::{ClientError, ClientResult};
use crate::client::types::PlayUrl;

static BVID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"BV[a-zA-Z0-9]+").expect("valid BV id pattern"));

/// BV id from user input: a bare id, or any text (typically a video URL)
/// containing one.
pub fn extract_bvid(input: &str) -> ClientResult<String> {
    let input = input.trim();
    BVID_PATTERN
        .find(input)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ClientError::InvalidVideoId(input.to_string()))
}

/// Direct media URL from a play URL response: the first progressive segment,
/// else the first DASH video stream.
pub fn pick_stream(play: &PlayUrl) -> ClientResult<&str> {
    if let Some(segment) = play.durl.as_ref().and_then(|d| d.first()) {
        return Ok(&segment.url);
    }
    play.dash
        .as_ref()
        .and_then(|d| d.video.first())
        .map(|s| s.base_url.as_str())
        .ok_or(ClientError::NoPlayableStream)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_id() {
        assert_eq!(extract_bvid(" BV1xx411c7XD ").unwrap(), "BV1xx411c7XD");
    }

    #[test]
    fn id_inside_url() {
        assert_eq!(
            extract_bvid("https://www.bilibili.com/video/BV1GJ411x7h7/?spm_id_from=333").unwrap(),
            "BV1GJ411x7h7"
        );
    }

    #[test]
    fn no_id() {
        assert!(matches!(
            extract_bvid("https://www.bilibili.com/"),
            Err(ClientError::InvalidVideoId(_))
        ));
        assert!(extract_bvid("").is_err());
    }

    #[test]
    fn prefers_progressive_segment() {
        let play: PlayUrl = serde_json::from_value(serde_json::json!({
            "durl": [{"url": "https://cn.bilivideo.com/1.mp4"}],
            "dash": {"video": [{"id": 80, "baseUrl": "https://cn.bilivideo.com/v.m4s"}]}
        }))
        .unwrap();
        assert_eq!(pick_stream(&play).unwrap(), "https://cn.bilivideo.com/1.mp4");
    }

    #[test]
    fn falls_back_to_dash_then_fails() {
        let play: PlayUrl = serde_json::from_value(serde_json::json!({
            "durl": [],
            "dash": {"video": [{"id": 64, "baseUrl": "https://cn.bilivideo.com/v.m4s"}]}
        }))
        .unwrap();
        assert_eq!(pick_stream(&play).unwrap(), "https://cn.bilivideo.com/v.m4s");

        let empty: PlayUrl = serde_json::from_value(serde_json::json!({})).unwrap();
        assert!(matches!(pick_stream(&empty), Err(ClientError::NoPlayableStream)));
    }
}
