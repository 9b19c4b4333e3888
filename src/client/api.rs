//! Typed client for the relay's named routes.

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use crate::client::error::{ClientError, ClientResult};
use crate::client::session::Credential;
use crate::client::types::{
    ApiEnvelope, NavInfo, PlayUrl, QrCode, QrPoll, RelayErrorBody, VideoDetail,
};
use crate::upstream::SESSDATA;

/// Referer the CDN expects on media requests.
pub const MEDIA_REFERER: &str = "https://www.bilibili.com/";

/// `fnval` asking for a progressive stream a plain player can open.
const FNVAL_PROGRESSIVE: &str = "1";

pub struct RelayClient {
    http: Client,
    base: Url,
    prefix: String,
    relay_path: String,
    credential: Option<Credential>,
}

impl RelayClient {
    /// Client for a relay at `base` serving named routes under `prefix`.
    pub fn new(base: &str, prefix: &str) -> ClientResult<Self> {
        let base = Url::parse(base).map_err(|e| ClientError::InvalidUrl(format!("{base}: {e}")))?;
        Ok(Self {
            http: Client::new(),
            base,
            prefix: prefix.trim_end_matches('/').to_string(),
            relay_path: "/".to_string(),
            credential: None,
        })
    }

    /// Path the relay's open-relay endpoint is mounted on.
    pub fn with_relay_path(mut self, path: &str) -> Self {
        self.relay_path = path.to_string();
        self
    }

    pub fn with_credential(mut self, credential: Option<Credential>) -> Self {
        self.credential = credential;
        self
    }

    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
    }

    fn endpoint(&self, route: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(&format!(
            "{}{}{}",
            self.base.path().trim_end_matches('/'),
            self.prefix,
            route
        ));
        url
    }

    async fn get<T: DeserializeOwned>(
        &self,
        route: &str,
        query: &[(&str, &str)],
    ) -> ClientResult<ApiEnvelope<T>> {
        let mut request = self.http.get(self.endpoint(route)).query(query);
        if let Some(token) = self.credential.as_ref().and_then(Credential::sessdata) {
            request = request.header(SESSDATA, token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let message = serde_json::from_slice::<RelayErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| format!("relay returned status {}", status));
            return Err(ClientError::Relay(message));
        }
        Ok(serde_json::from_slice(&body)?)
    }

    /// Current identity. Answers with `is_login == false` when logged out.
    pub async fn nav(&self) -> ClientResult<NavInfo> {
        let envelope = self.get::<NavInfo>("/nav", &[]).await?;
        envelope
            .data
            .ok_or_else(|| ClientError::Decode("nav response has no data".into()))
    }

    pub async fn generate_qrcode(&self) -> ClientResult<QrCode> {
        into_data(self.get("/qrcode/generate", &[]).await?)
    }

    pub async fn poll_qrcode(&self, qrcode_key: &str) -> ClientResult<QrPoll> {
        into_data(self.get("/qrcode/poll", &[("qrcode_key", qrcode_key)]).await?)
    }

    pub async fn video_detail(&self, bvid: &str) -> ClientResult<VideoDetail> {
        into_data(self.get("/video/detail", &[("bvid", bvid)]).await?)
    }

    /// Progressive play address for one page of a video.
    pub async fn play_url(&self, bvid: &str, cid: u64, qn: u32) -> ClientResult<PlayUrl> {
        let cid = cid.to_string();
        let qn = qn.to_string();
        into_data(
            self.get(
                "/playurl",
                &[
                    ("bvid", bvid),
                    ("cid", &cid),
                    ("qn", &qn),
                    ("fnval", FNVAL_PROGRESSIVE),
                ],
            )
            .await?,
        )
    }

    /// Like a video. Needs the CSRF cookie from a full login.
    pub async fn like(&self, bvid: &str) -> ClientResult<()> {
        let csrf = self
            .credential
            .as_ref()
            .and_then(Credential::csrf)
            .ok_or(ClientError::NotLoggedIn)?;
        let envelope = self
            .get::<serde_json::Value>("/like", &[("bvid", bvid), ("csrf", csrf)])
            .await?;
        check_code(&envelope)
    }

    /// Open-relay URL that streams `media_url` with the CDN's referer.
    pub fn relay_url(&self, media_url: &str) -> Url {
        let mut url = self.base.clone();
        url.set_path(&self.relay_path);
        url.query_pairs_mut()
            .clear()
            .append_pair("url", media_url)
            .append_pair("referer", MEDIA_REFERER);
        url
    }
}

fn check_code<T>(envelope: &ApiEnvelope<T>) -> ClientResult<()> {
    if envelope.code != 0 {
        return Err(ClientError::Api {
            code: envelope.code,
            message: envelope.message.clone(),
        });
    }
    Ok(())
}

fn into_data<T>(envelope: ApiEnvelope<T>) -> ClientResult<T> {
    check_code(&envelope)?;
    envelope
        .data
        .ok_or_else(|| ClientError::Decode("response has no data".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_prefix() {
        let client = RelayClient::new("http://localhost:8787", "/api").unwrap();
        assert_eq!(
            client.endpoint("/video/detail").as_str(),
            "http://localhost:8787/api/video/detail"
        );
    }

    #[test]
    fn relay_url_encodes_media_url() {
        let client = RelayClient::new("http://localhost:8787", "/api").unwrap();
        let url = client.relay_url("https://cn.bilivideo.com/1.mp4?a=1&b=2");
        assert_eq!(
            url.as_str(),
            "http://localhost:8787/?url=https%3A%2F%2Fcn.bilivideo.com%2F1.mp4%3Fa%3D1%26b%3D2&referer=https%3A%2F%2Fwww.bilibili.com%2F"
        );
    }

    #[test]
    fn into_data_rejects_non_zero_code() {
        let envelope: ApiEnvelope<QrCode> =
            serde_json::from_str(r#"{"code":-412,"message":"blocked","data":null}"#).unwrap();
        assert!(matches!(
            into_data(envelope),
            Err(ClientError::Api { code: -412, .. })
        ));
    }

    #[test]
    fn invalid_base_is_rejected() {
        assert!(matches!(
            RelayClient::new("not a url", "/api"),
            Err(ClientError::InvalidUrl(_))
        ));
    }
}
