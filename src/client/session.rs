//! Login credential and its local store.
//!
//! The store is a JSON object on disk with a single key, `bili-lite-token`,
//! whose value is an opaque credential string.
//!
//! On a successful QR login the passport service hands back a cross-domain
//! URL whose query string carries the full cookie set (`SESSDATA`,
//! `bili_jct`, `DedeUserID`, ...). That query string is persisted verbatim,
//! so nothing is assumed about which fields make a valid session. Accessors
//! only pick out the two values the relay contract needs. When the URL
//! carries no cookies the refresh token is stored instead; such a credential
//! cannot authenticate requests.

use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use url::Url;

use crate::client::error::ClientResult;
use crate::client::types::QrPoll;

/// Key under which the credential is stored.
pub const LOGIN_KEY: &str = "bili-lite-token";

/// Opaque login credential.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential(String);

impl Credential {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Credential from a successful poll response.
    pub fn from_login(poll: &QrPoll) -> Self {
        let cookies = Url::parse(&poll.url)
            .ok()
            .and_then(|u| u.query().map(str::to_string))
            .filter(|q| q.split('&').any(|pair| pair.starts_with("SESSDATA=")));
        match cookies {
            Some(query) => Self(query),
            None => {
                tracing::warn!("Login response carried no session cookies; storing refresh token only");
                Self(poll.refresh_token.clone())
            }
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Session token, still percent-encoded as cookies carry it.
    pub fn sessdata(&self) -> Option<&str> {
        self.cookie("SESSDATA")
    }

    /// CSRF token required by the action routes.
    pub fn csrf(&self) -> Option<&str> {
        self.cookie("bili_jct")
    }

    fn cookie(&self, name: &str) -> Option<&str> {
        self.0
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == name)
            .map(|(_, v)| v)
            .filter(|v| !v.is_empty())
    }
}

/// File-backed credential store.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Stored credential, if any.
    pub fn load(&self) -> ClientResult<Option<Credential>> {
        Ok(self
            .read_map()?
            .remove(LOGIN_KEY)
            .filter(|v| !v.is_empty())
            .map(Credential))
    }

    pub fn save(&self, credential: &Credential) -> ClientResult<()> {
        let mut map = self.read_map()?;
        map.insert(LOGIN_KEY.to_string(), credential.0.clone());
        self.write_map(&map)
    }

    pub fn clear(&self) -> ClientResult<()> {
        let mut map = self.read_map()?;
        if map.remove(LOGIN_KEY).is_some() {
            self.write_map(&map)?;
        }
        Ok(())
    }

    fn read_map(&self) -> ClientResult<BTreeMap<String, String>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_map(&self, map: &BTreeMap<String, String>) -> ClientResult<()> {
        fs::write(&self.path, serde_json::to_string_pretty(map)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poll(url: &str, refresh_token: &str) -> QrPoll {
        QrPoll {
            code: 0,
            message: String::new(),
            url: url.to_string(),
            refresh_token: refresh_token.to_string(),
            timestamp: 0,
        }
    }

    #[test]
    fn keeps_full_cookie_query() {
        let credential = Credential::from_login(&poll(
            "https://passport.biligame.com/x/passport-login/web/crossDomain?DedeUserID=42&SESSDATA=abc%2C1700000000%2Cf00d&bili_jct=c5rf&gourl=https%3A%2F%2Fwww.bilibili.com",
            "rt",
        ));
        assert!(credential.as_str().starts_with("DedeUserID=42&"));
        assert_eq!(credential.sessdata(), Some("abc%2C1700000000%2Cf00d"));
        assert_eq!(credential.csrf(), Some("c5rf"));
    }

    #[test]
    fn falls_back_to_refresh_token() {
        let credential = Credential::from_login(&poll("", "refresh-123"));
        assert_eq!(credential.as_str(), "refresh-123");
        assert_eq!(credential.sessdata(), None);
    }

    #[test]
    fn store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CredentialStore::new(dir.path().join("session.json"));
        assert_eq!(store.load().unwrap(), None);

        let credential = Credential::new("SESSDATA=x&bili_jct=y");
        store.save(&credential).unwrap();
        assert_eq!(store.load().unwrap(), Some(credential));

        let raw = fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[LOGIN_KEY], "SESSDATA=x&bili_jct=y");

        store.clear().unwrap();
        assert_eq!(store.load().unwrap(), None);
    }

    #[test]
    fn corrupt_store_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            CredentialStore::new(path).load(),
            Err(crate::client::error::ClientError::Decode(_))
        ));
    }
}
