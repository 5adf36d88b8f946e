// File: raidbot-core/src/auth/token_store.rs
//
// Keeps the Twitch user token fresh and mirrors every refresh back to
// `tokens.json` so a restart picks up the newest refresh token.

use std::path::{Path, PathBuf};

use chrono::{Duration, Utc};
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::Error;
use raidbot_common::models::TokenData;

const TOKEN_URL: &str = "https://id.twitch.tv/oauth2/token";

/// Refresh when the token has less than this many seconds left.
const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct TwitchTokenResponse {
    access_token: String,
    refresh_token: Option<String>,
    expires_in: i64,
    #[serde(default)]
    scope: Option<Vec<String>>,
}

pub struct TokenStore {
    path: PathBuf,
    client_id: String,
    client_secret: String,
    http: ReqwestClient,
    tokens: Mutex<TokenData>,
}

impl TokenStore {
    pub fn new(path: impl Into<PathBuf>, client_id: &str, client_secret: &str, tokens: TokenData) -> Self {
        Self {
            path: path.into(),
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
            http: ReqwestClient::new(),
            tokens: Mutex::new(tokens),
        }
    }

    pub async fn load(path: impl AsRef<Path>, client_id: &str, client_secret: &str) -> Result<Self, Error> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Auth(format!("cannot read token file {}: {e}", path.display())))?;
        let tokens: TokenData = serde_json::from_str(&raw)?;
        debug!("Loaded Twitch token from {}", path.display());
        Ok(Self::new(path, client_id, client_secret, tokens))
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Current access token, refreshed first if it is about to expire.
    pub async fn access_token(&self) -> Result<String, Error> {
        let mut guard = self.tokens.lock().await;
        if guard.expires_within(Duration::seconds(REFRESH_MARGIN_SECS), Utc::now()) {
            warn!("Twitch token expires in <= {REFRESH_MARGIN_SECS}s, refreshing");
            *guard = self.refresh(&guard).await?;
        }
        Ok(guard.access_token.clone())
    }

    /// Refresh regardless of expiry, e.g. after Helix rejected the token.
    pub async fn force_refresh(&self) -> Result<String, Error> {
        let mut guard = self.tokens.lock().await;
        *guard = self.refresh(&guard).await?;
        Ok(guard.access_token.clone())
    }

    async fn refresh(&self, current: &TokenData) -> Result<TokenData, Error> {
        let refresh_token = match current.refresh_token.as_ref() {
            Some(r) => r.clone(),
            None => return Err(Error::Auth("No refresh token available.".into())),
        };

        let params = [
            ("client_id", self.client_id.clone()),
            ("client_secret", self.client_secret.clone()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token".to_string()),
        ];

        let resp = self
            .http
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await
            .map_err(|e| Error::Auth(format!("HTTP error refreshing token: {e}")))?
            .error_for_status()
            .map_err(|e| Error::Auth(format!("Twitch token endpoint error: {e}")))?
            .json::<TwitchTokenResponse>()
            .await
            .map_err(|e| Error::Auth(format!("Parse error on refresh JSON: {e}")))?;

        let updated = TokenData {
            access_token: resp.access_token,
            refresh_token: resp.refresh_token.or_else(|| current.refresh_token.clone()),
            scope: resp.scope.unwrap_or_else(|| current.scope.clone()),
            expires_in: Some(resp.expires_in),
            obtainment_timestamp: Utc::now().timestamp_millis(),
        };

        self.persist(&updated).await?;
        info!("Twitch token refreshed; new expiry in {}s", resp.expires_in);
        Ok(updated)
    }

    /// Rewrites the whole token file.
    pub async fn persist(&self, tokens: &TokenData) -> Result<(), Error> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        tokens.serialize(&mut ser)?;
        tokio::fs::write(&self.path, buf).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_tokens(refresh: Option<&str>, expires_in: i64) -> TokenData {
        TokenData {
            access_token: "access".into(),
            refresh_token: refresh.map(String::from),
            scope: vec!["moderator:read:banned_users".into()],
            expires_in: Some(expires_in),
            obtainment_timestamp: Utc::now().timestamp_millis(),
        }
    }

    #[tokio::test]
    async fn valid_token_is_returned_without_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("tokens.json"), "cid", "secret", fresh_tokens(None, 3600));
        assert_eq!(store.access_token().await.unwrap(), "access");
    }

    #[tokio::test]
    async fn expiring_token_without_refresh_token_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = TokenStore::new(dir.path().join("tokens.json"), "cid", "secret", fresh_tokens(None, 0));
        assert!(matches!(store.access_token().await, Err(Error::Auth(_))));
    }

    #[tokio::test]
    async fn persist_then_load_keeps_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        let tokens = fresh_tokens(Some("refresh"), 3600);
        let store = TokenStore::new(&path, "cid", "secret", tokens.clone());
        store.persist(&tokens).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\n    \"accessToken\": \"access\""));

        let loaded = TokenStore::load(&path, "cid", "secret").await.unwrap();
        assert_eq!(*loaded.tokens.lock().await, tokens);
    }

    #[tokio::test]
    async fn missing_file_is_auth_error() {
        let dir = tempfile::tempdir().unwrap();
        let res = TokenStore::load(dir.path().join("nope.json"), "cid", "secret").await;
        assert!(matches!(res, Err(Error::Auth(_))));
    }
}
