// File: raidbot-core/src/platforms/twitch/client.rs

use std::sync::Arc;

use reqwest::{Client as ReqwestClient, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::warn;
use url::Url;

use crate::Error;
use crate::auth::TokenStore;

pub const HELIX_BASE: &str = "https://api.twitch.tv/helix";

/// Builds `HELIX_BASE` + `path` with form-encoded query parameters.
pub fn helix_url(path: &str, query: &[(&str, &str)]) -> Result<Url, Error> {
    Ok(Url::parse_with_params(&format!("{}{}", HELIX_BASE, path), query)?)
}

/// A small wrapper client for calling the Helix endpoints the raid flow uses.
///
/// Every request is signed with the current token from the `TokenStore`; a
/// 401 triggers one forced refresh and a single retry.
pub struct TwitchHelixClient {
    http: ReqwestClient,
    tokens: Arc<TokenStore>,
}

impl TwitchHelixClient {
    pub fn new(tokens: Arc<TokenStore>) -> Self {
        Self {
            http: ReqwestClient::new(),
            tokens,
        }
    }

    pub fn client_id(&self) -> &str {
        self.tokens.client_id()
    }

    async fn send_signed<F>(&self, build: F) -> Result<Response, Error>
    where
        F: Fn(&ReqwestClient) -> RequestBuilder,
    {
        let token = self.tokens.access_token().await?;
        let resp = build(&self.http)
            .header("Client-Id", self.client_id())
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;

        if resp.status() != StatusCode::UNAUTHORIZED {
            return Ok(resp);
        }

        warn!("Helix rejected the access token; refreshing and retrying once");
        let token = self.tokens.force_refresh().await?;
        let resp = build(&self.http)
            .header("Client-Id", self.client_id())
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await?;
        Ok(resp)
    }

    async fn ensure_success(resp: Response, what: &str) -> Result<Response, Error> {
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status();
        let body_text = resp.text().await.unwrap_or_default();
        Err(Error::Platform(format!("{}: HTTP {} => {}", what, status, body_text)))
    }

    /// Signed GET against Helix, decoding the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, Error> {
        let resp = self.send_signed(|http| http.get(url)).await?;
        let resp = Self::ensure_success(resp, url).await?;
        let body = resp.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| Error::Platform(format!("{} parse error: {}", url, e)))
    }

    /// Signed POST with a JSON body; the response body is discarded.
    pub async fn post_json<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<(), Error> {
        let resp = self.send_signed(|http| http.post(url).json(body)).await?;
        Self::ensure_success(resp, url).await?;
        Ok(())
    }

    /// Plain unauthenticated GET, used for CDN-hosted profile images.
    pub async fn get_bytes(&self, url: &str) -> Result<Vec<u8>, Error> {
        let resp = self.http.get(url).send().await?;
        let resp = Self::ensure_success(resp, url).await?;
        Ok(resp.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helix_url_encodes_query_values() {
        let url = helix_url("/users", &[("login", "a b&c=d")]).unwrap();
        assert_eq!(url.as_str(), "https://api.twitch.tv/helix/users?login=a+b%26c%3Dd");
        assert_eq!(url.query_pairs().next().unwrap().1, "a b&c=d");
    }

    #[test]
    fn helix_url_without_query_has_no_question_mark() {
        let url = helix_url("/users", &[]).unwrap();
        assert_eq!(url.as_str(), "https://api.twitch.tv/helix/users");
    }
}
