// ========================================================
// File: raidbot-core/src/platforms/twitch/requests/user.rs
// ========================================================
use serde::Deserialize;
use tracing::debug;

use crate::Error;
use crate::platforms::twitch::client::{helix_url, TwitchHelixClient};

/// Response from "Get Users" endpoint.
#[derive(Debug, Deserialize)]
pub struct UsersResponse {
    pub data: Vec<UserData>,
}

/// Single user record.
#[derive(Debug, Clone, Deserialize)]
pub struct UserData {
    pub id: String,
    pub login: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub profile_image_url: String,
}

impl UserData {
    /// Display name, or the login when Twitch returns an empty one.
    pub fn shown_name(&self) -> &str {
        if self.display_name.is_empty() {
            &self.login
        } else {
            &self.display_name
        }
    }
}

/// `None` if no user has that login.
pub async fn get_user_by_login(client: &TwitchHelixClient, login: &str) -> Result<Option<UserData>, Error> {
    let url = helix_url("/users", &[("login", login)])?;
    let resp: UsersResponse = client.get_json(url.as_str()).await?;
    debug!("get_user_by_login({}) => {} result(s)", login, resp.data.len());
    Ok(resp.data.into_iter().next())
}

/// The user the access token belongs to.
pub async fn get_authenticated_user(client: &TwitchHelixClient) -> Result<UserData, Error> {
    let url = helix_url("/users", &[])?;
    let resp: UsersResponse = client.get_json(url.as_str()).await?;
    resp.data
        .into_iter()
        .next()
        .ok_or_else(|| Error::Auth("Token is not bound to a user".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shown_name_falls_back_to_login() {
        let json = r#"{"data":[{"id":"1","login":"alice","display_name":"","profile_image_url":"x"}]}"#;
        let resp: UsersResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.data[0].shown_name(), "alice");
    }
}
