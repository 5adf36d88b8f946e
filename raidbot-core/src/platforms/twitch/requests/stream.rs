// ========================================================
// File: raidbot-core/src/platforms/twitch/requests/stream.rs
// ========================================================
use serde::Deserialize;
use tracing::debug;

use crate::Error;
use crate::platforms::twitch::client::{helix_url, TwitchHelixClient};

/// Response from "Get Streams" endpoint.
#[derive(Debug, Deserialize)]
pub struct StreamsResponse {
    pub data: Vec<StreamData>,
}

/// Single stream data record.
#[derive(Debug, Clone, Deserialize)]
pub struct StreamData {
    pub id: String,
    pub user_id: String,
    pub user_login: String,
    pub user_name: String,
    #[serde(default)]
    pub game_id: String,
    #[serde(default)]
    pub game_name: String,
    #[serde(rename = "type", default)]
    pub type_field: String, // e.g., "live"
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub viewer_count: u32,
}

/// Current live stream of `user_id`, `None` when offline.
pub async fn get_stream(client: &TwitchHelixClient, user_id: &str) -> Result<Option<StreamData>, Error> {
    let url = helix_url("/streams", &[("user_id", user_id)])?;
    let resp: StreamsResponse = client.get_json(url.as_str()).await?;
    let stream = resp.data.into_iter().next();
    debug!(
        "get_stream({}) => {}",
        user_id,
        stream.as_ref().map(|s| s.game_name.as_str()).unwrap_or("<offline>")
    );
    Ok(stream)
}
