// File: raidbot-core/src/platforms/twitch/resolver.rs

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::Error;
use crate::platforms::MetadataResolver;
use crate::platforms::twitch::client::TwitchHelixClient;
use crate::platforms::twitch::requests::stream::{get_stream, StreamData};
use crate::platforms::twitch::requests::user::{get_user_by_login, UserData};
use raidbot_common::models::RaidMetadata;

/// Resolves raid targets through Helix: user, live stream, then avatar bytes.
pub struct HelixMetadataResolver {
    client: Arc<TwitchHelixClient>,
}

impl HelixMetadataResolver {
    pub fn new(client: Arc<TwitchHelixClient>) -> Self {
        Self { client }
    }
}

pub fn build_metadata(user: &UserData, stream: Option<&StreamData>, profile_image: Vec<u8>) -> RaidMetadata {
    RaidMetadata {
        display_name: user.shown_name().to_string(),
        game_name: stream
            .map(|s| s.game_name.clone())
            .filter(|g| !g.is_empty()),
        profile_image,
    }
}

#[async_trait]
impl MetadataResolver for HelixMetadataResolver {
    async fn resolve(&self, handle: &str) -> Result<Option<RaidMetadata>, Error> {
        let Some(user) = get_user_by_login(&self.client, handle).await? else {
            info!("No Twitch user named '{}'", handle);
            return Ok(None);
        };

        let stream = get_stream(&self.client, &user.id).await?;
        let image = self.client.get_bytes(&user.profile_image_url).await?;
        debug!("Fetched {} byte profile image for {}", image.len(), user.login);

        Ok(Some(build_metadata(&user, stream.as_ref(), image)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(display: &str) -> UserData {
        UserData {
            id: "42".into(),
            login: "alice".into(),
            display_name: display.into(),
            profile_image_url: "https://cdn/alice.png".into(),
        }
    }

    fn stream(game: &str) -> StreamData {
        StreamData {
            id: "s1".into(),
            user_id: "42".into(),
            user_login: "alice".into(),
            user_name: "Alice".into(),
            game_id: "743".into(),
            game_name: game.into(),
            type_field: "live".into(),
            title: "gm".into(),
            viewer_count: 12,
        }
    }

    #[test]
    fn live_stream_carries_game() {
        let meta = build_metadata(&user("Alice"), Some(&stream("Chess")), vec![1, 2, 3]);
        assert_eq!(meta.display_name, "Alice");
        assert_eq!(meta.game_name.as_deref(), Some("Chess"));
        assert_eq!(meta.profile_image, vec![1, 2, 3]);
    }

    #[test]
    fn offline_or_blank_game_is_none() {
        assert_eq!(build_metadata(&user("Alice"), None, vec![]).game_name, None);
        assert_eq!(build_metadata(&user(""), Some(&stream("")), vec![]).game_name, None);
        assert_eq!(build_metadata(&user(""), None, vec![]).display_name, "alice");
    }
}
