// File: raidbot-core/src/platforms/twitch_eventsub/events.rs

use serde::Deserialize;

use raidbot_common::models::ModerationAction;

/// Each subscription wrapper has metadata like `id`, `type`, etc.
#[derive(Debug, Clone, Deserialize)]
pub struct SubscriptionData {
    pub id: String,
    #[serde(rename = "type")]
    pub sub_type: String,
    pub version: String,
    pub status: String,
    #[serde(default)]
    pub condition: serde_json::Value,
}

/// The top-level wrapper from Twitch for a "notification" message is:
/// { "subscription": { ... }, "event": { ... } }
#[derive(Debug, Clone, Deserialize)]
pub struct EventSubNotificationEnvelope {
    pub subscription: SubscriptionData,
    pub event: serde_json::Value,
}

/// "channel.moderate" v2 event.
///
/// Twitch puts the details of each action in a field named after the action
/// (`raid`, `unraid`, `ban`, ...); everything not named here lands in `details`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChannelModerate {
    pub broadcaster_user_id: String,
    #[serde(default)]
    pub moderator_user_login: String,
    pub action: String,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}

impl ChannelModerate {
    /// Target login of the action, if the action has one.
    pub fn target_login(&self) -> Option<&str> {
        self.details
            .get(&self.action)
            .and_then(|d| d.get("user_login"))
            .and_then(|v| v.as_str())
    }

    pub fn to_moderation_action(&self) -> ModerationAction {
        let args = self
            .target_login()
            .map(|login| vec![login.to_string()])
            .unwrap_or_default();
        ModerationAction::moderation(self.action.clone(), args)
    }
}

/// Converts a notification into a `ModerationAction` if it is one we subscribed to.
pub fn parse_moderation_notification(envelope: &EventSubNotificationEnvelope) -> Option<ModerationAction> {
    if envelope.subscription.sub_type != "channel.moderate" {
        return None;
    }
    serde_json::from_value::<ChannelModerate>(envelope.event.clone())
        .ok()
        .map(|evt| evt.to_moderation_action())
}

#[cfg(test)]
mod tests {
    use super::*;
    use raidbot_common::models::MODERATION_TYPE;
    use serde_json::json;

    fn envelope(sub_type: &str, event: serde_json::Value) -> EventSubNotificationEnvelope {
        serde_json::from_value(json!({
            "subscription": {
                "id": "sub-1",
                "type": sub_type,
                "version": "2",
                "status": "enabled",
                "condition": {}
            },
            "event": event
        }))
        .unwrap()
    }

    #[test]
    fn raid_maps_target_login_to_first_arg() {
        let env = envelope("channel.moderate", json!({
            "broadcaster_user_id": "1",
            "broadcaster_user_login": "me",
            "moderator_user_login": "me",
            "action": "raid",
            "raid": { "user_id": "42", "user_login": "alice", "user_name": "Alice", "viewer_count": 7 },
            "unraid": null
        }));
        let action = parse_moderation_notification(&env).unwrap();
        assert_eq!(action.kind, MODERATION_TYPE);
        assert_eq!(action.action, "raid");
        assert_eq!(action.args, vec!["alice".to_string()]);
    }

    #[test]
    fn action_without_details_has_no_args() {
        let env = envelope("channel.moderate", json!({
            "broadcaster_user_id": "1",
            "action": "emoteonly",
            "raid": null
        }));
        let action = parse_moderation_notification(&env).unwrap();
        assert_eq!(action.action, "emoteonly");
        assert!(action.args.is_empty());
    }

    #[test]
    fn other_subscriptions_are_skipped() {
        let env = envelope("channel.follow", json!({ "user_login": "bob" }));
        assert!(parse_moderation_notification(&env).is_none());
    }
}
