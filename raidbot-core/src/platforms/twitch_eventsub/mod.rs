// File: src/platforms/twitch_eventsub/mod.rs

pub mod events;
pub mod runtime;

pub use events::{ChannelModerate, EventSubNotificationEnvelope};
pub use runtime::ModerationEventSub;
