// File: raidbot-common/src/models/mod.rs
pub mod config;
pub mod credential;
pub mod moderation;
pub mod raid;

pub use config::{DisplayOptions, RaidConfig};
pub use credential::TokenData;
pub use moderation::{ModerationAction, RaidDecision, MODERATION_TYPE};
pub use raid::{RaidMetadata, RaidText, SceneSnapshot};
