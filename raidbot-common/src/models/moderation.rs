// File: raidbot-common/src/models/moderation.rs

use serde::{Deserialize, Serialize};

/// The only moderation record type the raid flow cares about.
pub const MODERATION_TYPE: &str = "chat_channel_moderation";

/// A single moderator-level action delivered by the moderation transport.
///
/// `args` is positional; for `raid` and `unraid` the first entry is the
/// target channel's login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationAction {
    #[serde(rename = "type")]
    pub kind: String,
    pub action: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl ModerationAction {
    pub fn new(kind: impl Into<String>, action: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            kind: kind.into(),
            action: action.into(),
            args,
        }
    }

    /// Shorthand for a `chat_channel_moderation` record.
    pub fn moderation(action: impl Into<String>, args: Vec<String>) -> Self {
        Self::new(MODERATION_TYPE, action, args)
    }

    /// First positional argument, if present and non-empty.
    pub fn target(&self) -> Option<&str> {
        self.args
            .first()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
    }
}

/// Outcome of classifying one `ModerationAction`. Never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RaidDecision {
    StartRaid { handle: String },
    CancelRaid,
    Ignore,
}
