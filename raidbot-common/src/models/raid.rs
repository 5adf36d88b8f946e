// File: raidbot-common/src/models/raid.rs

/// Everything resolved about the raided channel for one session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaidMetadata {
    pub display_name: String,
    /// Game of the current live stream; `None` when the channel is offline.
    pub game_name: Option<String>,
    pub profile_image: Vec<u8>,
}

/// Text written to the name and game artifacts after display options are applied.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RaidText {
    pub name: String,
    pub game: String,
}

/// Scene (and nested overlay item) active when the last transition fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SceneSnapshot {
    pub scene_name: String,
    pub source_id: Option<i64>,
}
