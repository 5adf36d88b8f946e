// File: src/platforms/mod.rs

use async_trait::async_trait;
use raidbot_common::models::RaidMetadata;
use crate::Error;

/// The slice of the OBS request surface the raid overlay needs.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SceneBackend: Send + Sync {
    async fn current_program_scene(&self) -> Result<String, Error>;
    /// Fails when `source_name` is not placed in `scene_name`.
    async fn scene_item_id(&self, scene_name: &str, source_name: &str) -> Result<i64, Error>;
    async fn set_scene_item_enabled(&self, scene_name: &str, item_id: i64, enabled: bool) -> Result<(), Error>;
    async fn set_current_program_scene(&self, scene_name: &str) -> Result<(), Error>;
    async fn disconnect(&self) -> Result<(), Error>;
}

/// Looks up the channel being raided.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetadataResolver: Send + Sync {
    /// `Ok(None)` means the handle does not exist, which is not an error.
    async fn resolve(&self, handle: &str) -> Result<Option<RaidMetadata>, Error>;
}

// Re-export submodules
pub mod obs;
pub mod twitch;
pub mod twitch_eventsub;
