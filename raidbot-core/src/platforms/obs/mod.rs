// File: src/platforms/obs/mod.rs

use async_trait::async_trait;
use raidbot_obs::ObsClient;

use crate::Error;
use crate::platforms::SceneBackend;

#[async_trait]
impl SceneBackend for ObsClient {
    async fn current_program_scene(&self) -> Result<String, Error> {
        Ok(ObsClient::current_program_scene(self).await?)
    }

    async fn scene_item_id(&self, scene_name: &str, source_name: &str) -> Result<i64, Error> {
        Ok(ObsClient::scene_item_id(self, scene_name, source_name).await?)
    }

    async fn set_scene_item_enabled(&self, scene_name: &str, item_id: i64, enabled: bool) -> Result<(), Error> {
        Ok(ObsClient::set_scene_item_enabled(self, scene_name, item_id, enabled).await?)
    }

    async fn set_current_program_scene(&self, scene_name: &str) -> Result<(), Error> {
        Ok(ObsClient::set_current_program_scene(self, scene_name).await?)
    }

    async fn disconnect(&self) -> Result<(), Error> {
        Ok(ObsClient::disconnect(self).await?)
    }
}
