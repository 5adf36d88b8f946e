// File: raidbot-core/src/services/scene_controller.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::Error;
use crate::platforms::SceneBackend;
use raidbot_common::models::{RaidConfig, SceneSnapshot};

/// How the raid overlay is surfaced in OBS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneMode {
    /// Show `source_name` inside whatever scene is live.
    Nested { source_name: String },
    /// Cut the program output over to `scene_name`.
    Switch { scene_name: String },
}

impl SceneMode {
    pub fn from_config(cfg: &RaidConfig) -> Self {
        if cfg.nested {
            SceneMode::Nested { source_name: cfg.obs_scene_name.clone() }
        } else {
            SceneMode::Switch { scene_name: cfg.obs_scene_name.clone() }
        }
    }
}

#[derive(Debug, Default)]
struct OverlayState {
    snapshot: Option<SceneSnapshot>,
    /// Whether we left the snapshot's item enabled.
    visible: bool,
}

/// Drives scene visibility for the raid overlay and undoes it on stream stop.
///
/// Only the most recent `SceneSnapshot` is kept.
pub struct SceneController {
    backend: Arc<dyn SceneBackend>,
    mode: SceneMode,
    settle_delay: Duration,
    state: Mutex<OverlayState>,
}

impl SceneController {
    pub fn new(backend: Arc<dyn SceneBackend>, mode: SceneMode, settle_delay: Duration) -> Self {
        Self {
            backend,
            mode,
            settle_delay,
            state: Mutex::new(OverlayState::default()),
        }
    }

    pub async fn snapshot(&self) -> Option<SceneSnapshot> {
        self.state.lock().await.snapshot.clone()
    }

    /// Waits out the settle delay, records the live scene, then shows the
    /// overlay (nested) or switches to the target scene.
    ///
    /// A missing overlay source is not an error. Only failing to read the
    /// current scene or to switch scenes is reported.
    pub async fn activate(&self) -> Result<(), Error> {
        tokio::time::sleep(self.settle_delay).await;

        let current = self.backend.current_program_scene().await?;
        let mut state = self.state.lock().await;

        match &self.mode {
            SceneMode::Nested { source_name } => {
                let item_id = match self.backend.scene_item_id(&current, source_name).await {
                    Ok(id) => id,
                    Err(e) => {
                        debug!("Overlay '{}' not in scene '{}': {}", source_name, current, e);
                        state.snapshot = Some(SceneSnapshot { scene_name: current, source_id: None });
                        state.visible = false;
                        return Ok(());
                    }
                };

                let snapshot = SceneSnapshot { scene_name: current, source_id: Some(item_id) };
                if state.visible && state.snapshot.as_ref() == Some(&snapshot) {
                    debug!("Overlay '{}' already shown in '{}'", source_name, snapshot.scene_name);
                    return Ok(());
                }

                info!("Showing overlay '{}' in scene '{}'", source_name, snapshot.scene_name);
                state.visible = match self.backend.set_scene_item_enabled(&snapshot.scene_name, item_id, true).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!("Could not show overlay '{}': {}", source_name, e);
                        false
                    }
                };
                state.snapshot = Some(snapshot);
            }
            SceneMode::Switch { scene_name } => {
                let already_there = &current == scene_name;
                state.snapshot = Some(SceneSnapshot { scene_name: current, source_id: None });
                if already_there {
                    debug!("Already on scene '{}'", scene_name);
                    return Ok(());
                }
                info!("Switching scenes to '{}'", scene_name);
                self.backend.set_current_program_scene(scene_name).await?;
            }
        }
        Ok(())
    }

    /// Ends the current raid's hold on the overlay. The snapshot is kept for
    /// `deactivate()`, but the next `activate()` re-enables the item even if
    /// it was hidden from inside OBS in the meantime.
    pub async fn release(&self) {
        self.state.lock().await.visible = false;
    }

    /// Hides the overlay captured by the last `activate()`. Nested mode only;
    /// never fails.
    pub async fn deactivate(&self) {
        if !matches!(self.mode, SceneMode::Nested { .. }) {
            return;
        }

        let mut state = self.state.lock().await;
        let Some(SceneSnapshot { scene_name, source_id: Some(item_id) }) = state.snapshot.clone() else {
            debug!("No overlay captured yet; nothing to hide");
            return;
        };

        match self.backend.set_scene_item_enabled(&scene_name, item_id, false).await {
            Ok(()) => {
                info!("Hid raid overlay in scene '{}'", scene_name);
                state.visible = false;
            }
            Err(e) => warn!("Could not hide raid overlay in '{}': {}", scene_name, e),
        }
    }
}
