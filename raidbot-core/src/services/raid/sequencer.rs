// File: raidbot-core/src/services/raid/sequencer.rs
//
// Runs the raid state machine against the inbound moderation channel.
// Resolution and the scene transition run as spawned tasks that report back
// over `progress`, tagged with the session generation they belong to.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::Error;
use crate::platforms::MetadataResolver;
use crate::services::artifacts::ArtifactSink;
use crate::services::raid::classifier::classify;
use crate::services::raid::display::compose_text;
use crate::services::raid::session::{RaidSession, SessionState};
use crate::services::scene_controller::SceneController;
use raidbot_common::models::{DisplayOptions, ModerationAction, RaidDecision, RaidMetadata};

enum Progress {
    Resolved {
        generation: u64,
        handle: String,
        result: Result<Option<RaidMetadata>, Error>,
    },
    Transitioned {
        generation: u64,
    },
}

pub struct RaidSequencer {
    resolver: Arc<dyn MetadataResolver>,
    artifacts: Arc<dyn ArtifactSink>,
    scene: Arc<SceneController>,
    display: DisplayOptions,
    session: RaidSession,
    state_tx: watch::Sender<SessionState>,
}

impl RaidSequencer {
    pub fn new(
        resolver: Arc<dyn MetadataResolver>,
        artifacts: Arc<dyn ArtifactSink>,
        scene: Arc<SceneController>,
        display: DisplayOptions,
    ) -> Self {
        Self {
            resolver,
            artifacts,
            scene,
            display,
            session: RaidSession::new(),
            state_tx: watch::Sender::new(SessionState::Idle),
        }
    }

    /// Follows every session state change.
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    fn publish_state(&self) {
        self.state_tx.send_replace(self.session.state());
    }

    /// Processes moderation actions until the sender side is dropped.
    ///
    /// Inbound actions are always polled first so an `unraid` is applied
    /// before any result that is already waiting.
    pub async fn run(mut self, mut actions: mpsc::Receiver<ModerationAction>) {
        let (progress_tx, mut progress_rx) = mpsc::unbounded_channel();

        loop {
            tokio::select! {
                biased;

                maybe_action = actions.recv() => match maybe_action {
                    Some(action) => self.on_action(action, &progress_tx),
                    None => {
                        info!("Moderation feed closed; raid sequencer stopping");
                        break;
                    }
                },
                Some(progress) = progress_rx.recv() => self.on_progress(progress, &progress_tx),
            }
            self.publish_state();
        }
    }

    fn on_action(&mut self, action: ModerationAction, progress_tx: &mpsc::UnboundedSender<Progress>) {
        info!("Mod action received: {} {:?} {}", action.action, action.args, action.kind);

        match classify(&action, self.session.is_active()) {
            RaidDecision::StartRaid { handle } => {
                let Some(generation) = self.session.begin() else { return };
                info!("Raid detected! Raiding {}", handle);

                let resolver = self.resolver.clone();
                let tx = progress_tx.clone();
                tokio::spawn(async move {
                    let result = resolver.resolve(&handle).await;
                    let _ = tx.send(Progress::Resolved { generation, handle, result });
                });
            }
            RaidDecision::CancelRaid => {
                if self.session.is_active() {
                    info!("Raid cancelled");
                } else {
                    debug!("Unraid with no raid in progress");
                }
                self.session.cancel();
            }
            RaidDecision::Ignore => {}
        }
    }

    fn on_progress(&mut self, progress: Progress, progress_tx: &mpsc::UnboundedSender<Progress>) {
        match progress {
            Progress::Resolved { generation, handle, result } => {
                if !self.session.is_resolving(generation) {
                    info!("Discarding metadata for {}; raid no longer current", handle);
                    return;
                }

                let metadata = match result {
                    Ok(Some(metadata)) => metadata,
                    Ok(None) => {
                        info!("Raid target '{}' does not exist; nothing to show", handle);
                        self.session.finish(generation);
                        return;
                    }
                    Err(e) => {
                        warn!("Could not resolve raid target '{}': {}", handle, e);
                        self.session.finish(generation);
                        return;
                    }
                };

                self.session.start_transition(generation);
                let text = compose_text(&metadata, self.display);
                let artifacts = self.artifacts.clone();
                let scene = self.scene.clone();
                let tx = progress_tx.clone();

                tokio::spawn(async move {
                    if let Err(e) = artifacts.write(&text, &metadata.profile_image).await {
                        warn!("Failed to write raid artifacts: {}", e);
                    }
                    if let Err(e) = scene.activate().await {
                        warn!("Scene activation failed: {}", e);
                    }
                    scene.release().await;
                    let _ = tx.send(Progress::Transitioned { generation });
                });
            }
            Progress::Transitioned { generation } => {
                if self.session.finish(generation) {
                    debug!("Raid sequence {} complete", generation);
                }
            }
        }
    }
}
