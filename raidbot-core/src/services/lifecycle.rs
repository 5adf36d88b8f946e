// File: raidbot-core/src/services/lifecycle.rs

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::mpsc;
use tracing::{error, info, warn};

use crate::platforms::SceneBackend;
use crate::services::scene_controller::SceneController;
use raidbot_obs::ObsLifecycleEvent;

/// Things that can end (or partly unwind) the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleEvent {
    StreamStateChanged { active: bool },
    ExitStarted,
    ConnectionLost,
    ConnectionFailed(String),
    Interrupt,
}

impl From<ObsLifecycleEvent> for LifecycleEvent {
    fn from(evt: ObsLifecycleEvent) -> Self {
        match evt {
            ObsLifecycleEvent::StreamStateChanged { active } => LifecycleEvent::StreamStateChanged { active },
            ObsLifecycleEvent::ExitStarted => LifecycleEvent::ExitStarted,
            ObsLifecycleEvent::ConnectionClosed => LifecycleEvent::ConnectionLost,
        }
    }
}

/// Process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownCode {
    Clean,
    ConnectionError,
}

impl ShutdownCode {
    pub fn code(self) -> i32 {
        match self {
            ShutdownCode::Clean => 0,
            ShutdownCode::ConnectionError => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOutcome {
    Continue,
    Exit(ShutdownCode),
    /// Shutdown already ran; the caller should not act again.
    AlreadyShuttingDown,
}

/// Maps connection and signal events onto a single shutdown path.
pub struct LifecycleSupervisor {
    scene: Arc<SceneController>,
    backend: Arc<dyn SceneBackend>,
    shutting_down: AtomicBool,
}

impl LifecycleSupervisor {
    pub fn new(scene: Arc<SceneController>, backend: Arc<dyn SceneBackend>) -> Self {
        Self {
            scene,
            backend,
            shutting_down: AtomicBool::new(false),
        }
    }

    pub async fn handle(&self, event: LifecycleEvent) -> LifecycleOutcome {
        match event {
            LifecycleEvent::StreamStateChanged { active: true } => LifecycleOutcome::Continue,
            LifecycleEvent::StreamStateChanged { active: false } => {
                info!("Stream stopped; hiding raid overlay");
                self.scene.deactivate().await;
                LifecycleOutcome::Continue
            }
            LifecycleEvent::ExitStarted => {
                info!("OBS is exiting");
                self.scene.deactivate().await;
                self.shutdown(ShutdownCode::Clean).await
            }
            LifecycleEvent::ConnectionLost => {
                warn!("Connection to OBS lost");
                self.shutdown(ShutdownCode::Clean).await
            }
            LifecycleEvent::ConnectionFailed(reason) => {
                error!("Connection to OBS failed: {}", reason);
                self.shutdown(ShutdownCode::ConnectionError).await
            }
            LifecycleEvent::Interrupt => {
                info!("Interrupt received");
                self.shutdown(ShutdownCode::Clean).await
            }
        }
    }

    /// Disconnects from OBS the first time it is called; later calls are no-ops.
    pub async fn shutdown(&self, code: ShutdownCode) -> LifecycleOutcome {
        if self.shutting_down.swap(true, Ordering::SeqCst) {
            return LifecycleOutcome::AlreadyShuttingDown;
        }
        info!("Shutting down and exiting");
        if let Err(e) = self.backend.disconnect().await {
            warn!("Error while disconnecting from OBS: {}", e);
        }
        LifecycleOutcome::Exit(code)
    }

    /// Consumes events until one of them ends the process. If the channel
    /// closes first, shuts down cleanly.
    pub async fn run(&self, mut events: mpsc::Receiver<LifecycleEvent>) -> ShutdownCode {
        while let Some(event) = events.recv().await {
            if let LifecycleOutcome::Exit(code) = self.handle(event).await {
                return code;
            }
        }
        match self.shutdown(ShutdownCode::Clean).await {
            LifecycleOutcome::Exit(code) => code,
            _ => ShutdownCode::Clean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::MockSceneBackend;
    use crate::services::scene_controller::SceneMode;
    use mockall::predicate::*;
    use std::time::Duration;

    /// A nested controller that has already shown item 7 in "Gameplay".
    async fn shown_overlay(backend: Arc<MockSceneBackend>) -> Arc<SceneController> {
        let ctl = Arc::new(SceneController::new(
            backend,
            SceneMode::Nested { source_name: "RaidOverlay".into() },
            Duration::ZERO,
        ));
        ctl.activate().await.unwrap();
        ctl
    }

    fn backend_expecting(hides: usize, disconnects: usize) -> MockSceneBackend {
        let mut backend = MockSceneBackend::new();
        backend.expect_current_program_scene().returning(|| Ok("Gameplay".into()));
        backend.expect_scene_item_id().returning(|_, _| Ok(7));
        backend
            .expect_set_scene_item_enabled()
            .with(always(), always(), eq(true))
            .returning(|_, _, _| Ok(()));
        backend
            .expect_set_scene_item_enabled()
            .with(eq("Gameplay"), eq(7), eq(false))
            .times(hides)
            .returning(|_, _, _| Ok(()));
        backend.expect_disconnect().times(disconnects).returning(|| Ok(()));
        backend
    }

    #[tokio::test]
    async fn stream_stop_hides_overlay_then_exit_started_shuts_down() {
        let backend = Arc::new(backend_expecting(2, 1));
        let scene = shown_overlay(backend.clone()).await;
        let sup = LifecycleSupervisor::new(scene, backend);

        let outcome = sup.handle(LifecycleEvent::StreamStateChanged { active: false }).await;
        assert_eq!(outcome, LifecycleOutcome::Continue);

        let outcome = sup.handle(LifecycleEvent::ExitStarted).await;
        assert_eq!(outcome, LifecycleOutcome::Exit(ShutdownCode::Clean));
    }

    #[tokio::test]
    async fn stream_start_is_ignored() {
        let backend = Arc::new(backend_expecting(0, 0));
        let scene = shown_overlay(backend.clone()).await;
        let sup = LifecycleSupervisor::new(scene, backend);

        let outcome = sup.handle(LifecycleEvent::StreamStateChanged { active: true }).await;
        assert_eq!(outcome, LifecycleOutcome::Continue);
    }

    #[tokio::test]
    async fn exit_codes_distinguish_failure_from_loss() {
        let backend = Arc::new(backend_expecting(0, 1));
        let scene = shown_overlay(backend.clone()).await;
        let sup = LifecycleSupervisor::new(scene, backend);
        assert_eq!(
            sup.handle(LifecycleEvent::ConnectionFailed("refused".into())).await,
            LifecycleOutcome::Exit(ShutdownCode::ConnectionError)
        );
        assert_eq!(ShutdownCode::ConnectionError.code(), 1);

        let backend = Arc::new(backend_expecting(0, 1));
        let scene = shown_overlay(backend.clone()).await;
        let sup = LifecycleSupervisor::new(scene, backend);
        assert_eq!(
            sup.handle(LifecycleEvent::ConnectionLost).await,
            LifecycleOutcome::Exit(ShutdownCode::Clean)
        );
        assert_eq!(ShutdownCode::Clean.code(), 0);
    }

    #[tokio::test]
    async fn shutdown_disconnects_only_once() {
        let backend = Arc::new(backend_expecting(0, 1));
        let scene = shown_overlay(backend.clone()).await;
        let sup = LifecycleSupervisor::new(scene, backend);

        assert_eq!(
            sup.handle(LifecycleEvent::Interrupt).await,
            LifecycleOutcome::Exit(ShutdownCode::Clean)
        );
        assert_eq!(sup.handle(LifecycleEvent::ConnectionLost).await, LifecycleOutcome::AlreadyShuttingDown);
        assert_eq!(sup.shutdown(ShutdownCode::ConnectionError).await, LifecycleOutcome::AlreadyShuttingDown);
    }

    #[tokio::test]
    async fn run_returns_first_exit_code() {
        let backend = Arc::new(backend_expecting(1, 1));
        let scene = shown_overlay(backend.clone()).await;
        let sup = LifecycleSupervisor::new(scene, backend);

        let (tx, rx) = mpsc::channel(4);
        tx.send(ObsLifecycleEvent::StreamStateChanged { active: false }.into()).await.unwrap();
        tx.send(ObsLifecycleEvent::ConnectionClosed.into()).await.unwrap();
        tx.send(LifecycleEvent::ConnectionFailed("late".into())).await.unwrap();

        assert_eq!(sup.run(rx).await, ShutdownCode::Clean);
    }
}
