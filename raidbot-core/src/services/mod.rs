// File: src/services/mod.rs

pub mod artifacts;
pub mod lifecycle;
pub mod raid;
pub mod scene_controller;

pub use artifacts::{ArtifactSink, FileArtifactWriter};
pub use lifecycle::{LifecycleEvent, LifecycleOutcome, LifecycleSupervisor, ShutdownCode};
pub use raid::{classify, compose_text, RaidSequencer, RaidSession, SessionState};
pub use scene_controller::{SceneController, SceneMode};
