//! Raid detection and the sequence that follows an accepted raid.

pub mod classifier;
pub mod display;
pub mod sequencer;
pub mod session;

pub use classifier::classify;
pub use display::compose_text;
pub use sequencer::RaidSequencer;
pub use session::{RaidSession, SessionState};
