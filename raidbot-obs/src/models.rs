use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObsInstance {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
}

impl Default for ObsInstance {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4455,
            password: None,
        }
    }
}

/// Connection and output state changes reported by OBS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObsLifecycleEvent {
    /// Streaming output started or stopped; the socket stays up either way.
    StreamStateChanged { active: bool },
    /// OBS itself is closing.
    ExitStarted,
    /// The event stream ended, i.e. the websocket is gone.
    ConnectionClosed,
}
