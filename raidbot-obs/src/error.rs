use thiserror::Error;

#[derive(Error, Debug)]
pub enum ObsError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("WebSocket error: {0}")]
    WebSocketError(String),

    #[error("Source '{source_name}' not found in scene '{scene}'")]
    SourceNotFound { scene: String, source_name: String },

    #[error("Not connected to OBS")]
    NotConnected,
}

pub type Result<T> = std::result::Result<T, ObsError>;
