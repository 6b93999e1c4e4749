use thiserror::Error;

/// Unified error type for the Chainwatch client
#[derive(Error, Debug)]
pub enum ChainwatchError {
    // Transport errors
    #[error("WebSocket error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    // Protocol errors
    #[error("Malformed frame: {0}")]
    MalformedFrame(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // Side-channel errors
    #[error("Fragment fetch failed: {0}")]
    FetchFailed(String),

    #[error("Fragment not available: {0}")]
    FragmentNotAvailable(String),

    // Configuration errors
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for Chainwatch operations
pub type Result<T> = std::result::Result<T, ChainwatchError>;

impl ChainwatchError {
    /// Whether the error is a per-message fault that should be logged and
    /// dropped without touching the connection lifecycle
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            ChainwatchError::MalformedFrame(_)
                | ChainwatchError::Json(_)
                | ChainwatchError::FetchFailed(_)
                | ChainwatchError::FragmentNotAvailable(_)
        )
    }
}

// Convert from reqwest errors
impl From<reqwest::Error> for ChainwatchError {
    fn from(err: reqwest::Error) -> Self {
        ChainwatchError::FetchFailed(err.to_string())
    }
}

// Convert from URL parse errors
impl From<url::ParseError> for ChainwatchError {
    fn from(err: url::ParseError) -> Self {
        ChainwatchError::InvalidConfig(err.to_string())
    }
}
