//! Error types for sightspeech.

use thiserror::Error;

/// Text source failures. Recovered locally: the navigator keeps its state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned HTTP {0}")]
    Status(u16),

    #[error("Malformed sequence payload: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Parse(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::Parse(e.to_string())
    }
}

#[derive(Error, Debug)]
pub enum AnnounceError {
    #[error("Failed to start speech process: {0}")]
    Spawn(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid configuration value for {key}: {message}")]
    Invalid { key: String, message: String },
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No announcer attached to the session")]
    MissingAnnouncer,

    #[error("No text source attached to the session")]
    MissingTextSource,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Session is no longer running")]
    Closed,
}
