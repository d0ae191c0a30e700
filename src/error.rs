use std::io;
use thiserror::Error;

/// Custom error type for the telemetry engine
#[derive(Error, Debug)]
pub enum SimError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid thresholds: {0}")]
    InvalidThresholds(String),

    #[error("Unknown metric: {0}")]
    UnknownMetric(String),

    #[error("Unknown event: {0}")]
    UnknownEvent(String),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

/// Result type alias for the telemetry engine
pub type Result<T> = std::result::Result<T, SimError>;

impl SimError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        SimError::Config(msg.into())
    }

    /// Create an invalid thresholds error
    pub fn invalid_thresholds<S: Into<String>>(msg: S) -> Self {
        SimError::InvalidThresholds(msg.into())
    }

    pub fn unknown_metric<S: Into<String>>(name: S) -> Self {
        SimError::UnknownMetric(name.into())
    }

    pub fn unknown_event<S: Into<String>>(name: S) -> Self {
        SimError::UnknownEvent(name.into())
    }

    pub fn runtime<S: Into<String>>(msg: S) -> Self {
        SimError::Runtime(msg.into())
    }
}
