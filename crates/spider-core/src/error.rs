//! Error types for spider control

use thiserror::Error;

/// Main error type for spider control
#[derive(Error, Debug)]
pub enum SpiderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown reward mode: {0} (expected TARGET_MODE or NO_TARGET_MODE)")]
    UnknownRewardMode(String),

    #[error("Unknown policy: {0} (expected forward or redirect)")]
    UnknownPolicy(String),

    #[error("Observation is missing required field: {0}")]
    MissingObservationField(&'static str),

    #[error("Observation field {field} is not a number")]
    InvalidObservationField { field: String },

    #[error("Invalid angle: {0}")]
    InvalidAngle(f64),

    #[error("Pre-z queue not warmed up: expected {expected} entries, found {actual}")]
    QueueNotWarm { expected: usize, actual: usize },

    #[error("Policy error: {0}")]
    Policy(String),

    #[error("Environment error: {0}")]
    Environment(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for spider control operations
pub type Result<T> = std::result::Result<T, SpiderError>;
