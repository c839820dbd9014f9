//! Error types for AFH Property Scout

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ScoutError>;

#[derive(Error, Debug)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The wrapped action failed. By the time a caller sees this, the guard
    /// has already shown an error notification for it.
    #[error("Action failed: {0}")]
    ActionFailed(String),

    /// An analyzer could not produce a report
    #[error("Analysis error: {0}")]
    Analysis(String),

    #[error("Busy: {0}")]
    Busy(String),

    #[error("Runtime unavailable: {0}")]
    Runtime(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ScoutError {
    /// Returns the appropriate exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            ScoutError::InvalidInput(_) => 3,
            ScoutError::Busy(_) => 4,
            ScoutError::ActionFailed(_) => 1,
            ScoutError::Analysis(_) => 1,
            ScoutError::Config(_) => 1,
            ScoutError::Runtime(_) => 1,
            ScoutError::Serialization(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Failure reported by a view renderer.
///
/// Renderer failures never propagate out of the queue or the guard; they are
/// logged and the caller's bookkeeping carries on.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("View unavailable: {0}")]
pub struct RenderError(pub String);
