/// Simulator error types
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SimError>;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid scenario: {0}")]
    Scenario(String),

    #[error("Scenario parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Controller error: {0}")]
    Control(#[from] vixen_controls::ControlError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<config::ConfigError> for SimError {
    fn from(err: config::ConfigError) -> Self {
        SimError::Config(err.to_string())
    }
}
