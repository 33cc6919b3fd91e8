/// Core error types for Vixen
use thiserror::Error;

/// Result type alias using `VixenError`
pub type Result<T> = std::result::Result<T, VixenError>;

/// Failure reported by a collaborator (host resource, element tree, platform)
#[derive(Error, Debug)]
pub enum VixenError {
    /// The host media resource rejected an operation
    #[error("Host error: {0}")]
    Host(String),

    /// The platform does not offer the requested capability
    #[error("Not supported: {0}")]
    Unsupported(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization errors
    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl VixenError {
    /// Create a host error
    pub fn host(msg: impl Into<String>) -> Self {
        Self::Host(msg.into())
    }

    /// Create an unsupported-capability error
    pub fn unsupported(msg: impl Into<String>) -> Self {
        Self::Unsupported(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}
