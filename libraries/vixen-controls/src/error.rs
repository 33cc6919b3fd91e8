//! Error types for the control engine

use thiserror::Error;
use vixen_core::{ResourceId, TrackKind, VixenError};

/// Control errors
///
/// Every variant except `Core` is a caller-input error: it is returned
/// synchronously and never retried.
#[derive(Debug, Error)]
pub enum ControlError {
    /// Event name outside `[A-Za-z0-9.*-]+`
    #[error("Invalid subscription: {name:?}")]
    InvalidSubscription { name: String },

    /// Volume outside `[0, 1]` or not a number
    #[error("Invalid volume: {0}")]
    InvalidVolume(String),

    /// Seek target that is not a finite number
    #[error("Invalid time: {0}")]
    InvalidTime(f64),

    /// No playable source carries this resolution tier
    #[error("Unknown resolution: {0}")]
    UnknownResolution(u32),

    /// No track at this index in the group
    #[error("Unknown {kind} track: {index}")]
    UnknownTrack { kind: TrackKind, index: usize },

    /// No chapter at this index
    #[error("Unknown chapter: {0}")]
    UnknownChapter(usize),

    /// A control was registered twice under the same name
    #[error("A control named {0:?} already exists")]
    DuplicateControl(String),

    /// The resource already has a controller
    #[error("{0} already has a controller")]
    AlreadyAttached(ResourceId),

    /// Controller configuration the engine cannot work with
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// The platform lacks a capability
    #[error("Not supported: {0}")]
    Unsupported(&'static str),

    /// Collaborator failure
    #[error(transparent)]
    Core(#[from] VixenError),
}

/// Result type for control operations
pub type Result<T> = std::result::Result<T, ControlError>;

/// Failure returned by an event handler
///
/// Handler failures are logged and never stop the remaining handlers of
/// the same publish.
#[derive(Debug, Error)]
#[error("Handler failed: {0}")]
pub struct HandlerError(pub String);

impl HandlerError {
    /// Create a handler error
    pub fn new(msg: impl Into<String>) -> Self {
        Self(msg.into())
    }
}
