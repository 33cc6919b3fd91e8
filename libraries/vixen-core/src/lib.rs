//! Vixen Core
//!
//! Collaborator contracts and shared types for the Vixen media controls.
//!
//! The control engine (`vixen-controls`) depends only on what this crate
//! defines:
//! - **Contracts**: `MediaHost`, `Dom`, `Platform`, `PreferenceStore`
//! - **Domain types**: source candidates, tracks, cues, lifecycle events
//! - **Error handling**: `VixenError` and `Result`
//! - **Headless hosts**: in-memory implementations of every contract
//!
//! # Example
//!
//! ```rust
//! use vixen_core::headless::HeadlessMedia;
//! use vixen_core::{MediaHost, MediaSourceCandidate};
//!
//! let media = HeadlessMedia::new();
//! media.support_type("video/webm");
//! media.add_source(MediaSourceCandidate::new("video/webm", Some(720), "clip-720.webm"));
//!
//! assert_eq!(media.sources().len(), 1);
//! assert!(media.can_play_type("video/webm").is_playable());
//! ```

#![forbid(unsafe_code)]

pub mod error;
pub mod headless;
pub mod traits;
pub mod types;

pub use error::{Result, VixenError};
pub use traits::{Dom, MediaHost, Platform, PreferenceStore};
pub use types::{
    CanPlayType, ClassOp, Cue, ElementHandle, Geometry, MediaEvent, MediaSourceCandidate, Member,
    NetworkState, PointerButton, ReadyState, ResourceId, Scheduled, Scope, TimeRanges, TimerId,
    TrackInfo, TrackKind, TrackMode, TrackReadiness, UiEvent,
};
