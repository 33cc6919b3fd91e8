//! Vixen Controls - Media Control Surface
//!
//! Builds a custom control surface over a host media resource and keeps
//! the two in sync.
//!
//! This crate provides:
//! - Pointer drag normalization for the scrubber and volume sliders
//! - An idempotent reconciliation pass from playback state to the surface
//! - A name-keyed event bus with isolated handlers
//! - Resolution switching that resumes at the recorded position
//! - Exclusive track selection and bounded chapter discovery
//! - Fullscreen capability resolution across vendor spellings
//! - A lifecycle state machine with an all-sources-failed fallback
//!
//! # Architecture
//!
//! `vixen-controls` never touches a platform directly. The media resource,
//! the element tree, the platform namespace and the preference store are
//! collaborators behind the traits of `vixen-core`, so the engine runs the
//! same against a browser binding, a native player or the headless
//! implementations used by the tests and the simulator.
//!
//! Everything is single-threaded and event driven: the host forwards
//! media events, UI events and timers to the controller, and the
//! controller answers by mutating the resource and re-reconciling.
//!
//! # Example
//!
//! ```rust
//! use vixen_controls::{Collaborators, ControllerConfig, MediaController, MediaResource};
//! use vixen_core::headless::{HeadlessDom, HeadlessMedia, HeadlessPlatform};
//! use vixen_core::ResourceId;
//!
//! let (dom, _body, element) = HeadlessDom::with_media_element("video");
//! let media = HeadlessMedia::new();
//!
//! let mut controller = MediaController::new(
//!     MediaResource { id: ResourceId(1), element, host: Box::new(media.clone()) },
//!     Collaborators {
//!         dom: Box::new(dom.clone()),
//!         platform: Box::new(HeadlessPlatform::default()),
//!         store: None,
//!     },
//!     ControllerConfig::default(),
//! )?;
//!
//! media.finish_loading(10.0);
//! for event in media.take_events() {
//!     controller.handle_media_event(event);
//! }
//!
//! controller.skip_forward()?;
//! assert_eq!(controller.ui_state().elapsed, "0:05");
//! # Ok::<(), vixen_controls::ControlError>(())
//! ```

#![forbid(unsafe_code)]

pub mod capability;
pub mod controller;
pub mod drag;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod reconcile;
pub mod registry;
pub mod sources;
pub mod surface;
pub mod tracks;
pub mod types;
pub mod volume;

pub use capability::{Capability, FullscreenApi};
pub use controller::{Collaborators, MediaController, MediaResource};
pub use drag::{DragPoint, DragSession, DragTarget};
pub use error::{ControlError, HandlerError, Result};
pub use events::{EventBus, HandlerResult, FATAL_ERROR, UPDATE_UI};
pub use lifecycle::{Lifecycle, LifecycleState, Transition};
pub use reconcile::{format_time, UiState};
pub use registry::ControllerRegistry;
pub use sources::SourceIndex;
pub use surface::{ControlSurface, SelectorAction, SelectorKind};
pub use tracks::{ChapterPoller, PollOutcome, TrackGroup};
pub use types::{ControllerConfig, PlaybackSession, ResumeSlot};
pub use volume::VolumeLevel;
