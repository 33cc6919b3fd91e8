//! Collaborator contracts
//!
//! The control engine never touches a platform directly. Everything it
//! reads or mutates goes through one of these traits, so the same engine
//! runs against a browser binding, a native player or the headless
//! implementations in [`crate::headless`].

use crate::error::Result;
use crate::types::{
    CanPlayType, ClassOp, Cue, ElementHandle, Geometry, MediaSourceCandidate, Member,
    NetworkState, ReadyState, Scope, TimeRanges, TimerId, TrackInfo, TrackKind, TrackMode,
    TrackReadiness,
};
use std::time::Duration;

/// Host media resource
///
/// The resource is the source of truth for playback state. Controllers
/// read from it on every reconciliation and only mutate it through the
/// calls below.
pub trait MediaHost {
    /// Begin or resume playback
    ///
    /// # Errors
    /// Returns an error if the platform refuses to start playback
    fn play(&mut self) -> Result<()>;

    /// Pause playback
    fn pause(&mut self);

    /// Reset the resource and select a source again
    fn load(&mut self);

    /// Current playback position in seconds
    fn current_time(&self) -> f64;

    /// Seek to a position in seconds
    fn set_current_time(&mut self, seconds: f64);

    /// Duration in seconds; NaN while unknown, infinite for live streams
    fn duration(&self) -> f64;

    /// Whether playback is paused
    fn paused(&self) -> bool;

    /// Whether playback reached the end
    fn ended(&self) -> bool;

    /// Whether any seekable range exists
    fn seekable(&self) -> bool;

    /// Network activity
    fn network_state(&self) -> NetworkState;

    /// Amount of media available
    fn ready_state(&self) -> ReadyState;

    /// Volume in `[0, 1]`
    fn volume(&self) -> f64;

    /// Set volume; callers validate the range
    fn set_volume(&mut self, volume: f64);

    /// Whether audio is muted
    fn muted(&self) -> bool;

    /// Mute or unmute
    fn set_muted(&mut self, muted: bool);

    /// Buffered ranges
    fn buffered(&self) -> TimeRanges;

    /// Declared alternate sources, in declaration order
    fn sources(&self) -> Vec<MediaSourceCandidate>;

    /// Whether the platform can decode the mime type
    fn can_play_type(&self, mime_type: &str) -> CanPlayType;

    /// Locator of the active source
    fn current_src(&self) -> Option<String>;

    /// Replace the active source locator
    fn set_src(&mut self, locator: &str);

    /// Tracks of one group, in declaration order
    fn tracks(&self, kind: TrackKind) -> Vec<TrackInfo>;

    /// Change the activation mode of one track
    ///
    /// # Errors
    /// Returns an error if `index` does not name a track of `kind`
    fn set_track_mode(&mut self, kind: TrackKind, index: usize, mode: TrackMode) -> Result<()>;

    /// Loading progress of one track's cues
    fn track_readiness(&self, kind: TrackKind, index: usize) -> TrackReadiness;

    /// Cues of one track; empty until the track is loaded
    fn cues(&self, kind: TrackKind, index: usize) -> Vec<Cue>;
}

/// Element builder collaborator
///
/// Implementations must make class addition idempotent: adding a class an
/// element already carries leaves the class list unchanged.
pub trait Dom {
    /// Create a detached element of the given kind (`div`, `button`, ...)
    fn create(&mut self, kind: &str) -> ElementHandle;

    /// Append `child` as the last child of `parent`
    fn append(&mut self, parent: ElementHandle, child: ElementHandle);

    /// Put `replacement` where `node` sits in the tree; `node` becomes detached
    fn replace(&mut self, node: ElementHandle, replacement: ElementHandle);

    /// Add or remove a class
    fn set_class(&mut self, handle: ElementHandle, class: &str, op: ClassOp);

    /// Whether the element carries a class
    fn has_class(&self, handle: ElementHandle, class: &str) -> bool;

    /// Replace the element's text content
    fn set_text(&mut self, handle: ElementHandle, text: &str);

    /// Set an attribute
    fn set_attribute(&mut self, handle: ElementHandle, name: &str, value: &str);

    /// Ask the host to forward an event of the element to the controller
    fn listen(&mut self, handle: ElementHandle, event: &str);

    /// Set an inline style property
    fn set_style(&mut self, handle: ElementHandle, property: &str, value: &str);

    /// Offset box relative to the offset parent
    fn geometry(&self, handle: ElementHandle) -> Geometry;

    /// Nearest positioned ancestor, if any
    fn offset_parent(&self, handle: ElementHandle) -> Option<ElementHandle>;
}

/// Platform capability adapter
pub trait Platform {
    /// Enumerable members of a scope
    fn members(&self, scope: Scope) -> Vec<Member>;

    /// Call a member function by its platform name
    ///
    /// # Errors
    /// Returns an error if the call is rejected
    fn invoke(&mut self, scope: Scope, member: &str) -> Result<()>;

    /// Read a member as a flag (true when it holds a truthy / non-null value)
    fn read_flag(&self, scope: Scope, member: &str) -> bool;

    /// Ask for `MediaController::on_timer(timer)` to be called after `delay`
    fn schedule(&mut self, delay: Duration, timer: TimerId);
}

/// Key-value persistence for user preferences
pub trait PreferenceStore {
    /// Read a stored value
    fn get(&self, key: &str) -> Option<String>;

    /// Store a value
    fn set(&mut self, key: &str, value: &str);
}
