mod dom;
mod media;
mod tracks;

pub use dom::{
    ClassOp, ElementHandle, Geometry, Member, PointerButton, Scheduled, Scope, TimerId, UiEvent,
};
pub use media::{
    CanPlayType, MediaEvent, MediaSourceCandidate, NetworkState, ReadyState, ResourceId,
    TimeRanges,
};
pub use tracks::{Cue, TrackInfo, TrackKind, TrackMode, TrackReadiness};
