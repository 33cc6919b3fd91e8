/// Media resource types
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a host media resource
///
/// Used as the key of the controller registry so the resource and its
/// controller never hold references to each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub u64);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource#{}", self.0)
    }
}

/// Network activity of the media resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkState {
    /// Not yet initialized
    #[default]
    Empty,
    /// A source is selected but nothing is being fetched
    Idle,
    /// Actively fetching data
    Loading,
    /// No playable source was found
    NoSource,
}

impl NetworkState {
    /// Class-name suffix used for the container state class
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "network-empty",
            Self::Idle => "network-idle",
            Self::Loading => "network-loading",
            Self::NoSource => "network-no-source",
        }
    }

    /// All states, in declaration order
    pub const ALL: [Self; 4] = [Self::Empty, Self::Idle, Self::Loading, Self::NoSource];
}

/// How much of the media is available for playback
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    #[default]
    HaveNothing,
    HaveMetadata,
    HaveCurrentData,
    HaveFutureData,
    HaveEnoughData,
}

/// Answer of the platform to "can you play this mime type"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanPlayType {
    No,
    Maybe,
    Probably,
}

impl CanPlayType {
    /// Whether the platform reported the type as playable at all
    pub fn is_playable(self) -> bool {
        !matches!(self, Self::No)
    }
}

/// Set of buffered time ranges, in seconds
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeRanges {
    ranges: Vec<(f64, f64)>,
}

impl TimeRanges {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Create from `(start, end)` pairs
    pub fn from_ranges(ranges: Vec<(f64, f64)>) -> Self {
        Self { ranges }
    }

    /// Append a range
    pub fn push(&mut self, start: f64, end: f64) {
        self.ranges.push((start, end));
    }

    /// Number of ranges
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether no range is buffered
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Iterate over `(start, end)` pairs
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.ranges.iter().copied()
    }

    /// Largest end point across all ranges
    ///
    /// Non-finite end points are ignored. Returns 0.0 for an empty set.
    pub fn max_end(&self) -> f64 {
        self.ranges
            .iter()
            .map(|&(_, end)| end)
            .filter(|end| end.is_finite())
            .fold(0.0, f64::max)
    }
}

/// One playable encoding declared on the media resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSourceCandidate {
    /// Mime type, e.g. `video/webm`
    pub mime_type: String,

    /// Resolution tier (vertical lines), when declared
    #[serde(default)]
    pub resolution: Option<u32>,

    /// Where the encoding lives
    pub locator: String,
}

impl MediaSourceCandidate {
    /// Create a candidate
    pub fn new(
        mime_type: impl Into<String>,
        resolution: Option<u32>,
        locator: impl Into<String>,
    ) -> Self {
        Self {
            mime_type: mime_type.into(),
            resolution,
            locator: locator.into(),
        }
    }
}

/// Lifecycle signal delivered by the host media resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaEvent {
    LoadStart,
    Progress,
    Suspend,
    Abort,
    Error,
    Emptied,
    Stalled,
    LoadedMetadata,
    LoadedData,
    CanPlay,
    CanPlayThrough,
    Playing,
    Waiting,
    Seeking,
    Seeked,
    Ended,
    DurationChange,
    TimeUpdate,
    Play,
    Pause,
    RateChange,
    Resize,
    VolumeChange,
    /// A declared source candidate failed to load
    SourceError {
        /// Position of the candidate in the declared source list
        index: usize,
    },
}

impl MediaEvent {
    /// Name under which the event is published on the event bus
    pub fn name(self) -> &'static str {
        match self {
            Self::LoadStart => "loadstart",
            Self::Progress => "progress",
            Self::Suspend => "suspend",
            Self::Abort => "abort",
            Self::Error => "error",
            Self::Emptied => "emptied",
            Self::Stalled => "stalled",
            Self::LoadedMetadata => "loadedmetadata",
            Self::LoadedData => "loadeddata",
            Self::CanPlay => "canplay",
            Self::CanPlayThrough => "canplaythrough",
            Self::Playing => "playing",
            Self::Waiting => "waiting",
            Self::Seeking => "seeking",
            Self::Seeked => "seeked",
            Self::Ended => "ended",
            Self::DurationChange => "durationchange",
            Self::TimeUpdate => "timeupdate",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::RateChange => "ratechange",
            Self::Resize => "resize",
            Self::VolumeChange => "volumechange",
            Self::SourceError { .. } => "sourceerror",
        }
    }

    /// Whether enough of the media is loaded to resume a pending swap
    pub fn is_sufficiently_loaded(self) -> bool {
        matches!(
            self,
            Self::LoadedMetadata | Self::CanPlay | Self::CanPlayThrough
        )
    }

    /// Parse a lifecycle name; `sourceerror` is not parseable since it carries an index
    pub fn from_name(name: &str) -> Option<Self> {
        let event = match name {
            "loadstart" => Self::LoadStart,
            "progress" => Self::Progress,
            "suspend" => Self::Suspend,
            "abort" => Self::Abort,
            "error" => Self::Error,
            "emptied" => Self::Emptied,
            "stalled" => Self::Stalled,
            "loadedmetadata" => Self::LoadedMetadata,
            "loadeddata" => Self::LoadedData,
            "canplay" => Self::CanPlay,
            "canplaythrough" => Self::CanPlayThrough,
            "playing" => Self::Playing,
            "waiting" => Self::Waiting,
            "seeking" => Self::Seeking,
            "seeked" => Self::Seeked,
            "ended" => Self::Ended,
            "durationchange" => Self::DurationChange,
            "timeupdate" => Self::TimeUpdate,
            "play" => Self::Play,
            "pause" => Self::Pause,
            "ratechange" => Self::RateChange,
            "resize" => Self::Resize,
            "volumechange" => Self::VolumeChange,
            _ => return None,
        };
        Some(event)
    }
}
