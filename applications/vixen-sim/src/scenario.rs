//! Scripted scenarios
//!
//! A scenario declares the simulated resource (sources, tracks, chapter
//! cues) and a list of steps to play against its controller.

use crate::error::{Result, SimError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use vixen_core::headless::{HeadlessMedia, HeadlessTrack};
use vixen_core::{Cue, MediaSourceCandidate, TimeRanges, TrackInfo, TrackKind, TrackMode};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub media: MediaSpec,

    #[serde(default)]
    pub tracks: Vec<TrackSpec>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// The simulated media resource
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MediaSpec {
    /// Element kind the surface replaces
    #[serde(default = "default_kind")]
    pub kind: String,

    /// Mime types the platform can decode
    #[serde(default)]
    pub playable: Vec<String>,

    #[serde(default)]
    pub sources: Vec<MediaSourceCandidate>,

    /// Refuse `play()` as an autoplay policy would
    #[serde(default)]
    pub refuse_play: bool,
}

/// One declared track
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TrackSpec {
    pub kind: TrackKind,

    #[serde(default)]
    pub language: String,

    #[serde(default)]
    pub label: String,

    /// Start in showing mode
    #[serde(default)]
    pub showing: bool,

    #[serde(default)]
    pub cues: Vec<Cue>,

    /// Readiness checks needed before the track loads
    #[serde(default)]
    pub loads_after: u32,

    /// Never finish loading
    #[serde(default)]
    pub never_loads: bool,

    /// Drop back to off once while loading
    #[serde(default)]
    pub drops_mode_once: bool,
}

/// Scripted step
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Finish loading the current source with the given duration
    FinishLoading { duration: f64 },
    Play,
    Pause,
    PlayPause,
    /// Let `seconds` of virtual time pass, playing if the resource plays
    Advance { seconds: f64 },
    /// Let virtual time pass without touching playback
    Wait { ms: u64 },
    Seek { seconds: f64 },
    SkipForward,
    SkipBackward,
    Volume { level: f64 },
    Mute,
    /// Mute or unmute behind the controller's back
    ExternalMute { muted: bool },
    Fullscreen,
    /// Enter or leave fullscreen behind the controller's back
    ForceFullscreen { fullscreen: bool },
    Resolution { tier: u32 },
    Track { kind: TrackKind, index: Option<usize> },
    Chapter { index: usize },
    FailSource { index: usize },
    Buffered { ranges: Vec<(f64, f64)> },
    /// Drag the scrubber between two fractions of its length
    Scrub { from: f64, to: f64 },
    /// Drag the volume slider to a fraction of its length
    DragVolume { to: f64 },
    /// Click the control registered under `control`
    Click { control: String },
    Reload,
    /// Print the element tree
    Dump,
}

impl Step {
    /// Action name as written in scenario files
    pub fn name(&self) -> &'static str {
        match self {
            Self::FinishLoading { .. } => "finish_loading",
            Self::Play => "play",
            Self::Pause => "pause",
            Self::PlayPause => "play_pause",
            Self::Advance { .. } => "advance",
            Self::Wait { .. } => "wait",
            Self::Seek { .. } => "seek",
            Self::SkipForward => "skip_forward",
            Self::SkipBackward => "skip_backward",
            Self::Volume { .. } => "volume",
            Self::Mute => "mute",
            Self::ExternalMute { .. } => "external_mute",
            Self::Fullscreen => "fullscreen",
            Self::ForceFullscreen { .. } => "force_fullscreen",
            Self::Resolution { .. } => "resolution",
            Self::Track { .. } => "track",
            Self::Chapter { .. } => "chapter",
            Self::FailSource { .. } => "fail_source",
            Self::Buffered { .. } => "buffered",
            Self::Scrub { .. } => "scrub",
            Self::DragVolume { .. } => "drag_volume",
            Self::Click { .. } => "click",
            Self::Reload => "reload",
            Self::Dump => "dump",
        }
    }
}

impl Scenario {
    /// Parse a scenario from TOML text
    pub fn parse(text: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Read and parse a scenario file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut scenario = Self::parse(&text)?;
        if scenario.name.is_empty() {
            scenario.name = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        Ok(scenario)
    }

    /// Reject steps that cannot be simulated
    ///
    /// Values the controller validates itself (volume levels, tiers, track
    /// indices) are left alone so their errors show up in the report.
    pub fn validate(&self) -> Result<()> {
        for source in &self.media.sources {
            if source.locator.is_empty() {
                return Err(SimError::Scenario(format!(
                    "source of type {} has no locator",
                    source.mime_type
                )));
            }
        }
        for (position, step) in self.steps.iter().enumerate() {
            let invalid = |reason: &str| -> Result<()> {
                Err(SimError::Scenario(format!(
                    "step {} ({}): {}",
                    position + 1,
                    step.name(),
                    reason
                )))
            };
            match step {
                Step::FinishLoading { duration } if !(duration.is_finite() && *duration > 0.0) => {
                    return invalid("duration must be a positive number");
                }
                Step::Advance { seconds } if !(seconds.is_finite() && *seconds >= 0.0) => {
                    return invalid("seconds must not be negative");
                }
                Step::Scrub { from, to } if !is_fraction(*from) || !is_fraction(*to) => {
                    return invalid("scrub positions must be within [0, 1]");
                }
                Step::DragVolume { to } if !is_fraction(*to) => {
                    return invalid("volume position must be within [0, 1]");
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Build the simulated resource
    pub fn build_media(&self) -> HeadlessMedia {
        let media = HeadlessMedia::new();
        for mime_type in &self.media.playable {
            media.support_type(mime_type.clone());
        }
        for source in &self.media.sources {
            media.add_source(source.clone());
        }
        media.refuse_play(self.media.refuse_play);

        for spec in &self.tracks {
            let mut info = TrackInfo::new(spec.language.clone(), spec.label.clone());
            if spec.showing {
                info.mode = TrackMode::Showing;
            }
            let checks = if spec.never_loads {
                None
            } else {
                Some(spec.loads_after)
            };
            let mut track = HeadlessTrack::new(info)
                .with_cues(spec.cues.clone())
                .loads_after(checks);
            if spec.drops_mode_once {
                track = track.drops_mode_once();
            }
            media.add_track(spec.kind, track);
        }
        media
    }
}

/// Buffered ranges of a `buffered` step
pub fn time_ranges(ranges: &[(f64, f64)]) -> TimeRanges {
    TimeRanges::from_ranges(ranges.to_vec())
}

fn is_fraction(value: f64) -> bool {
    (0.0..=1.0).contains(&value)
}

fn default_kind() -> String {
    "video".to_string()
}

impl Default for MediaSpec {
    fn default() -> Self {
        Self {
            kind: default_kind(),
            playable: Vec::new(),
            sources: Vec::new(),
            refuse_play: false,
        }
    }
}
