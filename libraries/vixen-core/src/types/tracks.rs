/// Track types
use serde::{Deserialize, Serialize};
use std::fmt;

/// Group a track belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Captions,
    Chapters,
    Audio,
    Video,
}

impl TrackKind {
    /// All groups, in the order selectors are built
    pub const ALL: [Self; 4] = [Self::Captions, Self::Chapters, Self::Audio, Self::Video];

    /// Lowercase name, also used as selector class name
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Captions => "captions",
            Self::Chapters => "chapters",
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }

    /// Human readable selector label
    pub fn label(self) -> &'static str {
        match self {
            Self::Captions => "Captions",
            Self::Chapters => "Chapters",
            Self::Audio => "Audio",
            Self::Video => "Video",
        }
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Activation mode of a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackMode {
    /// Inactive, data is not loaded
    #[default]
    Off,
    /// Loaded and active, but not rendered
    Hidden,
    /// Active and rendered
    Showing,
}

/// One entry of a track group
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    /// BCP 47 language tag
    #[serde(default)]
    pub language: String,

    /// Display label
    #[serde(default)]
    pub label: String,

    /// Activation mode
    #[serde(default)]
    pub mode: TrackMode,
}

impl TrackInfo {
    /// Create a track in the `Off` mode
    pub fn new(language: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            label: label.into(),
            mode: TrackMode::Off,
        }
    }

    /// Label to show in a selector, falling back to the language tag
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() {
            &self.language
        } else {
            &self.label
        }
    }
}

/// Loading progress of a track's cue data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackReadiness {
    #[default]
    None,
    Loading,
    Loaded,
    Error,
}

/// A timed cue; for chapter tracks each cue is one chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Cue {
    /// Start offset in seconds
    pub start: f64,

    /// End offset in seconds
    pub end: f64,

    /// Cue payload (chapter title)
    pub text: String,
}

impl Cue {
    /// Create a cue
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }
}
