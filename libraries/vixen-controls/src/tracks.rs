//! Track groups and chapter discovery
//!
//! Captions, audio and video tracks are selected with mutual exclusion
//! inside their group. Chapter tracks are switched to `Hidden` so the
//! platform loads their cues without rendering them, then polled until
//! every one reports loaded or runs out of attempts.

use crate::error::{ControlError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use vixen_core::{Cue, MediaHost, TrackInfo, TrackKind, TrackMode, TrackReadiness};

/// Groups a user can pick a track from
pub const SELECTABLE_KINDS: [TrackKind; 3] = [TrackKind::Captions, TrackKind::Audio, TrackKind::Video];

/// Snapshot of one group's tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackGroup {
    kind: TrackKind,
    tracks: Vec<TrackInfo>,
}

impl TrackGroup {
    /// Snapshot the tracks of `kind`
    pub fn discover(host: &dyn MediaHost, kind: TrackKind) -> Self {
        Self {
            kind,
            tracks: host.tracks(kind),
        }
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn tracks(&self) -> &[TrackInfo] {
        &self.tracks
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Index of the showing track
    pub fn showing(&self) -> Option<usize> {
        self.tracks
            .iter()
            .position(|track| track.mode == TrackMode::Showing)
    }

    /// Show the track at `index`, or no track at all with `None`
    ///
    /// Every sibling is switched off before the target is shown.
    pub fn select(&mut self, host: &mut dyn MediaHost, index: Option<usize>) -> Result<()> {
        if self.kind == TrackKind::Chapters {
            return Err(ControlError::Unsupported("selecting chapter tracks"));
        }
        if let Some(index) = index {
            if index >= self.tracks.len() {
                return Err(ControlError::UnknownTrack {
                    kind: self.kind,
                    index,
                });
            }
        }

        for position in (0..self.tracks.len()).filter(|&p| Some(p) != index) {
            host.set_track_mode(self.kind, position, TrackMode::Off)?;
            self.tracks[position].mode = TrackMode::Off;
        }
        if let Some(index) = index {
            host.set_track_mode(self.kind, index, TrackMode::Showing)?;
            self.tracks[index].mode = TrackMode::Showing;
        }
        tracing::info!(kind = %self.kind, ?index, "track selected");
        Ok(())
    }
}

/// Result of one chapter poll attempt
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Some tracks are still loading; poll again later
    Pending,

    /// Every track finished or was given up; merged chapters, by start
    Complete(Vec<Cue>),

    /// Nothing left to poll
    Idle,
}

/// Bounded readiness poll over the chapter tracks
#[derive(Debug, Clone, Default)]
pub struct ChapterPoller {
    /// Track index to attempts made so far
    pending: BTreeMap<usize, u32>,
    loaded: Vec<usize>,
    abandoned: Vec<usize>,
    max_attempts: u32,
    finished: bool,
}

impl ChapterPoller {
    /// Switch every chapter track to `Hidden` and start tracking it
    pub fn start(host: &mut dyn MediaHost, max_attempts: u32) -> Self {
        let mut poller = Self {
            max_attempts,
            ..Self::default()
        };

        for index in 0..host.tracks(TrackKind::Chapters).len() {
            match host.set_track_mode(TrackKind::Chapters, index, TrackMode::Hidden) {
                Ok(()) => {
                    poller.pending.insert(index, 0);
                }
                Err(e) => {
                    tracing::warn!(index, error = %e, "chapter track refused hidden mode");
                    poller.abandoned.push(index);
                }
            }
        }
        poller.finished = poller.pending.is_empty();
        tracing::debug!(tracks = poller.pending.len(), "chapter polling started");
        poller
    }

    /// Whether any track is still under poll
    pub fn is_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Tracks whose cues were collected
    pub fn loaded(&self) -> &[usize] {
        &self.loaded
    }

    /// Tracks given up on
    pub fn abandoned(&self) -> &[usize] {
        &self.abandoned
    }

    /// Run one attempt over every pending track
    ///
    /// The hidden mode is re-asserted on each attempt since platforms may
    /// drop it while loading.
    pub fn poll(&mut self, host: &mut dyn MediaHost) -> PollOutcome {
        if self.finished {
            return PollOutcome::Idle;
        }

        let mut settled = Vec::new();
        for (&index, attempts) in &mut self.pending {
            *attempts += 1;
            if let Err(e) = host.set_track_mode(TrackKind::Chapters, index, TrackMode::Hidden) {
                tracing::debug!(index, error = %e, "could not re-assert hidden mode");
            }

            match host.track_readiness(TrackKind::Chapters, index) {
                TrackReadiness::Loaded => {
                    tracing::debug!(index, attempts = *attempts, "chapter track loaded");
                    self.loaded.push(index);
                    settled.push(index);
                }
                TrackReadiness::Error => {
                    tracing::debug!(index, attempts = *attempts, "chapter track failed to load");
                    self.abandoned.push(index);
                    settled.push(index);
                }
                TrackReadiness::None | TrackReadiness::Loading
                    if *attempts >= self.max_attempts =>
                {
                    tracing::debug!(index, attempts = *attempts, "giving up on chapter track");
                    self.abandoned.push(index);
                    settled.push(index);
                }
                TrackReadiness::None | TrackReadiness::Loading => {}
            }
        }
        for index in settled {
            self.pending.remove(&index);
        }

        if self.is_pending() {
            return PollOutcome::Pending;
        }
        self.finished = true;
        PollOutcome::Complete(merge_chapters(host, &self.loaded))
    }
}

/// Cues of the given chapter tracks as one list sorted by start
pub fn merge_chapters(host: &dyn MediaHost, tracks: &[usize]) -> Vec<Cue> {
    let mut cues: Vec<Cue> = tracks
        .iter()
        .flat_map(|&index| host.cues(TrackKind::Chapters, index))
        .collect();
    cues.sort_by(|a, b| a.start.total_cmp(&b.start));
    cues
}
