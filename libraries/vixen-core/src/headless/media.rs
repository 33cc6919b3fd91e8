//! Simulated media resource
//!
//! Behaves like a browser media element closely enough to exercise a
//! controller: mutating calls update the state and queue the lifecycle
//! events a real element would fire. Drivers drain the queue with
//! [`HeadlessMedia::take_events`] and forward it to the controller.

use crate::error::{Result, VixenError};
use crate::traits::MediaHost;
use crate::types::{
    CanPlayType, Cue, MediaEvent, MediaSourceCandidate, NetworkState, ReadyState, TimeRanges,
    TrackInfo, TrackKind, TrackMode, TrackReadiness,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

/// A track of the simulated resource
#[derive(Debug, Clone)]
pub struct HeadlessTrack {
    /// Language, label and mode
    pub info: TrackInfo,

    /// Cues reported once loaded
    pub cues: Vec<Cue>,

    /// Readiness checks needed after activation before the track reports loaded;
    /// `None` never loads
    pub loads_after: Option<u32>,

    /// Drop back to `Off` on the first readiness check while loading
    pub drops_mode_once: bool,

    readiness: TrackReadiness,
    checks: u32,
}

impl HeadlessTrack {
    /// A track that loads on the first readiness check after activation
    pub fn new(info: TrackInfo) -> Self {
        Self {
            info,
            cues: Vec::new(),
            loads_after: Some(0),
            drops_mode_once: false,
            readiness: TrackReadiness::None,
            checks: 0,
        }
    }

    /// Set the cues
    #[must_use]
    pub fn with_cues(mut self, cues: Vec<Cue>) -> Self {
        self.cues = cues;
        self
    }

    /// Set the number of checks before loading completes
    #[must_use]
    pub fn loads_after(mut self, checks: Option<u32>) -> Self {
        self.loads_after = checks;
        self
    }

    /// Make the track drop its mode once while loading
    #[must_use]
    pub fn drops_mode_once(mut self) -> Self {
        self.drops_mode_once = true;
        self
    }
}

#[derive(Debug)]
struct MediaState {
    current_time: f64,
    duration: f64,
    paused: bool,
    ended: bool,
    network_state: NetworkState,
    ready_state: ReadyState,
    volume: f64,
    muted: bool,
    buffered: TimeRanges,
    sources: Vec<MediaSourceCandidate>,
    playable_types: Vec<String>,
    src: Option<String>,
    tracks: BTreeMap<TrackKind, Vec<HeadlessTrack>>,
    events: VecDeque<MediaEvent>,
    load_count: u32,
    refuse_play: bool,
}

impl Default for MediaState {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: f64::NAN,
            paused: true,
            ended: false,
            network_state: NetworkState::Empty,
            ready_state: ReadyState::HaveNothing,
            volume: 1.0,
            muted: false,
            buffered: TimeRanges::new(),
            sources: Vec::new(),
            playable_types: Vec::new(),
            src: None,
            tracks: BTreeMap::new(),
            events: VecDeque::new(),
            load_count: 0,
            refuse_play: false,
        }
    }
}

/// Simulated media resource
///
/// Clones share state, so the driver keeps a clone while the controller
/// owns another.
#[derive(Debug, Clone, Default)]
pub struct HeadlessMedia {
    state: Rc<RefCell<MediaState>>,
}

impl HeadlessMedia {
    /// Create an empty resource with unknown duration
    pub fn new() -> Self {
        Self::default()
    }

    // ===== Setup =====

    /// Declare a source candidate
    pub fn add_source(&self, candidate: MediaSourceCandidate) {
        self.state.borrow_mut().sources.push(candidate);
    }

    /// Mark a mime type as decodable
    pub fn support_type(&self, mime_type: impl Into<String>) {
        self.state.borrow_mut().playable_types.push(mime_type.into());
    }

    /// Declare a track
    pub fn add_track(&self, kind: TrackKind, track: HeadlessTrack) {
        self.state
            .borrow_mut()
            .tracks
            .entry(kind)
            .or_default()
            .push(track);
    }

    /// Refuse subsequent `play()` calls, as an autoplay policy would
    pub fn refuse_play(&self, refuse: bool) {
        self.state.borrow_mut().refuse_play = refuse;
    }

    // ===== Simulation =====

    /// Finish loading metadata and enough data to play through
    pub fn finish_loading(&self, duration: f64) {
        let mut state = self.state.borrow_mut();
        state.duration = duration;
        state.network_state = NetworkState::Idle;
        state.ready_state = ReadyState::HaveEnoughData;
        state.events.extend([
            MediaEvent::DurationChange,
            MediaEvent::LoadedMetadata,
            MediaEvent::LoadedData,
            MediaEvent::CanPlay,
            MediaEvent::CanPlayThrough,
        ]);
    }

    /// Report buffered ranges
    pub fn set_buffered(&self, buffered: TimeRanges) {
        let mut state = self.state.borrow_mut();
        state.buffered = buffered;
        state.events.push_back(MediaEvent::Progress);
    }

    /// Advance playback by `seconds` if playing
    pub fn advance(&self, seconds: f64) {
        let mut state = self.state.borrow_mut();
        if state.paused || state.ended {
            return;
        }
        let next = state.current_time + seconds;
        if state.duration.is_finite() && next >= state.duration {
            state.current_time = state.duration;
            state.ended = true;
            state.paused = true;
            state.events.extend([
                MediaEvent::TimeUpdate,
                MediaEvent::Pause,
                MediaEvent::Ended,
            ]);
        } else {
            state.current_time = next;
            state.events.push_back(MediaEvent::TimeUpdate);
        }
    }

    /// Fail the declared source at `index`
    pub fn fail_source(&self, index: usize) {
        let mut state = self.state.borrow_mut();
        state.events.push_back(MediaEvent::SourceError { index });
        if index + 1 >= state.sources.len() {
            state.network_state = NetworkState::NoSource;
        }
    }

    /// Change the muted flag from outside the controller, as a system control would
    pub fn external_mute(&self, muted: bool) {
        let mut state = self.state.borrow_mut();
        state.muted = muted;
        state.events.push_back(MediaEvent::VolumeChange);
    }

    /// Drain queued lifecycle events
    pub fn take_events(&self) -> Vec<MediaEvent> {
        self.state.borrow_mut().events.drain(..).collect()
    }

    // ===== Inspection =====

    /// How many times `load()` was called
    pub fn load_count(&self) -> u32 {
        self.state.borrow().load_count
    }

    /// Current mode of a track
    pub fn track_mode(&self, kind: TrackKind, index: usize) -> Option<TrackMode> {
        self.state
            .borrow()
            .tracks
            .get(&kind)
            .and_then(|tracks| tracks.get(index))
            .map(|track| track.info.mode)
    }
}

impl MediaHost for HeadlessMedia {
    fn play(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state.refuse_play {
            return Err(VixenError::host("play() refused by policy"));
        }
        if state.ended {
            state.current_time = 0.0;
            state.ended = false;
        }
        if state.paused {
            state.paused = false;
            state.events.push_back(MediaEvent::Play);
        }
        if state.ready_state >= ReadyState::HaveFutureData {
            state.events.push_back(MediaEvent::Playing);
        } else {
            state.events.push_back(MediaEvent::Waiting);
        }
        Ok(())
    }

    fn pause(&mut self) {
        let mut state = self.state.borrow_mut();
        if !state.paused {
            state.paused = true;
            state.events.push_back(MediaEvent::Pause);
        }
    }

    fn load(&mut self) {
        let mut state = self.state.borrow_mut();
        state.load_count += 1;
        state.current_time = 0.0;
        state.duration = f64::NAN;
        state.paused = true;
        state.ended = false;
        state.ready_state = ReadyState::HaveNothing;
        state.network_state = NetworkState::Loading;
        state.buffered = TimeRanges::new();
        state
            .events
            .extend([MediaEvent::Emptied, MediaEvent::LoadStart]);
    }

    fn current_time(&self) -> f64 {
        self.state.borrow().current_time
    }

    fn set_current_time(&mut self, seconds: f64) {
        let mut state = self.state.borrow_mut();
        let upper = if state.duration.is_finite() {
            state.duration
        } else {
            f64::MAX
        };
        state.current_time = seconds.clamp(0.0, upper);
        state.ended = false;
        state.events.extend([
            MediaEvent::Seeking,
            MediaEvent::TimeUpdate,
            MediaEvent::Seeked,
        ]);
    }

    fn duration(&self) -> f64 {
        self.state.borrow().duration
    }

    fn paused(&self) -> bool {
        self.state.borrow().paused
    }

    fn ended(&self) -> bool {
        self.state.borrow().ended
    }

    fn seekable(&self) -> bool {
        let state = self.state.borrow();
        state.ready_state >= ReadyState::HaveMetadata && state.duration.is_finite()
    }

    fn network_state(&self) -> NetworkState {
        self.state.borrow().network_state
    }

    fn ready_state(&self) -> ReadyState {
        self.state.borrow().ready_state
    }

    fn volume(&self) -> f64 {
        self.state.borrow().volume
    }

    fn set_volume(&mut self, volume: f64) {
        let mut state = self.state.borrow_mut();
        state.volume = volume;
        state.events.push_back(MediaEvent::VolumeChange);
    }

    fn muted(&self) -> bool {
        self.state.borrow().muted
    }

    fn set_muted(&mut self, muted: bool) {
        let mut state = self.state.borrow_mut();
        state.muted = muted;
        state.events.push_back(MediaEvent::VolumeChange);
    }

    fn buffered(&self) -> TimeRanges {
        self.state.borrow().buffered.clone()
    }

    fn sources(&self) -> Vec<MediaSourceCandidate> {
        self.state.borrow().sources.clone()
    }

    fn can_play_type(&self, mime_type: &str) -> CanPlayType {
        let state = self.state.borrow();
        if state.playable_types.iter().any(|t| t == mime_type) {
            CanPlayType::Probably
        } else {
            CanPlayType::No
        }
    }

    fn current_src(&self) -> Option<String> {
        self.state.borrow().src.clone()
    }

    fn set_src(&mut self, locator: &str) {
        self.state.borrow_mut().src = Some(locator.to_string());
    }

    fn tracks(&self, kind: TrackKind) -> Vec<TrackInfo> {
        self.state
            .borrow()
            .tracks
            .get(&kind)
            .map(|tracks| tracks.iter().map(|t| t.info.clone()).collect())
            .unwrap_or_default()
    }

    fn set_track_mode(&mut self, kind: TrackKind, index: usize, mode: TrackMode) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let track = state
            .tracks
            .get_mut(&kind)
            .and_then(|tracks| tracks.get_mut(index))
            .ok_or_else(|| VixenError::invalid_input(format!("no {} track {}", kind, index)))?;
        track.info.mode = mode;
        if mode != TrackMode::Off && track.readiness == TrackReadiness::None {
            track.readiness = TrackReadiness::Loading;
        }
        Ok(())
    }

    fn track_readiness(&self, kind: TrackKind, index: usize) -> TrackReadiness {
        let mut state = self.state.borrow_mut();
        let Some(track) = state
            .tracks
            .get_mut(&kind)
            .and_then(|tracks| tracks.get_mut(index))
        else {
            return TrackReadiness::None;
        };

        if track.readiness != TrackReadiness::Loading {
            return track.readiness;
        }
        if track.drops_mode_once {
            track.drops_mode_once = false;
            track.info.mode = TrackMode::Off;
            track.readiness = TrackReadiness::None;
            return track.readiness;
        }
        match track.loads_after {
            Some(needed) if track.checks >= needed => {
                track.readiness = TrackReadiness::Loaded;
            }
            _ => track.checks += 1,
        }
        track.readiness
    }

    fn cues(&self, kind: TrackKind, index: usize) -> Vec<Cue> {
        self.state
            .borrow()
            .tracks
            .get(&kind)
            .and_then(|tracks| tracks.get(index))
            .filter(|track| track.readiness == TrackReadiness::Loaded)
            .map(|track| track.cues.clone())
            .unwrap_or_default()
    }
}
