//! Media controller
//!
//! Owns the collaborators of one media resource and routes every signal
//! through the engine:
//!
//! ```text
//! media event ──> lifecycle ──> resume slot ──> reconcile ──> bus
//! ui event ─────> operation ──> host mutation ──> (media events)
//! pointer ──────> drag session ──> fill + pending seek ──> idle timer
//! timer ────────> chapter poll | seek flush
//! ```

use crate::capability::FullscreenApi;
use crate::drag::{DragSession, DragTarget};
use crate::error::{ControlError, Result};
use crate::events::{EventBus, HandlerResult, FATAL_ERROR, UPDATE_UI};
use crate::lifecycle::{Lifecycle, LifecycleState};
use crate::reconcile::{self, UiState};
use crate::sources::{self, SourceIndex};
use crate::surface::{ControlSurface, Element, SelectorAction, SelectorKind};
use crate::tracks::{ChapterPoller, PollOutcome, TrackGroup, SELECTABLE_KINDS};
use crate::types::{ControllerConfig, PlaybackSession};
use crate::volume::{self, VolumeLevel};
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::time::Duration;
use vixen_core::{
    Cue, Dom, ElementHandle, MediaEvent, MediaHost, MediaSourceCandidate, Platform,
    PointerButton, PreferenceStore, ResourceId, TimerId, TrackKind, UiEvent,
};

/// The media resource a controller is attached to
pub struct MediaResource {
    /// Registry key
    pub id: ResourceId,

    /// Element the surface replaces
    pub element: ElementHandle,

    /// Playback state and mutations
    pub host: Box<dyn MediaHost>,
}

/// Collaborators besides the media resource
pub struct Collaborators {
    pub dom: Box<dyn Dom>,
    pub platform: Box<dyn Platform>,

    /// Remembered volume; `None` disables persistence
    pub store: Option<Box<dyn PreferenceStore>>,
}

/// Controller of one media resource and its control surface
pub struct MediaController {
    id: ResourceId,
    host: Box<dyn MediaHost>,
    dom: Box<dyn Dom>,
    platform: Box<dyn Platform>,
    store: Option<Box<dyn PreferenceStore>>,
    config: ControllerConfig,
    bus: EventBus<MediaController>,

    surface: ControlSurface,
    fullscreen_api: FullscreenApi,
    fullscreen: bool,

    lifecycle: Lifecycle,
    session: PlaybackSession,
    sources: SourceIndex,
    groups: BTreeMap<TrackKind, TrackGroup>,
    chapter_poller: ChapterPoller,
    chapters: Vec<Cue>,
    fallback_links: Vec<ElementHandle>,

    drag: Option<DragSession>,
    pending_seek: Option<f64>,
    idle_scheduled: bool,
    ui_state: UiState,
}

impl MediaController {
    /// Build the surface around `resource` and bring it in sync
    pub fn new(
        resource: MediaResource,
        collaborators: Collaborators,
        config: ControllerConfig,
    ) -> Result<Self> {
        config.validate()?;
        let MediaResource { id, element, host } = resource;
        let Collaborators {
            mut dom,
            platform,
            store,
        } = collaborators;

        let surface = ControlSurface::build(dom.as_mut(), element, &config.namespace)?;
        let fullscreen_api = FullscreenApi::resolve(platform.as_ref(), surface.container);
        if !fullscreen_api.is_supported() {
            tracing::warn!(resource = %id, "fullscreen is not supported by this platform");
        }
        let sources = SourceIndex::build(host.as_ref());
        let lifecycle = Lifecycle::new(sources.declared().len());

        let mut controller = Self {
            id,
            host,
            dom,
            platform,
            store,
            config,
            bus: EventBus::new(),
            surface,
            fullscreen_api,
            fullscreen: false,
            lifecycle,
            session: PlaybackSession::default(),
            sources,
            groups: BTreeMap::new(),
            chapter_poller: ChapterPoller::default(),
            chapters: Vec::new(),
            fallback_links: Vec::new(),
            drag: None,
            pending_seek: None,
            idle_scheduled: false,
            ui_state: UiState::default(),
        };

        controller.build_resolution_selector()?;
        controller.discover_tracks()?;
        controller.restore_volume();
        controller.start_chapter_poll();
        controller.surface.refresh_orientation(controller.dom.as_ref());
        controller.update_ui();

        tracing::info!(resource = %id, sources = controller.sources.declared().len(), "controller attached");
        Ok(controller)
    }

    // ===== Accessors =====

    pub fn id(&self) -> ResourceId {
        self.id
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Values displayed after the last reconciliation
    pub fn ui_state(&self) -> &UiState {
        &self.ui_state
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn surface(&self) -> &ControlSurface {
        &self.surface
    }

    /// Merged chapter cues, sorted by start; empty until discovery completes
    pub fn chapters(&self) -> &[Cue] {
        &self.chapters
    }

    /// Playable resolution tiers, ascending
    pub fn resolutions(&self) -> Vec<u32> {
        self.sources.resolutions()
    }

    /// Download links rendered after every source failed
    pub fn fallback_links(&self) -> &[ElementHandle] {
        &self.fallback_links
    }

    /// Track group snapshot
    pub fn track_group(&self, kind: TrackKind) -> Option<&TrackGroup> {
        self.groups.get(&kind)
    }

    /// Whether the controller believes the surface is fullscreen
    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    // ===== Transport =====

    /// Start or resume playback
    pub fn play(&mut self) -> Result<()> {
        if self.refuse("play") {
            return Ok(());
        }
        self.host.play()?;
        self.update_ui();
        Ok(())
    }

    /// Pause playback
    pub fn pause(&mut self) -> Result<()> {
        if self.refuse("pause") {
            return Ok(());
        }
        self.host.pause();
        self.update_ui();
        Ok(())
    }

    /// Play when paused or ended, pause otherwise
    pub fn playpause(&mut self) -> Result<()> {
        if self.host.paused() || self.host.ended() {
            self.play()
        } else {
            self.pause()
        }
    }

    /// Seek to `seconds`, clamped to the resource
    pub fn jump_to(&mut self, seconds: f64) -> Result<()> {
        if !seconds.is_finite() {
            return Err(ControlError::InvalidTime(seconds));
        }
        if self.refuse("jump_to") {
            return Ok(());
        }
        let target = self.clamp_time(seconds);
        tracing::debug!(resource = %self.id, target, "seeking");
        self.host.set_current_time(target);
        self.update_ui();
        Ok(())
    }

    /// Skip ahead by `clamp(duration * 0.05, 5, 30)` seconds
    pub fn skip_forward(&mut self) -> Result<()> {
        let amount = self.config.skip_amount(self.host.duration());
        self.jump_to(self.host.current_time() + amount)
    }

    /// Skip back by the same amount as [`Self::skip_forward`]
    pub fn skip_backward(&mut self) -> Result<()> {
        let amount = self.config.skip_amount(self.host.duration());
        self.jump_to(self.host.current_time() - amount)
    }

    /// Seek to the start of chapter `index`
    pub fn jump_to_chapter(&mut self, index: usize) -> Result<()> {
        let start = self
            .chapters
            .get(index)
            .map(|cue| cue.start)
            .ok_or(ControlError::UnknownChapter(index))?;
        self.jump_to(start)?;
        if let Some(selector) = self.surface.selector_mut(SelectorKind::Chapters) {
            selector.show_action(self.dom.as_mut(), SelectorAction::Chapter(index));
        }
        Ok(())
    }

    // ===== Volume =====

    /// Current volume
    pub fn volume(&self) -> f64 {
        self.host.volume()
    }

    /// Set the volume; anything outside `[0, 1]` fails with `InvalidVolume`
    pub fn set_volume(&mut self, level: f64) -> Result<()> {
        self.set_volume_level(VolumeLevel::new(level)?);
        Ok(())
    }

    /// Set an already validated volume and remember it
    pub fn set_volume_level(&mut self, level: VolumeLevel) {
        self.host.set_volume(level.get());
        if self.config.remember_volume {
            if let Some(store) = self.store.as_deref_mut() {
                volume::persist(store, &self.config.volume_key, level);
            }
        }
        self.update_ui();
    }

    /// Flip the muted flag
    pub fn toggle_mute(&mut self) {
        let muted = !self.host.muted();
        self.host.set_muted(muted);
        self.update_ui();
    }

    // ===== Fullscreen =====

    /// Enter or leave fullscreen
    pub fn toggle_fullscreen(&mut self) -> Result<()> {
        if !self.fullscreen_api.is_supported() {
            tracing::warn!(resource = %self.id, "fullscreen requested but not supported");
            return Err(ControlError::Unsupported("fullscreen"));
        }
        let current = self
            .fullscreen_api
            .query(self.platform.as_ref())
            .unwrap_or(self.fullscreen);

        if current {
            self.fullscreen_api.exit(self.platform.as_mut())?;
        } else {
            self.fullscreen_api
                .enter(self.platform.as_mut(), self.surface.container)?;
        }
        self.fullscreen = !current;
        tracing::info!(resource = %self.id, fullscreen = self.fullscreen, "fullscreen toggled");
        self.surface.refresh_orientation(self.dom.as_ref());
        self.update_ui();
        Ok(())
    }

    // ===== Sources and tracks =====

    /// Switch to another resolution, resuming at the current position
    pub fn select_resolution(&mut self, tier: u32) -> Result<()> {
        if self.refuse("select_resolution") {
            return Ok(());
        }
        sources::switch_resolution(self.host.as_mut(), &mut self.session, &self.sources, tier)?;
        if let Some(selector) = self.surface.selector_mut(SelectorKind::Resolution) {
            selector.show_action(self.dom.as_mut(), SelectorAction::Resolution(tier));
        }
        self.update_ui();
        Ok(())
    }

    /// Show track `index` of a group exclusively, or none with `None`
    pub fn select_track(&mut self, kind: TrackKind, index: Option<usize>) -> Result<()> {
        let group = self
            .groups
            .get_mut(&kind)
            .ok_or(ControlError::UnknownTrack {
                kind,
                index: index.unwrap_or(0),
            })?;
        group.select(self.host.as_mut(), index)?;

        let selector = SelectorKind::for_track(kind).and_then(|k| self.surface.selector_mut(k));
        if let Some(selector) = selector {
            selector.show_action(self.dom.as_mut(), SelectorAction::Track(kind, index));
        }
        self.update_ui();
        Ok(())
    }

    /// Restart the resource; opens a new session
    ///
    /// Clears the failure tally, the errored state and any pending resume.
    /// The declared sources are indexed once at construction and stay fixed
    /// for the resource's lifetime, so the resolution selector and the
    /// fallback links keep matching them.
    pub fn load(&mut self) {
        tracing::info!(resource = %self.id, "reloading resource");
        self.lifecycle.reset(self.sources.declared().len());
        self.session.pending_resume = None;
        self.pending_seek = None;
        self.host.load();
        self.update_ui();
    }

    // ===== Events =====

    /// Subscribe to a lifecycle name, `updateui` or `fatalerror`
    pub fn on<F>(&mut self, name: &str, handler: F) -> Result<()>
    where
        F: FnMut(&MediaController, &[Value]) -> HandlerResult + 'static,
    {
        self.bus.subscribe(name, handler)
    }

    /// Route a lifecycle event from the media resource
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        if let Some(transition) = self.lifecycle.on_event(event) {
            if transition.is_fatal() {
                self.enter_errored();
            }
        }

        if !self.lifecycle.is_errored() {
            match sources::resume_if_loaded(self.host.as_mut(), &mut self.session, event) {
                Ok(Some(slot)) => {
                    tracing::info!(resource = %self.id, position = slot.position, "resumed after resolution switch");
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(resource = %self.id, error = %e, "could not resume after resolution switch");
                }
            }
        }

        if event == MediaEvent::Resize {
            self.surface.refresh_orientation(self.dom.as_ref());
        }

        self.update_ui();

        let args = match event {
            MediaEvent::SourceError { index } => vec![json!(index)],
            _ => Vec::new(),
        };
        self.publish(event.name(), &args);
    }

    /// Route a signal from one of the surface's elements
    pub fn handle_ui_event(&mut self, handle: ElementHandle, event: UiEvent) -> Result<()> {
        let surface = &self.surface;
        match event {
            UiEvent::Click if handle == surface.play_button => self.playpause(),
            UiEvent::Click if handle == surface.mute_button => {
                self.toggle_mute();
                Ok(())
            }
            UiEvent::Click if handle == surface.fullscreen_button => self.toggle_fullscreen(),
            UiEvent::PointerDown { button, x, y } if handle == surface.scrubber => {
                self.begin_drag(DragTarget::Scrubber, button, x, y);
                Ok(())
            }
            UiEvent::PointerDown { button, x, y } if handle == surface.volume => {
                self.begin_drag(DragTarget::Volume, button, x, y);
                Ok(())
            }
            UiEvent::Change { index } => {
                let Some(kind) = surface.selector_for(handle) else {
                    return Ok(());
                };
                let action = self
                    .surface
                    .selector_mut(kind)
                    .and_then(|selector| selector.choose(self.dom.as_mut(), index));
                match action {
                    Some(action) => self.run_selector_action(action),
                    None => Ok(()),
                }
            }
            UiEvent::Focus | UiEvent::Blur => {
                let focused = event == UiEvent::Focus;
                if let Some(selector) = surface.selector_for(handle).and_then(|k| surface.selector(k)) {
                    selector.set_focus(self.dom.as_mut(), surface.namespace(), focused);
                }
                Ok(())
            }
            _ => {
                tracing::debug!(?handle, ?event, "ui event without a target");
                Ok(())
            }
        }
    }

    /// Pointer moved while a drag may be active
    pub fn handle_pointer_move(&mut self, x: f64, y: f64) {
        if let Some(drag) = self.drag {
            self.apply_drag(drag, drag.value(x, y));
        }
    }

    /// Pointer released; ends the active drag
    pub fn handle_pointer_up(&mut self) {
        if self.end_drag() {
            self.update_ui();
        }
    }

    /// A timer scheduled through the platform fired
    pub fn on_timer(&mut self, timer: TimerId) {
        match timer {
            TimerId::Idle => {
                self.idle_scheduled = false;
                self.flush_seek();
            }
            TimerId::ChapterPoll => self.poll_chapters(),
        }
    }

    // ===== Reconciliation =====

    /// Recompute and display every derived value, then publish `updateui`
    pub fn update_ui(&mut self) {
        self.session.refresh(self.host.as_ref());

        if let Some(actual) = self.fullscreen_api.query(self.platform.as_ref()) {
            if actual != self.fullscreen {
                tracing::debug!(resource = %self.id, actual, "fullscreen drifted, trusting platform");
                self.fullscreen = actual;
                self.surface.refresh_orientation(self.dom.as_ref());
            }
        }

        let length = reconcile::measure_scrubber(
            self.dom.as_ref(),
            &self.surface,
            self.config.layout_slack,
        );
        let state = UiState::derive(
            &self.session,
            &self.host.buffered(),
            self.fullscreen,
            self.lifecycle.is_errored(),
            length,
        );
        state.apply(self.dom.as_mut(), &self.surface);
        self.ui_state = state;

        tracing::debug!(
            resource = %self.id,
            elapsed = %self.ui_state.elapsed,
            played = self.ui_state.played_percent,
            "reconciled"
        );
        self.publish(UPDATE_UI, &[]);
    }

    // ===== Internals =====

    fn publish(&mut self, name: &str, args: &[Value]) {
        let mut bus = std::mem::take(&mut self.bus);
        bus.publish(self, name, args);
        self.bus = bus;
    }

    /// Whether a transport operation must be refused
    fn refuse(&self, operation: &str) -> bool {
        if self.lifecycle.is_errored() {
            tracing::warn!(resource = %self.id, operation, "refused: every source failed");
            return true;
        }
        false
    }

    fn clamp_time(&self, seconds: f64) -> f64 {
        let duration = self.host.duration();
        if duration.is_finite() {
            seconds.clamp(0.0, duration.max(0.0))
        } else {
            seconds.max(0.0)
        }
    }

    fn run_selector_action(&mut self, action: SelectorAction) -> Result<()> {
        match action {
            SelectorAction::Resolution(tier) => self.select_resolution(tier),
            SelectorAction::Track(kind, index) => self.select_track(kind, index),
            SelectorAction::Chapter(index) => self.jump_to_chapter(index),
        }
    }

    /// Flush and clear the active drag; false when none was active
    fn end_drag(&mut self) -> bool {
        let Some(drag) = self.drag.take() else {
            return false;
        };
        self.flush_seek();
        self.surface
            .set_dragging(self.dom.as_mut(), drag.target() == DragTarget::Scrubber, false);
        tracing::debug!(resource = %self.id, target = ?drag.target(), "drag ended");
        true
    }

    fn begin_drag(&mut self, target: DragTarget, button: PointerButton, x: f64, y: f64) {
        // a release outside the surface never reached us
        if self.end_drag() {
            self.update_ui();
        }
        if target == DragTarget::Scrubber && self.refuse("scrub") {
            return;
        }
        let (handle, vertical) = match target {
            DragTarget::Scrubber => (self.surface.scrubber, self.surface.scrubber_state.vertical),
            DragTarget::Volume => (self.surface.volume, self.surface.volume_state.vertical),
        };
        let Some(drag) = DragSession::begin(self.dom.as_ref(), handle, target, button, vertical)
        else {
            return;
        };

        self.surface
            .set_dragging(self.dom.as_mut(), target == DragTarget::Scrubber, true);
        self.drag = Some(drag);
        tracing::debug!(resource = %self.id, ?target, "drag started");
        self.apply_drag(drag, drag.value(x, y));
    }

    fn apply_drag(&mut self, drag: DragSession, value: f64) {
        match drag.target() {
            DragTarget::Scrubber => {
                reconcile::set_fill(
                    self.dom.as_mut(),
                    self.surface.scrubber_playback,
                    self.surface.scrubber_state.vertical,
                    value * 100.0,
                );
                let duration = self.host.duration();
                if duration.is_finite() && duration > 0.0 {
                    let target = value * duration;
                    self.dom
                        .set_text(self.surface.elapsed, &reconcile::format_time(target));
                    self.pending_seek = Some(target);
                    if !self.idle_scheduled {
                        self.platform.schedule(Duration::ZERO, TimerId::Idle);
                        self.idle_scheduled = true;
                    }
                }
            }
            DragTarget::Volume => {
                reconcile::set_fill(
                    self.dom.as_mut(),
                    self.surface.volume_fill,
                    self.surface.volume_state.vertical,
                    value * 100.0,
                );
                if let Ok(level) = VolumeLevel::new(value) {
                    self.set_volume_level(level);
                }
            }
        }
    }

    fn flush_seek(&mut self) {
        if let Some(target) = self.pending_seek.take() {
            if let Err(e) = self.jump_to(target) {
                tracing::warn!(resource = %self.id, error = %e, "dropped scrub seek");
            }
        }
    }

    fn enter_errored(&mut self) {
        let candidates = self.sources.declared().to_vec();
        tracing::error!(resource = %self.id, candidates = candidates.len(), "every source failed to load");

        if self.fallback_links.is_empty() {
            match self.render_fallback(&candidates) {
                Ok(links) => self.fallback_links = links,
                Err(e) => tracing::warn!(resource = %self.id, error = %e, "could not render fallback links"),
            }
        }
        self.session.pending_resume = None;
        self.pending_seek = None;

        self.update_ui();
        let locators: Vec<Value> = candidates.iter().map(|c| json!(c.locator)).collect();
        self.publish(FATAL_ERROR, &[Value::Array(locators)]);
    }

    fn render_fallback(&mut self, candidates: &[MediaSourceCandidate]) -> Result<Vec<ElementHandle>> {
        let list = self.surface.fallback_list(self.dom.as_mut())?;
        let ns = self.surface.namespace();
        let mut links = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let text = match candidate.resolution {
                Some(tier) => format!("Download {} ({}p)", candidate.mime_type, tier),
                None => format!("Download {}", candidate.mime_type),
            };
            let link = Element::create(self.dom.as_mut(), ns, "a")
                .class("fallbacklink")
                .attr("href", &candidate.locator)
                .attr("download", "")
                .text(&text)
                .build();
            self.dom.append(list, link);
            links.push(link);
        }
        Ok(links)
    }

    fn build_resolution_selector(&mut self) -> Result<()> {
        let tiers = self.sources.resolutions();
        if tiers.len() < 2 {
            return Ok(());
        }
        let active = self
            .sources
            .active_tier(self.host.current_src().as_deref());
        let selector = self
            .surface
            .add_selector(self.dom.as_mut(), SelectorKind::Resolution)?;
        for &tier in tiers.iter().rev() {
            selector.add_item(
                self.dom.as_mut(),
                &format!("{}p", tier),
                SelectorAction::Resolution(tier),
            );
        }
        if let Some(tier) = active {
            selector.show_action(self.dom.as_mut(), SelectorAction::Resolution(tier));
        }
        Ok(())
    }

    fn discover_tracks(&mut self) -> Result<()> {
        for kind in SELECTABLE_KINDS {
            let group = TrackGroup::discover(self.host.as_ref(), kind);
            if group.is_empty() {
                continue;
            }
            let Some(selector_kind) = SelectorKind::for_track(kind) else {
                continue;
            };
            let selector = self.surface.add_selector(self.dom.as_mut(), selector_kind)?;
            if kind == TrackKind::Captions {
                selector.add_item(self.dom.as_mut(), "Off", SelectorAction::Track(kind, None));
            }
            for (index, track) in group.tracks().iter().enumerate() {
                selector.add_item(
                    self.dom.as_mut(),
                    track.display_label(),
                    SelectorAction::Track(kind, Some(index)),
                );
            }
            if let Some(showing) = group.showing() {
                selector.show_action(self.dom.as_mut(), SelectorAction::Track(kind, Some(showing)));
            }
            tracing::debug!(%kind, tracks = group.tracks().len(), "track group discovered");
            self.groups.insert(kind, group);
        }
        Ok(())
    }

    fn restore_volume(&mut self) {
        if !self.config.remember_volume {
            return;
        }
        let Some(store) = self.store.as_deref() else {
            return;
        };
        if let Some(level) = volume::restore(store, &self.config.volume_key) {
            tracing::debug!(resource = %self.id, volume = level.get(), "restored remembered volume");
            self.host.set_volume(level.get());
        }
    }

    fn start_chapter_poll(&mut self) {
        self.chapter_poller =
            ChapterPoller::start(self.host.as_mut(), self.config.chapter_poll_max_attempts);
        if self.chapter_poller.is_pending() {
            self.platform
                .schedule(self.config.chapter_poll_interval(), TimerId::ChapterPoll);
        }
    }

    fn poll_chapters(&mut self) {
        match self.chapter_poller.poll(self.host.as_mut()) {
            PollOutcome::Pending => {
                self.platform
                    .schedule(self.config.chapter_poll_interval(), TimerId::ChapterPoll);
            }
            PollOutcome::Complete(chapters) => {
                tracing::debug!(resource = %self.id, chapters = chapters.len(), "chapter discovery finished");
                self.chapters = chapters;
                if let Err(e) = self.build_chapter_selector() {
                    tracing::warn!(resource = %self.id, error = %e, "could not build chapter selector");
                }
                self.update_ui();
            }
            PollOutcome::Idle => {}
        }
    }

    fn build_chapter_selector(&mut self) -> Result<()> {
        if self.chapters.is_empty() || self.surface.selector(SelectorKind::Chapters).is_some() {
            return Ok(());
        }
        let selector = self
            .surface
            .add_selector(self.dom.as_mut(), SelectorKind::Chapters)?;
        for (index, cue) in self.chapters.iter().enumerate() {
            let text = format!("{} {}", reconcile::format_time(cue.start), cue.text);
            selector.add_item(self.dom.as_mut(), &text, SelectorAction::Chapter(index));
        }
        Ok(())
    }
}

impl std::fmt::Debug for MediaController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MediaController")
            .field("id", &self.id)
            .field("lifecycle", &self.lifecycle.state())
            .field("session", &self.session)
            .field("fullscreen", &self.fullscreen)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}
