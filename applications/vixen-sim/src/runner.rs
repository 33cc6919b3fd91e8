//! Scenario runner
//!
//! Drives one controller against the headless collaborators on a virtual
//! clock. After every step the runner forwards queued media events to the
//! controller and fires the timers that came due, until the resource is
//! quiet.

use crate::config::{LayoutSettings, SimConfig};
use crate::error::Result;
use crate::scenario::{time_ranges, Scenario, Step};
use serde::Serialize;
use std::time::Duration;
use vixen_controls::{Collaborators, ControlError, MediaController, MediaResource, UiState};
use vixen_core::headless::{HeadlessDom, HeadlessMedia, HeadlessPlatform, MemoryStore};
use vixen_core::{
    Cue, ElementHandle, Geometry, PointerButton, PreferenceStore, ResourceId, TimerId, UiEvent,
};

/// Upper bound on event/timer rounds per settle, against runaway loops
const MAX_SETTLE_ROUNDS: usize = 10_000;

/// What one step did
#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub index: usize,
    pub action: &'static str,
    pub clock_ms: u64,
    pub lifecycle: &'static str,
    pub elapsed: String,
    pub remaining: String,
    pub playing: bool,
    pub volume: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dump: Option<String>,
}

/// Result of a whole scenario
#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub scenario: String,
    pub steps: Vec<StepOutcome>,
    pub ui: UiState,
    pub chapters: Vec<Cue>,
    pub resolutions: Vec<u32>,
    pub fallback_links: usize,
}

impl Report {
    /// Steps that failed
    pub fn failures(&self) -> impl Iterator<Item = &StepOutcome> {
        self.steps.iter().filter(|step| step.error.is_some())
    }
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    due: Duration,
    timer: TimerId,
}

/// One controller plus the handles the runner drives it through
pub struct Simulator {
    controller: MediaController,
    media: HeadlessMedia,
    dom: HeadlessDom,
    platform: HeadlessPlatform,
    body: ElementHandle,
    layout: LayoutSettings,
    clock: Duration,
    timers: Vec<PendingTimer>,
}

impl Simulator {
    /// Build the resource of `scenario` and attach a controller to it
    pub fn new(scenario: &Scenario, config: &SimConfig) -> Result<Self> {
        let media = scenario.build_media();
        let (dom, body, element) = HeadlessDom::with_media_element(&scenario.media.kind);
        let platform = HeadlessPlatform::new(config.platform.fullscreen);

        let store: Option<Box<dyn PreferenceStore>> = if config.platform.persistence {
            let mut store = MemoryStore::new();
            if let Some(volume) = config.platform.remembered_volume {
                store.set(&config.controller.volume_key, &volume.to_string());
            }
            Some(Box::new(store))
        } else {
            None
        };

        let controller = MediaController::new(
            MediaResource {
                id: ResourceId(1),
                element,
                host: Box::new(media.clone()),
            },
            Collaborators {
                dom: Box::new(dom.clone()),
                platform: Box::new(platform.clone()),
                store,
            },
            config.controller.clone(),
        )?;

        let mut simulator = Self {
            controller,
            media,
            dom,
            platform,
            body,
            layout: config.layout.clone(),
            clock: Duration::ZERO,
            timers: Vec::new(),
        };
        simulator.apply_layout();
        simulator.settle();
        tracing::info!(scenario = %scenario.name, "simulator ready");
        Ok(simulator)
    }

    pub fn controller(&self) -> &MediaController {
        &self.controller
    }

    /// Virtual time elapsed since the controller was attached
    pub fn clock(&self) -> Duration {
        self.clock
    }

    /// Rendered element tree
    pub fn dump(&self) -> String {
        self.dom.dump(self.body)
    }

    /// Run every step of `scenario`
    pub fn run(&mut self, scenario: &Scenario) -> Report {
        let steps = scenario
            .steps
            .iter()
            .enumerate()
            .map(|(index, step)| self.step(index, step))
            .collect();

        Report {
            scenario: scenario.name.clone(),
            steps,
            ui: self.controller.ui_state().clone(),
            chapters: self.controller.chapters().to_vec(),
            resolutions: self.controller.resolutions(),
            fallback_links: self.controller.fallback_links().len(),
        }
    }

    /// Run one step and settle
    pub fn step(&mut self, index: usize, step: &Step) -> StepOutcome {
        tracing::debug!(index, action = step.name(), "running step");
        let result = self.perform(step);
        if let Err(e) = &result {
            tracing::warn!(index, action = step.name(), error = %e, "step failed");
        }
        self.apply_layout();
        self.settle();

        let ui = self.controller.ui_state();
        StepOutcome {
            index,
            action: step.name(),
            clock_ms: self.clock.as_millis() as u64,
            lifecycle: self.controller.lifecycle().as_str(),
            elapsed: ui.elapsed.clone(),
            remaining: ui.remaining.clone(),
            playing: ui.playing,
            volume: self.controller.volume(),
            error: result.err().map(|e| e.to_string()),
            dump: matches!(step, Step::Dump).then(|| self.dump()),
        }
    }

    fn perform(&mut self, step: &Step) -> std::result::Result<(), ControlError> {
        match step {
            Step::FinishLoading { duration } => self.media.finish_loading(*duration),
            Step::Play => self.controller.play()?,
            Step::Pause => self.controller.pause()?,
            Step::PlayPause => self.controller.playpause()?,
            Step::Advance { seconds } => self.advance(*seconds),
            Step::Wait { ms } => self.wait(Duration::from_millis(*ms)),
            Step::Seek { seconds } => self.controller.jump_to(*seconds)?,
            Step::SkipForward => self.controller.skip_forward()?,
            Step::SkipBackward => self.controller.skip_backward()?,
            Step::Volume { level } => self.controller.set_volume(*level)?,
            Step::Mute => self.controller.toggle_mute(),
            Step::ExternalMute { muted } => self.media.external_mute(*muted),
            Step::Fullscreen => self.controller.toggle_fullscreen()?,
            Step::ForceFullscreen { fullscreen } => {
                self.platform.force_fullscreen(*fullscreen);
                self.controller.update_ui();
            }
            Step::Resolution { tier } => self.controller.select_resolution(*tier)?,
            Step::Track { kind, index } => self.controller.select_track(*kind, *index)?,
            Step::Chapter { index } => self.controller.jump_to_chapter(*index)?,
            Step::FailSource { index } => self.media.fail_source(*index),
            Step::Buffered { ranges } => self.media.set_buffered(time_ranges(ranges)),
            Step::Scrub { from, to } => {
                let scrubber = self.controller.surface().scrubber;
                self.drag(scrubber, *from, &[*to])?;
            }
            Step::DragVolume { to } => {
                let volume = self.controller.surface().volume;
                self.drag(volume, *to, &[])?;
            }
            Step::Click { control } => {
                let handle = self
                    .controller
                    .surface()
                    .registry()
                    .get(control)
                    .ok_or(ControlError::Unsupported("clicking an unregistered control"))?;
                self.controller.handle_ui_event(handle, UiEvent::Click)?;
            }
            Step::Reload => self.controller.load(),
            Step::Dump => {}
        }
        Ok(())
    }

    /// Press at `from`, move through `path`, release
    fn drag(
        &mut self,
        handle: ElementHandle,
        from: f64,
        path: &[f64],
    ) -> std::result::Result<(), ControlError> {
        let geometry = self.screen_geometry(handle);
        let at = |fraction: f64| {
            (
                geometry.left + fraction * geometry.width,
                geometry.top + geometry.height / 2.0,
            )
        };

        let (x, y) = at(from);
        self.controller.handle_ui_event(
            handle,
            UiEvent::PointerDown {
                button: PointerButton::Primary,
                x,
                y,
            },
        )?;
        for &fraction in path {
            let (x, y) = at(fraction);
            self.controller.handle_pointer_move(x, y);
            self.settle();
        }
        self.controller.handle_pointer_up();
        Ok(())
    }

    /// Geometry of `handle` with its offset chain resolved
    fn screen_geometry(&self, handle: ElementHandle) -> Geometry {
        let own = vixen_core::Dom::geometry(&self.dom, handle);
        let (left, top) = vixen_controls::drag::screen_origin(&self.dom, handle);
        Geometry::new(left, top, own.width, own.height)
    }

    /// Let playback run for `seconds`, firing timers as they come due
    fn advance(&mut self, seconds: f64) {
        let target = self.clock + Duration::from_secs_f64(seconds);
        let mut played = 0.0;
        while let Some(next) = self.next_due(target) {
            let slice = (next.due - self.clock).as_secs_f64();
            self.media.advance(slice);
            played += slice;
            self.clock = next.due;
            self.settle();
        }
        self.media.advance((seconds - played).max(0.0));
        self.clock = target;
    }

    /// Let virtual time pass without playing
    fn wait(&mut self, by: Duration) {
        let target = self.clock + by;
        while let Some(next) = self.next_due(target) {
            self.clock = next.due;
            self.settle();
        }
        self.clock = target;
    }

    /// Earliest pending timer due at or before `limit`
    fn next_due(&mut self, limit: Duration) -> Option<PendingTimer> {
        self.collect_timers();
        self.timers
            .iter()
            .filter(|timer| timer.due <= limit)
            .min_by_key(|timer| timer.due)
            .copied()
    }

    fn collect_timers(&mut self) {
        let now = self.clock;
        self.timers.extend(
            self.platform
                .take_scheduled()
                .into_iter()
                .map(|scheduled| PendingTimer {
                    due: now + scheduled.delay,
                    timer: scheduled.timer,
                }),
        );
    }

    /// Deliver queued events and fire due timers until nothing is left
    fn settle(&mut self) {
        for _ in 0..MAX_SETTLE_ROUNDS {
            let events = self.media.take_events();
            for event in &events {
                self.controller.handle_media_event(*event);
            }

            self.collect_timers();
            let now = self.clock;
            let (due, later): (Vec<_>, Vec<_>) =
                self.timers.drain(..).partition(|timer| timer.due <= now);
            self.timers = later;
            for timer in &due {
                self.controller.on_timer(timer.timer);
            }

            if events.is_empty() && due.is_empty() {
                return;
            }
        }
        tracing::warn!(rounds = MAX_SETTLE_ROUNDS, "resource did not settle");
    }

    /// Lay the toolbar out left to right so the scrubber can be measured
    fn apply_layout(&mut self) {
        let surface = self.controller.surface();
        let toolbar = surface.toolbar;
        let scrubber = surface.scrubber;
        let height = self.layout.control_height;

        self.dom.set_geometry(
            toolbar,
            Geometry::new(0.0, 0.0, self.layout.toolbar_width, height),
        );
        self.dom.set_offset_parent(toolbar, None);

        let widths: Vec<(ElementHandle, f64)> = self
            .dom
            .children(toolbar)
            .into_iter()
            .map(|child| {
                let place = surface.registry().place_of(child).unwrap_or_default();
                (child, self.layout.width_of(place))
            })
            .collect();

        // siblings first, so the reconciliation pass can size the scrubber
        for &(child, width) in &widths {
            if child != scrubber {
                self.dom
                    .set_geometry(child, Geometry::new(0.0, 0.0, width, height));
            }
        }
        self.controller.update_ui();
        let scrubber_width = self.controller.ui_state().scrubber_length.floor();

        let mut left = 0.0;
        for (child, width) in widths {
            let width = if child == scrubber { scrubber_width } else { width };
            self.dom
                .set_geometry(child, Geometry::new(left, 0.0, width, height));
            self.dom.set_offset_parent(child, Some(toolbar));
            left += width;
        }
    }
}

impl LayoutSettings {
    /// Width of the control registered under `place`
    pub fn width_of(&self, place: &str) -> f64 {
        match place {
            "volume" => self.volume_width,
            "elapsed" | "remaining" => self.label_width,
            p if p.ends_with("selector") => self.label_width * 2.0,
            _ => self.button_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vixen_controls::LifecycleState;

    fn run(text: &str) -> (Simulator, Report) {
        let scenario = Scenario::parse(text).unwrap();
        let mut simulator = Simulator::new(&scenario, &SimConfig::default()).unwrap();
        let report = simulator.run(&scenario);
        (simulator, report)
    }

    #[test]
    fn test_layout_sizes_scrubber() {
        let (simulator, _) = run("");
        // 800 - 1.1 * (40 + 60 + 60 + 40 + 80 + 40)
        let length = simulator.controller().ui_state().scrubber_length;
        assert!((length - 448.0).abs() < 1e-9);
        let scrubber = simulator.controller().surface().scrubber;
        assert_eq!(
            simulator.dom.style(scrubber, "width"),
            Some(format!("{:.0}px", length.floor()))
        );
    }

    #[test]
    fn test_advance_plays_through() {
        let (simulator, report) = run(
            "[[steps]]\naction = \"finish_loading\"\nduration = 20.0\n\n\
             [[steps]]\naction = \"play\"\n\n\
             [[steps]]\naction = \"advance\"\nseconds = 7.0\n",
        );
        assert_eq!(report.steps[2].elapsed, "0:07");
        assert_eq!(report.steps[2].clock_ms, 7000);
        assert!(report.steps[2].playing);
        assert_eq!(simulator.clock(), Duration::from_secs(7));
        assert_eq!(report.failures().count(), 0);
    }

    #[test]
    fn test_scrub_seeks() {
        let (simulator, report) = run(
            "[[steps]]\naction = \"finish_loading\"\nduration = 100.0\n\n\
             [[steps]]\naction = \"scrub\"\nfrom = 0.1\nto = 0.25\n",
        );
        assert_eq!(report.steps[1].elapsed, "0:25");
        assert_eq!(simulator.controller().session().current_time, 25.0);
        assert!(!simulator.controller().surface().scrubber_state.dragging);
    }

    #[test]
    fn test_failed_steps_are_reported() {
        let (_, report) = run(
            "[[steps]]\naction = \"volume\"\nlevel = 1.5\n\n\
             [[steps]]\naction = \"click\"\ncontrol = \"nosuchbutton\"\n",
        );
        assert_eq!(report.failures().count(), 2);
        assert!(report.steps[0]
            .error
            .as_deref()
            .unwrap()
            .contains("1.5"));
    }

    #[test]
    fn test_chapters_load_on_the_virtual_clock() {
        let (simulator, report) = run(
            "[[tracks]]\nkind = \"chapters\"\nloads_after = 3\ncues = [{ start = 4.0, end = 8.0, text = \"Two\" }, { start = 0.0, end = 4.0, text = \"One\" }]\n\n\
             [[steps]]\naction = \"wait\"\nms = 1000\n",
        );
        let titles: Vec<&str> = report.chapters.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(titles, ["One", "Two"]);
        assert_eq!(simulator.controller().lifecycle(), LifecycleState::Uninitialized);
    }

    #[test]
    fn test_click_registered_control() {
        let (_, report) = run(
            "[[steps]]\naction = \"finish_loading\"\nduration = 10.0\n\n\
             [[steps]]\naction = \"click\"\ncontrol = \"playbutton\"\n",
        );
        assert!(report.steps[1].playing);
        assert_eq!(report.steps[1].lifecycle, "playing");
    }
}
