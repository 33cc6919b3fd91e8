//! Reconciliation pass
//!
//! Derives every displayed value from the playback session and writes it
//! to the surface. Deriving and applying are split so the derived state can
//! be inspected; both are pure with respect to their inputs, which makes
//! running the pass twice with the same inputs indistinguishable from
//! running it once.

use crate::surface::{ControlSurface, Element};
use crate::types::PlaybackSession;
use serde::Serialize;
use vixen_core::{Dom, ElementHandle, NetworkState, TimeRanges};

/// Render seconds as `H:MM:SS`
///
/// The hours field is dropped when zero and the leading field is not
/// padded: `5` renders as `0:05`, `3725` as `1:02:05`. Negative and
/// non-finite input renders as `0:00`.
pub fn format_time(seconds: f64) -> String {
    let total = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// `position / duration` as a percentage in `[0, 100]`
///
/// Zero, negative, unknown or infinite durations give 0.
pub fn percent(position: f64, duration: f64) -> f64 {
    if !duration.is_finite() || duration <= 0.0 || !position.is_finite() {
        return 0.0;
    }
    (position / duration * 100.0).clamp(0.0, 100.0)
}

/// Scrubber length left after the other toolbar controls
///
/// `toolbar - sum(siblings) * slack`, never negative.
pub fn scrubber_length(toolbar: f64, siblings: impl IntoIterator<Item = f64>, slack: f64) -> f64 {
    let used: f64 = siblings.into_iter().filter(|e| e.is_finite()).sum();
    (toolbar - used * slack).max(0.0)
}

/// Every value the surface displays
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiState {
    pub elapsed: String,
    pub remaining: String,
    pub played_percent: f64,
    pub buffered_percent: f64,
    pub volume_percent: f64,
    pub scrubber_length: f64,
    pub seekable: bool,
    pub ended: bool,
    pub muted: bool,
    pub playing: bool,
    pub fullscreen: bool,
    pub errored: bool,
    pub network: NetworkState,
}

impl Default for UiState {
    fn default() -> Self {
        Self::derive(&PlaybackSession::default(), &TimeRanges::new(), false, false, 0.0)
    }
}

impl UiState {
    /// Compute the displayed values
    pub fn derive(
        session: &PlaybackSession,
        buffered: &TimeRanges,
        fullscreen: bool,
        errored: bool,
        scrubber_length: f64,
    ) -> Self {
        let remaining = if session.duration.is_finite() {
            (session.duration - session.current_time).max(0.0)
        } else {
            0.0
        };

        Self {
            elapsed: format_time(session.current_time),
            remaining: format_time(remaining),
            played_percent: percent(session.current_time, session.duration),
            buffered_percent: percent(buffered.max_end(), session.duration),
            volume_percent: (session.volume * 100.0).clamp(0.0, 100.0),
            scrubber_length,
            seekable: session.seekable,
            ended: session.ended,
            muted: session.muted,
            playing: session.is_playing(),
            fullscreen,
            errored,
            network: session.network_state,
        }
    }

    /// Write the state to the surface
    ///
    /// Fills of sliders being dragged are left alone.
    pub fn apply(&self, dom: &mut dyn Dom, surface: &ControlSurface) {
        let ns = surface.namespace();

        dom.set_text(surface.elapsed, &self.elapsed);
        dom.set_text(surface.remaining, &self.remaining);
        dom.set_text(
            surface.play_button,
            if self.playing { "Pause" } else { "Play" },
        );
        dom.set_text(surface.mute_button, if self.muted { "Unmute" } else { "Mute" });
        dom.set_text(
            surface.fullscreen_button,
            if self.fullscreen {
                "Exit fullscreen"
            } else {
                "Fullscreen"
            },
        );

        let scrubber = surface.scrubber_state;
        if !scrubber.dragging {
            set_fill(dom, surface.scrubber_playback, scrubber.vertical, self.played_percent);
        }
        set_fill(dom, surface.scrubber_buffer, scrubber.vertical, self.buffered_percent);
        if !surface.volume_state.dragging {
            set_fill(
                dom,
                surface.volume_fill,
                surface.volume_state.vertical,
                self.volume_percent,
            );
        }
        dom.set_style(
            surface.scrubber,
            axis_property(scrubber.vertical),
            &format!("{:.0}px", self.scrubber_length.floor()),
        );

        let mut container = Element::wrap(dom, ns, surface.container)
            .toggle_class("seekable", self.seekable)
            .toggle_class("ended", self.ended)
            .toggle_class("muted", self.muted)
            .toggle_class("playing", self.playing)
            .toggle_class("fullscreen", self.fullscreen)
            .toggle_class("errored", self.errored);
        for state in NetworkState::ALL {
            container = container.toggle_class(state.as_str(), state == self.network);
        }
        container.build();
    }
}

/// Style property along a slider's main axis
fn axis_property(vertical: bool) -> &'static str {
    if vertical {
        "height"
    } else {
        "width"
    }
}

/// Size a fill element to `percent` of its slider
pub fn set_fill(dom: &mut dyn Dom, fill: ElementHandle, vertical: bool, percent: f64) {
    dom.set_style(fill, axis_property(vertical), &format!("{:.2}%", percent));
}

/// Measure the scrubber's share of the toolbar
pub fn measure_scrubber(dom: &dyn Dom, surface: &ControlSurface, slack: f64) -> f64 {
    let vertical = surface.scrubber_state.vertical;
    let toolbar = dom.geometry(surface.toolbar).extent(vertical);
    scrubber_length(
        toolbar,
        surface
            .scrubber_siblings()
            .map(|sibling| dom.geometry(sibling).extent(vertical)),
        slack,
    )
}
