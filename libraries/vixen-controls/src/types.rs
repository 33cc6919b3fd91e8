//! Configuration and session types for the control engine

use crate::error::{ControlError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use vixen_core::{MediaHost, NetworkState, ReadyState};

/// Controller configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    /// Prefix of every class and id the surface creates (default: "vixen")
    pub namespace: String,

    /// Share of the duration a skip moves (default: 0.05)
    pub skip_fraction: f64,

    /// Smallest skip in seconds (default: 5)
    pub skip_min_secs: f64,

    /// Largest skip in seconds (default: 30)
    pub skip_max_secs: f64,

    /// Multiplier applied to sibling extents when sizing the scrubber (default: 1.1)
    pub layout_slack: f64,

    /// Delay between chapter-track readiness checks (default: 50)
    pub chapter_poll_interval_ms: u64,

    /// Readiness checks before a chapter track is given up (default: 200)
    pub chapter_poll_max_attempts: u32,

    /// Restore and persist the volume through the preference store (default: true)
    pub remember_volume: bool,

    /// Preference key of the remembered volume (default: "vixen-volume")
    pub volume_key: String,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            namespace: "vixen".to_string(),
            skip_fraction: 0.05,
            skip_min_secs: 5.0,
            skip_max_secs: 30.0,
            layout_slack: 1.1,
            chapter_poll_interval_ms: 50,
            chapter_poll_max_attempts: 200,
            remember_volume: true,
            volume_key: "vixen-volume".to_string(),
        }
    }
}

impl ControllerConfig {
    /// Reject settings the engine cannot work with
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason: String| -> Result<()> { Err(ControlError::InvalidConfig(reason)) };
        if self.namespace.is_empty() {
            return invalid("namespace must not be empty".to_string());
        }
        if !self.skip_fraction.is_finite() || self.skip_fraction < 0.0 {
            return invalid(format!(
                "skip_fraction must be a non-negative number, got {}",
                self.skip_fraction
            ));
        }
        if !self.skip_min_secs.is_finite() || !self.skip_max_secs.is_finite() {
            return invalid(format!(
                "skip bounds must be finite: {} and {}",
                self.skip_min_secs, self.skip_max_secs
            ));
        }
        if self.skip_min_secs < 0.0 || self.skip_min_secs > self.skip_max_secs {
            return invalid(format!(
                "skip bounds are inverted: {} > {}",
                self.skip_min_secs, self.skip_max_secs
            ));
        }
        if !(self.layout_slack.is_finite() && self.layout_slack > 0.0) {
            return invalid(format!("layout_slack must be positive, got {}", self.layout_slack));
        }
        if self.chapter_poll_max_attempts == 0 {
            return invalid("chapter_poll_max_attempts must be at least 1".to_string());
        }
        Ok(())
    }

    /// Seconds moved by one skip for a resource of `duration` seconds
    ///
    /// An unknown or infinite duration skips by the minimum.
    pub fn skip_amount(&self, duration: f64) -> f64 {
        if !duration.is_finite() || duration <= 0.0 {
            return self.skip_min_secs;
        }
        (duration * self.skip_fraction).clamp(self.skip_min_secs, self.skip_max_secs)
    }

    /// Delay between chapter poll attempts
    pub fn chapter_poll_interval(&self) -> Duration {
        Duration::from_millis(self.chapter_poll_interval_ms)
    }

    /// `<namespace>-<name>`
    pub fn class(&self, name: &str) -> String {
        format!("{}-{}", self.namespace, name)
    }
}

/// Position recorded while a source swap is in flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResumeSlot {
    /// Playback position at the moment of the switch
    pub position: f64,

    /// Whether playback was running at the moment of the switch
    pub was_playing: bool,
}

/// Read-mostly projection of the media resource
///
/// Refreshed by the reconciliation pass; the resume slot is owned by the
/// source switching protocol.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlaybackSession {
    pub current_time: f64,
    pub duration: f64,
    pub paused: bool,
    pub ended: bool,
    pub seekable: bool,
    pub network_state: NetworkState,
    pub ready_state: ReadyState,
    pub muted: bool,
    pub volume: f64,
    pub pending_resume: Option<ResumeSlot>,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self {
            current_time: 0.0,
            duration: f64::NAN,
            paused: true,
            ended: false,
            seekable: false,
            network_state: NetworkState::Empty,
            ready_state: ReadyState::HaveNothing,
            muted: false,
            volume: 1.0,
            pending_resume: None,
        }
    }
}

impl PlaybackSession {
    /// Copy the resource's current state; keeps the resume slot
    pub fn refresh(&mut self, host: &dyn MediaHost) {
        self.current_time = host.current_time();
        self.duration = host.duration();
        self.paused = host.paused();
        self.ended = host.ended();
        self.seekable = host.seekable();
        self.network_state = host.network_state();
        self.ready_state = host.ready_state();
        self.muted = host.muted();
        self.volume = host.volume();
    }

    /// Playing means neither paused nor ended
    pub fn is_playing(&self) -> bool {
        !self.paused && !self.ended
    }
}
