//! Lifecycle and error state machine
//!
//! ```text
//! Uninitialized -> Ready -> { Playing <-> Paused } -> Ended
//!        \__________\__________\__________\___________-> Errored
//! ```
//!
//! `Errored` is entered once every declared source candidate has failed
//! and is terminal for the session. Only [`Lifecycle::reset`] (a manual
//! `load()`) leaves it.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use vixen_core::MediaEvent;

/// Lifecycle state of a playback session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// No metadata yet
    Uninitialized,

    /// Metadata known, playback not started
    Ready,

    /// Playing
    Playing,

    /// Paused mid-resource
    Paused,

    /// Reached the end
    Ended,

    /// Every source failed; terminal
    Errored,
}

impl LifecycleState {
    /// Lowercase name, used in logs and the simulator output
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Uninitialized => "uninitialized",
            Self::Ready => "ready",
            Self::Playing => "playing",
            Self::Paused => "paused",
            Self::Ended => "ended",
            Self::Errored => "errored",
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// State change caused by one event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: LifecycleState,
    pub to: LifecycleState,
}

impl Transition {
    /// Whether this transition entered `Errored`
    pub fn is_fatal(&self) -> bool {
        self.to == LifecycleState::Errored
    }
}

/// Session lifecycle with a per-candidate failure tally
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: LifecycleState,
    candidate_count: usize,
    failed: HashSet<usize>,
}

impl Lifecycle {
    /// Start a session over `candidate_count` declared sources
    pub fn new(candidate_count: usize) -> Self {
        Self {
            state: LifecycleState::Uninitialized,
            candidate_count,
            failed: HashSet::new(),
        }
    }

    /// Current state
    pub fn state(&self) -> LifecycleState {
        self.state
    }

    /// Whether the session is in the terminal error state
    pub fn is_errored(&self) -> bool {
        self.state == LifecycleState::Errored
    }

    /// Distinct candidates that failed so far
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Declared candidate count
    pub fn candidate_count(&self) -> usize {
        self.candidate_count
    }

    /// Open a new session, forgetting failures and any error
    pub fn reset(&mut self, candidate_count: usize) {
        *self = Self::new(candidate_count);
    }

    /// Classify a lifecycle event
    ///
    /// Returns the transition it caused, if any. Events are ignored once
    /// the session is errored.
    pub fn on_event(&mut self, event: MediaEvent) -> Option<Transition> {
        use LifecycleState as S;

        if self.is_errored() {
            return None;
        }

        let next = match (event, self.state) {
            (MediaEvent::SourceError { index }, _) => return self.record_failure(index),
            (MediaEvent::Emptied | MediaEvent::LoadStart, _) => S::Uninitialized,
            (MediaEvent::LoadedMetadata, S::Uninitialized) => S::Ready,
            (MediaEvent::Play | MediaEvent::Playing, _) => S::Playing,
            (MediaEvent::Pause, S::Playing | S::Ready) => S::Paused,
            (MediaEvent::Ended, _) => S::Ended,
            (MediaEvent::Seeked, S::Ended) => S::Paused,
            _ => return None,
        };
        self.move_to(next)
    }

    fn record_failure(&mut self, index: usize) -> Option<Transition> {
        if index >= self.candidate_count {
            tracing::debug!(index, candidates = self.candidate_count, "ignoring failure of undeclared source");
            return None;
        }
        if !self.failed.insert(index) {
            return None;
        }
        tracing::debug!(
            index,
            failed = self.failed.len(),
            candidates = self.candidate_count,
            "source candidate failed"
        );
        if self.failed.len() == self.candidate_count {
            self.move_to(LifecycleState::Errored)
        } else {
            None
        }
    }

    fn move_to(&mut self, next: LifecycleState) -> Option<Transition> {
        if next == self.state {
            return None;
        }
        let transition = Transition {
            from: self.state,
            to: next,
        };
        self.state = next;
        tracing::info!(from = %transition.from, to = %transition.to, "lifecycle transition");
        Some(transition)
    }
}
