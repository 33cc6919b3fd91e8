//! Validated volume levels and volume persistence

use crate::error::ControlError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use vixen_core::PreferenceStore;

/// Volume in `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct VolumeLevel(f64);

impl VolumeLevel {
    /// Silence
    pub const MIN: Self = Self(0.0);

    /// Full volume
    pub const MAX: Self = Self(1.0);

    /// Validate a level; NaN and anything outside `[0, 1]` is rejected
    pub fn new(level: f64) -> Result<Self, ControlError> {
        if (0.0..=1.0).contains(&level) {
            Ok(Self(level))
        } else {
            Err(ControlError::InvalidVolume(level.to_string()))
        }
    }

    /// Level as a number
    pub fn get(self) -> f64 {
        self.0
    }

    /// Fill percentage of the volume bar
    pub fn percent(self) -> f64 {
        self.0 * 100.0
    }
}

impl TryFrom<f64> for VolumeLevel {
    type Error = ControlError;

    fn try_from(level: f64) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl FromStr for VolumeLevel {
    type Err = ControlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let level: f64 = s
            .trim()
            .parse()
            .map_err(|_| ControlError::InvalidVolume(s.to_string()))?;
        Self::new(level)
    }
}

impl fmt::Display for VolumeLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Remembered volume, if the store holds a valid one
pub fn restore(store: &dyn PreferenceStore, key: &str) -> Option<VolumeLevel> {
    let raw = store.get(key)?;
    match raw.parse() {
        Ok(level) => Some(level),
        Err(e) => {
            tracing::debug!(key, error = %e, "ignoring remembered volume");
            None
        }
    }
}

/// Remember a volume
pub fn persist(store: &mut dyn PreferenceStore, key: &str, level: VolumeLevel) {
    store.set(key, &level.to_string());
}
