//! Vixen Simulator Library
//!
//! Scripted scenarios for the Vixen media controls, played against the
//! headless collaborators on a virtual clock.
//!
//! This library exposes the runner for the binary and for testing.

pub mod config;
pub mod error;
pub mod runner;
pub mod scenario;

// Re-export commonly used types for convenience
pub use config::{LayoutSettings, PlatformSettings, SimConfig};
pub use error::{Result, SimError};
pub use runner::{Report, Simulator, StepOutcome};
pub use scenario::{Scenario, Step};
