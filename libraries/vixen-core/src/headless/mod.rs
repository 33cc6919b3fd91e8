//! Headless collaborators
//!
//! In-memory implementations of every collaborator contract. The simulator
//! runs controllers against them, and the integration tests use them as
//! fixtures.

mod dom;
mod media;
mod platform;

pub use dom::HeadlessDom;
pub use media::{HeadlessMedia, HeadlessTrack};
pub use platform::{FullscreenFlavor, HeadlessPlatform, MemoryStore};
