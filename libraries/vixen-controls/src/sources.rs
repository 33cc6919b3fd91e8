//! Source candidates and the resolution switch protocol
//!
//! A switch records the playback position in the session's resume slot,
//! swaps the locator and reloads. The next "sufficiently loaded" signal
//! seeks back to the recorded position, restarts playback if it was
//! running, and clears the slot.

use crate::error::{ControlError, Result};
use crate::types::{PlaybackSession, ResumeSlot};
use std::collections::BTreeMap;
use vixen_core::{MediaEvent, MediaHost, MediaSourceCandidate};

/// Declared source candidates and the playable ones indexed by resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceIndex {
    declared: Vec<MediaSourceCandidate>,
    by_resolution: BTreeMap<u32, MediaSourceCandidate>,
}

impl SourceIndex {
    /// Snapshot the resource's declared sources
    ///
    /// Candidates the platform cannot play are left out of the resolution
    /// index; for each tier the first declared candidate wins.
    pub fn build(host: &dyn MediaHost) -> Self {
        let declared = host.sources();
        let mut by_resolution = BTreeMap::new();

        for candidate in &declared {
            let Some(tier) = candidate.resolution else {
                continue;
            };
            if !host.can_play_type(&candidate.mime_type).is_playable() {
                tracing::debug!(mime = %candidate.mime_type, tier, "skipping unplayable source");
                continue;
            }
            by_resolution.entry(tier).or_insert_with(|| candidate.clone());
        }

        tracing::debug!(
            declared = declared.len(),
            tiers = by_resolution.len(),
            "indexed source candidates"
        );
        Self {
            declared,
            by_resolution,
        }
    }

    /// Every declared candidate, in declaration order
    pub fn declared(&self) -> &[MediaSourceCandidate] {
        &self.declared
    }

    /// Available resolution tiers, ascending
    pub fn resolutions(&self) -> Vec<u32> {
        self.by_resolution.keys().copied().collect()
    }

    /// Candidate retained for a tier
    pub fn get(&self, tier: u32) -> Option<&MediaSourceCandidate> {
        self.by_resolution.get(&tier)
    }

    /// Tier of the candidate whose locator is active
    pub fn active_tier(&self, current_src: Option<&str>) -> Option<u32> {
        let src = current_src?;
        self.by_resolution
            .iter()
            .find(|(_, candidate)| candidate.locator == src)
            .map(|(tier, _)| *tier)
    }
}

/// Switch the resource to the candidate of `tier`
///
/// A switch started while another is in flight replaces its slot but keeps
/// the position and play state recorded by the first one, since the
/// resource has already been reset.
pub fn switch_resolution(
    host: &mut dyn MediaHost,
    session: &mut PlaybackSession,
    index: &SourceIndex,
    tier: u32,
) -> Result<()> {
    let candidate = index
        .get(tier)
        .ok_or(ControlError::UnknownResolution(tier))?;

    let slot = session.pending_resume.unwrap_or_else(|| ResumeSlot {
        position: host.current_time(),
        was_playing: !host.paused() && !host.ended(),
    });
    session.pending_resume = Some(slot);

    tracing::info!(
        tier,
        locator = %candidate.locator,
        position = slot.position,
        was_playing = slot.was_playing,
        "switching resolution"
    );
    host.pause();
    host.set_src(&candidate.locator);
    host.load();
    Ok(())
}

/// Complete a pending switch if `event` says enough media is loaded
///
/// Returns the slot that was resumed.
pub fn resume_if_loaded(
    host: &mut dyn MediaHost,
    session: &mut PlaybackSession,
    event: MediaEvent,
) -> Result<Option<ResumeSlot>> {
    if !event.is_sufficiently_loaded() {
        return Ok(None);
    }
    let Some(slot) = session.pending_resume.take() else {
        return Ok(None);
    };

    tracing::debug!(event = event.name(), position = slot.position, "resuming after source swap");
    host.set_current_time(slot.position);
    if slot.was_playing {
        host.play()?;
    }
    Ok(Some(slot))
}
