//! Platform capability normalization
//!
//! Platforms spell the same feature differently (`requestFullscreen`,
//! `webkitRequestFullscreen`, `mozRequestFullScreen`). A capability is
//! resolved by a case-insensitive suffix match over a scope's members,
//! once, when the controller is built; the resolved names are then used
//! directly.

use crate::error::{ControlError, Result};
use vixen_core::{ElementHandle, Member, Platform, Scope};

/// Outcome of resolving one capability
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capability {
    /// Platform member implementing the capability
    Supported(String),
    Unsupported,
}

impl Capability {
    /// Whether a member was found
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported(_))
    }

    /// Member name, if supported
    pub fn member(&self) -> Option<&str> {
        match self {
            Self::Supported(name) => Some(name),
            Self::Unsupported => None,
        }
    }

    /// First supported of two lookups
    fn or_else(self, fallback: impl FnOnce() -> Self) -> Self {
        match self {
            Self::Supported(_) => self,
            Self::Unsupported => fallback(),
        }
    }
}

/// Find the first present member whose name ends with `capability`
///
/// Matching ignores case. Event-handler slots (names starting with `on`)
/// never match.
pub fn resolve(capability: &str, members: &[Member]) -> Capability {
    let needle = capability.to_lowercase();
    members
        .iter()
        .find(|member| {
            let name = member.name.to_lowercase();
            member.present && name.ends_with(&needle) && !name.starts_with("on")
        })
        .map_or(Capability::Unsupported, |member| {
            Capability::Supported(member.name.clone())
        })
}

/// Fullscreen entry, exit and state query, resolved for one platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullscreenApi {
    /// Called on the element to enter fullscreen
    pub request: Capability,
    /// Called on the document to leave fullscreen
    pub exit: Capability,
    /// Read on the document to learn whether something is fullscreen
    pub state: Capability,
}

impl FullscreenApi {
    /// Resolve every fullscreen member; scans each scope once
    pub fn resolve(platform: &dyn Platform, element: ElementHandle) -> Self {
        let element_members = platform.members(Scope::Element(element));
        let document_members = platform.members(Scope::Document);

        let api = Self {
            request: resolve("requestfullscreen", &element_members),
            exit: resolve("exitfullscreen", &document_members)
                .or_else(|| resolve("cancelfullscreen", &document_members)),
            state: resolve("fullscreenelement", &document_members)
                .or_else(|| resolve("isfullscreen", &document_members)),
        };
        tracing::debug!(
            request = ?api.request.member(),
            exit = ?api.exit.member(),
            state = ?api.state.member(),
            "resolved fullscreen capabilities"
        );
        api
    }

    /// Whether entering and leaving fullscreen are both possible
    pub fn is_supported(&self) -> bool {
        self.request.is_supported() && self.exit.is_supported()
    }

    /// Enter fullscreen with `element`
    pub fn enter(&self, platform: &mut dyn Platform, element: ElementHandle) -> Result<()> {
        let member = self
            .request
            .member()
            .ok_or(ControlError::Unsupported("fullscreen"))?;
        platform.invoke(Scope::Element(element), member)?;
        Ok(())
    }

    /// Leave fullscreen
    pub fn exit(&self, platform: &mut dyn Platform) -> Result<()> {
        let member = self
            .exit
            .member()
            .ok_or(ControlError::Unsupported("fullscreen"))?;
        platform.invoke(Scope::Document, member)?;
        Ok(())
    }

    /// Platform's view of the fullscreen state; `None` when it cannot be queried
    pub fn query(&self, platform: &dyn Platform) -> Option<bool> {
        self.state
            .member()
            .map(|member| platform.read_flag(Scope::Document, member))
    }
}
