//! Simulated platform and preference store

use crate::error::{Result, VixenError};
use crate::traits::{Platform, PreferenceStore};
use crate::types::{Member, Scheduled, Scope, TimerId};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

/// Vendor spelling of the fullscreen API a headless platform exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FullscreenFlavor {
    /// No fullscreen support at all
    None,
    /// `requestFullscreen` / `exitFullscreen` / `fullscreenElement`
    #[default]
    Standard,
    /// `webkitRequestFullscreen` / `webkitExitFullscreen` / `webkitFullscreenElement`
    Webkit,
    /// `mozRequestFullScreen` / `mozCancelFullScreen` / `mozFullScreenElement`
    Moz,
}

impl FullscreenFlavor {
    fn element_members(self) -> Vec<Member> {
        match self {
            Self::None => Vec::new(),
            Self::Standard => vec![
                Member::null("onfullscreenchange"),
                Member::present("requestFullscreen"),
            ],
            Self::Webkit => vec![
                Member::null("onwebkitfullscreenchange"),
                Member::present("webkitRequestFullscreen"),
            ],
            Self::Moz => vec![
                Member::null("onmozfullscreenchange"),
                Member::present("mozRequestFullScreen"),
            ],
        }
    }

    fn document_members(self) -> Vec<Member> {
        match self {
            Self::None => Vec::new(),
            Self::Standard => vec![
                Member::null("onfullscreenchange"),
                Member::present("exitFullscreen"),
                Member::present("fullscreenElement"),
            ],
            Self::Webkit => vec![
                Member::present("webkitExitFullscreen"),
                Member::present("webkitFullscreenElement"),
            ],
            Self::Moz => vec![
                Member::present("mozCancelFullScreen"),
                Member::present("mozFullScreenElement"),
            ],
        }
    }
}

#[derive(Debug)]
struct PlatformState {
    flavor: FullscreenFlavor,
    fullscreen: bool,
    scheduled: Vec<Scheduled>,
    invocations: Vec<String>,
    member_scans: u32,
}

/// Platform adapter with a simulated fullscreen API and a timer queue
#[derive(Debug, Clone)]
pub struct HeadlessPlatform {
    state: Rc<RefCell<PlatformState>>,
}

impl HeadlessPlatform {
    /// Create a platform exposing the given fullscreen spelling
    pub fn new(flavor: FullscreenFlavor) -> Self {
        Self {
            state: Rc::new(RefCell::new(PlatformState {
                flavor,
                fullscreen: false,
                scheduled: Vec::new(),
                invocations: Vec::new(),
                member_scans: 0,
            })),
        }
    }

    /// Whether the simulated screen is in fullscreen mode
    pub fn is_fullscreen(&self) -> bool {
        self.state.borrow().fullscreen
    }

    /// Leave or enter fullscreen behind the controller's back (system gesture)
    pub fn force_fullscreen(&self, fullscreen: bool) {
        self.state.borrow_mut().fullscreen = fullscreen;
    }

    /// Drain scheduled timers
    pub fn take_scheduled(&self) -> Vec<Scheduled> {
        std::mem::take(&mut self.state.borrow_mut().scheduled)
    }

    /// Member names invoked so far
    pub fn invocations(&self) -> Vec<String> {
        self.state.borrow().invocations.clone()
    }

    /// How many times a scope was enumerated
    pub fn member_scans(&self) -> u32 {
        self.state.borrow().member_scans
    }
}

impl Default for HeadlessPlatform {
    fn default() -> Self {
        Self::new(FullscreenFlavor::Standard)
    }
}

impl Platform for HeadlessPlatform {
    fn members(&self, scope: Scope) -> Vec<Member> {
        let mut state = self.state.borrow_mut();
        state.member_scans += 1;
        match scope {
            Scope::Document => state.flavor.document_members(),
            Scope::Element(_) => state.flavor.element_members(),
        }
    }

    fn invoke(&mut self, scope: Scope, member: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        let lowered = member.to_lowercase();
        let known = match scope {
            Scope::Document => state.flavor.document_members(),
            Scope::Element(_) => state.flavor.element_members(),
        };
        if !known.iter().any(|m| m.name == member && m.present) {
            return Err(VixenError::unsupported(member.to_string()));
        }
        if lowered.ends_with("requestfullscreen") {
            state.fullscreen = true;
        } else if lowered.ends_with("exitfullscreen") || lowered.ends_with("cancelfullscreen") {
            state.fullscreen = false;
        }
        state.invocations.push(member.to_string());
        Ok(())
    }

    fn read_flag(&self, _scope: Scope, member: &str) -> bool {
        let lowered = member.to_lowercase();
        let state = self.state.borrow();
        if lowered.ends_with("fullscreenelement") || lowered.ends_with("isfullscreen") {
            state.fullscreen
        } else {
            false
        }
    }

    fn schedule(&mut self, delay: Duration, timer: TimerId) {
        self.state
            .borrow_mut()
            .scheduled
            .push(Scheduled { delay, timer });
    }
}

/// Preference store kept in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
    }
}
