/// Element tree and platform types
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Opaque handle to a host element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ElementHandle(pub u64);

/// Whether a class is added or removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassOp {
    Add,
    Remove,
}

impl ClassOp {
    /// `Add` when `condition` holds, `Remove` otherwise
    pub fn when(condition: bool) -> Self {
        if condition {
            Self::Add
        } else {
            Self::Remove
        }
    }
}

/// Offset box of an element relative to its offset parent
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Geometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Geometry {
    /// Create a geometry
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Taller than wide
    pub fn is_vertical(&self) -> bool {
        self.height > self.width
    }

    /// Length along the main axis for the given orientation
    pub fn extent(&self, vertical: bool) -> f64 {
        if vertical {
            self.height
        } else {
            self.width
        }
    }
}

/// Pointer button of a pointer-down event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerButton {
    Primary,
    Middle,
    Secondary,
}

/// User interface signal delivered for one of the surface's elements
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UiEvent {
    Click,
    PointerDown {
        button: PointerButton,
        x: f64,
        y: f64,
    },
    /// Selected option of a `select` element changed
    Change {
        index: usize,
    },
    Focus,
    Blur,
}

/// Member lookup scope of the platform adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    /// The document-level namespace
    Document,
    /// A specific element
    Element(ElementHandle),
}

/// One enumerable member of a scope
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Member name as the platform spells it, e.g. `webkitRequestFullscreen`
    pub name: String,

    /// Whether the member currently holds a non-null value
    pub present: bool,
}

impl Member {
    /// A member that holds a value
    pub fn present(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            present: true,
        }
    }

    /// A member that exists but is null
    pub fn null(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            present: false,
        }
    }
}

/// Deferred callbacks the engine asks the host to schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimerId {
    /// Next attempt of the chapter-track poll
    ChapterPoll,
    /// Next idle tick; used to batch seeks produced by scrubbing
    Idle,
}

/// A scheduled timer as recorded by a host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    pub delay: Duration,
    pub timer: TimerId,
}
