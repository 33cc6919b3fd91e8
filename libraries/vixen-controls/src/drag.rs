//! Pointer drag normalization
//!
//! Turns raw pointer coordinates into a position inside a control, as a
//! pair in `[0, 1] x [0, 1]`. The y axis is inverted so that larger values
//! always mean "up" for vertical sliders and "right" for horizontal ones.

use serde::Serialize;
use vixen_core::{Dom, ElementHandle, Geometry, PointerButton};

/// Control a drag session manipulates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragTarget {
    Scrubber,
    Volume,
}

/// Normalized pointer position inside a control
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DragPoint {
    pub x: f64,
    pub y: f64,
}

impl DragPoint {
    /// Value along the control's main axis
    pub fn value(self, vertical: bool) -> f64 {
        if vertical {
            self.y
        } else {
            self.x
        }
    }
}

/// Clamp into `[0, 1]`; NaN maps to 0
fn clamp_unit(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Map a pointer position to a control-relative point
///
/// `origin` is the control's screen position, `size` its `(width, height)`.
pub fn normalize(pointer: (f64, f64), origin: (f64, f64), size: (f64, f64)) -> DragPoint {
    let raw_x = (pointer.0 - origin.0) / size.0;
    let raw_y = (pointer.1 - origin.1) / size.1;
    DragPoint {
        x: clamp_unit(raw_x),
        y: clamp_unit(1.0 - raw_y),
    }
}

/// Screen position of an element, summing offsets up the offset-parent chain
pub fn screen_origin(dom: &dyn Dom, handle: ElementHandle) -> (f64, f64) {
    let mut left = 0.0;
    let mut top = 0.0;
    let mut node = Some(handle);
    // Cycle guard for hosts that report broken offset chains
    let mut remaining = 1024;

    while let Some(current) = node {
        if remaining == 0 {
            tracing::warn!(?handle, "offset parent chain too deep, origin truncated");
            break;
        }
        remaining -= 1;
        let geometry = dom.geometry(current);
        left += geometry.left;
        top += geometry.top;
        node = dom.offset_parent(current);
    }
    (left, top)
}

/// One active manipulation of a control
///
/// The origin walk happens once, when the session begins; every movement
/// afterwards is a division.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    target: DragTarget,
    origin: (f64, f64),
    size: (f64, f64),
    vertical: bool,
}

impl DragSession {
    /// Start a session; only the primary button starts one
    pub fn begin(
        dom: &dyn Dom,
        handle: ElementHandle,
        target: DragTarget,
        button: PointerButton,
        vertical: bool,
    ) -> Option<Self> {
        if button != PointerButton::Primary {
            return None;
        }
        let Geometry { width, height, .. } = dom.geometry(handle);
        Some(Self {
            target,
            origin: screen_origin(dom, handle),
            size: (width, height),
            vertical,
        })
    }

    /// Control being manipulated
    pub fn target(&self) -> DragTarget {
        self.target
    }

    /// Normalized point for a pointer position
    pub fn point(&self, x: f64, y: f64) -> DragPoint {
        normalize((x, y), self.origin, self.size)
    }

    /// Value along the control's main axis for a pointer position
    pub fn value(&self, x: f64, y: f64) -> f64 {
        self.point(x, y).value(self.vertical)
    }
}
