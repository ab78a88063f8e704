#![forbid(unsafe_code)]

//! Pointer events delivered by the host.
//!
//! The host owns input capture. It forwards pointer-down / move / up as
//! [`PointerEvent`]s in client coordinates; only pointer-down needs to carry
//! the bounding box of the grabbed element, from which the grab offset is
//! derived.

use serde::{Deserialize, Serialize};

use crate::geometry::{PixelPoint, PixelRect};

/// A pointer sample in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    /// Bounding box of the element under the pointer, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<PixelRect>,
}

impl PointerEvent {
    /// Create a pointer sample without target bounds.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y, target: None }
    }

    /// Attach the target element's bounding box.
    #[must_use]
    pub fn with_target(mut self, target: PixelRect) -> Self {
        self.target = Some(target);
        self
    }

    /// Pointer position as a point.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> PixelPoint {
        PixelPoint::new(self.x, self.y)
    }

    /// Offset of the pointer inside its target, or zero when unknown.
    #[must_use]
    pub fn grab_offset(&self) -> PixelPoint {
        self.target
            .map(|rect| self.position().offset_from(rect.origin()))
            .unwrap_or_default()
    }

    /// Whether both coordinates are finite numbers.
    #[inline]
    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}
