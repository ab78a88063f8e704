#![forbid(unsafe_code)]

//! Grid items: identity, shape and the style fields the engine writes.

use std::fmt;

use mgrid_core::geometry::{CellRegion, PixelPoint, Span};
use serde::{Deserialize, Serialize};

use crate::coords::GridMetrics;

/// Stable, caller-assigned item key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Shape of an item, fixed when the item is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeClass {
    /// Two columns, one row.
    Wide,
    /// One column, two rows.
    Tall,
    /// One cell.
    Square,
}

impl ShapeClass {
    /// Aspect ratio beyond which an item stops being square.
    pub const ASPECT_THRESHOLD: f64 = 1.5;

    /// Classify a natural pixel size.
    #[must_use]
    pub fn classify(width: f64, height: f64) -> Self {
        if width > height * Self::ASPECT_THRESHOLD {
            Self::Wide
        } else if height > width * Self::ASPECT_THRESHOLD {
            Self::Tall
        } else {
            Self::Square
        }
    }

    /// Cells covered by this shape.
    #[must_use]
    pub const fn span(self) -> Span {
        match self {
            Self::Wide => Span::new(2, 1),
            Self::Tall => Span::new(1, 2),
            Self::Square => Span::UNIT,
        }
    }
}

/// Transition hint for the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Jump straight to the new position.
    #[default]
    None,
    /// Animate from the previous position.
    Animated,
}

/// Presentation fields written by the engine and read by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ItemStyle {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub transition: Transition,
    /// Draw above siblings (set on the dropped item until it settles).
    pub raised: bool,
}

impl ItemStyle {
    /// Top-left corner.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> PixelPoint {
        PixelPoint::new(self.left, self.top)
    }

    /// Move to `point`.
    #[inline]
    pub fn move_to(&mut self, point: PixelPoint) {
        self.left = point.x;
        self.top = point.y;
    }
}

/// One placeable unit of the grid.
///
/// The host creates and destroys items; the engine only repositions them.
/// `shape` is derived from the natural size at construction and never
/// changes afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct GridItem {
    id: ItemId,
    natural_width: f64,
    natural_height: f64,
    shape: ShapeClass,
    /// Placement output.
    pub style: ItemStyle,
    /// True only while this item is the subject of an active drag.
    pub is_dragging: bool,
}

impl GridItem {
    /// Create an item from its desired pixel size.
    ///
    /// The style starts at the origin with the natural size; the first
    /// responsive pass resizes it to its cell footprint.
    #[must_use]
    pub fn new(id: impl Into<ItemId>, width: f64, height: f64) -> Self {
        Self {
            id: id.into(),
            natural_width: width,
            natural_height: height,
            shape: ShapeClass::classify(width, height),
            style: ItemStyle {
                width,
                height,
                ..ItemStyle::default()
            },
            is_dragging: false,
        }
    }

    /// Builder: initial style position.
    #[must_use]
    pub fn at(mut self, left: f64, top: f64) -> Self {
        self.style.left = left;
        self.style.top = top;
        self
    }

    #[inline]
    #[must_use]
    pub const fn id(&self) -> ItemId {
        self.id
    }

    #[inline]
    #[must_use]
    pub const fn shape(&self) -> ShapeClass {
        self.shape
    }

    /// Columns and rows covered.
    #[inline]
    #[must_use]
    pub const fn span(&self) -> Span {
        self.shape.span()
    }

    /// Size the item was created with.
    #[inline]
    #[must_use]
    pub const fn natural_size(&self) -> (f64, f64) {
        (self.natural_width, self.natural_height)
    }

    /// Cells covered at the item's current style position.
    ///
    /// `None` while the grid is unmeasured.
    #[must_use]
    pub fn footprint(&self, metrics: &GridMetrics) -> Option<CellRegion> {
        metrics
            .cell_of_pixel(self.style.position())
            .map(|pos| CellRegion::at(pos, self.span()))
    }

    /// Resize the style to the pixel footprint of the item's shape.
    pub fn fit_to(&mut self, metrics: &GridMetrics) {
        let (width, height) = metrics.item_extent(self.span());
        self.style.width = width;
        self.style.height = height;
    }
}
