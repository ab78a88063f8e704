#![forbid(unsafe_code)]

//! Geometric primitives.
//!
//! Two coordinate spaces meet here: continuous pixel space (the host's
//! `left/top/width/height` style values) and the discrete cell space of the
//! grid (0-indexed, origin at top-left, rows growing downward).

use serde::{Deserialize, Serialize};

/// A point in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    /// Create a new point.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    #[inline]
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Component-wise difference `self - other`.
    #[inline]
    #[must_use]
    pub fn offset_from(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// An axis-aligned rectangle in pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl PixelRect {
    /// Create a new rectangle.
    #[inline]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Top-left corner.
    #[inline]
    pub const fn origin(&self) -> PixelPoint {
        PixelPoint::new(self.left, self.top)
    }

    /// Right edge (exclusive).
    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// Bottom edge (exclusive).
    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// Check if a point is inside the rectangle.
    #[inline]
    pub fn contains(&self, point: PixelPoint) -> bool {
        point.x >= self.left && point.x < self.right() && point.y >= self.top && point.y < self.bottom()
    }
}

/// Number of columns and rows a grid item covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub cols: u16,
    pub rows: u16,
}

impl Span {
    /// A single cell.
    pub const UNIT: Self = Self { cols: 1, rows: 1 };

    /// Create a span. Zero extents are raised to one.
    #[inline]
    pub const fn new(cols: u16, rows: u16) -> Self {
        Self {
            cols: if cols == 0 { 1 } else { cols },
            rows: if rows == 0 { 1 } else { rows },
        }
    }

    /// Number of cells covered.
    #[inline]
    pub const fn area(&self) -> u32 {
        self.cols as u32 * self.rows as u32
    }
}

impl Default for Span {
    fn default() -> Self {
        Self::UNIT
    }
}

/// A cell coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct CellPos {
    pub row: u16,
    pub col: u16,
}

impl CellPos {
    /// Create a new cell position.
    #[inline]
    pub const fn new(row: u16, col: u16) -> Self {
        Self { row, col }
    }
}

/// A rectangular block of cells anchored at its top-left cell.
///
/// Used for item footprints and for the drag target ("ghost"). Cells are
/// enumerated row-major, which is also the order every scan in the engine
/// uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRegion {
    pub col: u16,
    pub row: u16,
    pub col_span: u16,
    pub row_span: u16,
}

impl CellRegion {
    /// Create a region. Zero spans are raised to one.
    #[inline]
    pub const fn new(col: u16, row: u16, col_span: u16, row_span: u16) -> Self {
        let span = Span::new(col_span, row_span);
        Self {
            col,
            row,
            col_span: span.cols,
            row_span: span.rows,
        }
    }

    /// Region of `span` anchored at `pos`.
    #[inline]
    pub const fn at(pos: CellPos, span: Span) -> Self {
        Self::new(pos.col, pos.row, span.cols, span.rows)
    }

    /// Anchor cell.
    #[inline]
    pub const fn anchor(&self) -> CellPos {
        CellPos::new(self.row, self.col)
    }

    /// Column and row extent.
    #[inline]
    pub const fn span(&self) -> Span {
        Span::new(self.col_span, self.row_span)
    }

    /// One past the last column.
    #[inline]
    pub const fn right(&self) -> u16 {
        self.col.saturating_add(self.col_span)
    }

    /// One past the last row.
    #[inline]
    pub const fn bottom(&self) -> u16 {
        self.row.saturating_add(self.row_span)
    }

    /// Whether the region covers `pos`.
    #[inline]
    pub const fn contains(&self, pos: CellPos) -> bool {
        pos.col >= self.col && pos.col < self.right() && pos.row >= self.row && pos.row < self.bottom()
    }

    /// Whether two regions share at least one cell.
    #[inline]
    pub const fn intersects(&self, other: &CellRegion) -> bool {
        self.col < other.right()
            && other.col < self.right()
            && self.row < other.bottom()
            && other.row < self.bottom()
    }

    /// Iterate covered cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellPos> + '_ {
        (self.row..self.bottom())
            .flat_map(move |row| (self.col..self.right()).map(move |col| CellPos::new(row, col)))
    }
}
