#![forbid(unsafe_code)]

//! Pixel ⇄ cell conversion.
//!
//! [`GridMetrics`] carries the three numbers that define the grid in pixel
//! space: cell size, gutter and column count. The *pitch* of the grid is
//! `cell_size + gutter`; cell `(col, row)` starts at `(col × pitch, row × pitch)`.
//!
//! # Invariants
//!
//! 1. `pixel_to_cell` never returns a column whose footprint crosses the
//!    right edge: `col + col_span ≤ num_columns` whenever the span fits at all.
//! 2. Rows are unbounded above; the grid grows downward.
//! 3. `cell_to_pixel(pixel_to_cell(p))` is the top-left of the cell that
//!    contains `p`, not `p` itself. The mapping is floor-based.
//!
//! # Failure Modes
//!
//! An unmeasured grid (`cell_size ≤ 0`) and non-finite coordinates yield
//! `None` (or the origin for `cell_to_pixel`). Callers treat that as "not
//! ready yet", never as fatal.

use mgrid_core::geometry::{CellPos, CellRegion, PixelPoint, Span};

/// Pixel geometry of the grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub cell_size: f64,
    pub gutter: f64,
    pub num_columns: u16,
}

impl GridMetrics {
    /// Create metrics for a measured grid.
    #[must_use]
    pub const fn new(cell_size: f64, gutter: f64, num_columns: u16) -> Self {
        Self {
            cell_size,
            gutter,
            num_columns,
        }
    }

    /// Metrics for a container that has not been measured yet.
    #[must_use]
    pub const fn unmeasured(gutter: f64, num_columns: u16) -> Self {
        Self::new(0.0, gutter, num_columns)
    }

    /// Whether the cell size is established.
    #[inline]
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.cell_size.is_finite() && self.cell_size > 0.0 && self.num_columns > 0
    }

    /// Distance between the starts of adjacent cells.
    #[inline]
    #[must_use]
    pub fn pitch(&self) -> f64 {
        self.cell_size + self.gutter
    }

    /// Convert a pixel position to the region an item of `span` would occupy.
    ///
    /// The column is clamped to `[0, num_columns - span.cols]` and the row to
    /// `≥ 0`. Returns `None` when the grid is unmeasured or a coordinate is
    /// not finite.
    #[must_use]
    pub fn pixel_to_cell(&self, x: f64, y: f64, span: Span) -> Option<CellRegion> {
        if !self.is_ready() || !x.is_finite() || !y.is_finite() {
            return None;
        }
        let pitch = self.pitch();
        let max_col = self.num_columns.saturating_sub(span.cols);
        let col = clamp_index((x / pitch).floor(), max_col);
        let row = clamp_index((y / pitch).floor(), u16::MAX);
        Some(CellRegion::new(col, row, span.cols, span.rows))
    }

    /// Top-left pixel of a cell. The origin when the grid is unmeasured.
    #[must_use]
    pub fn cell_to_pixel(&self, col: u16, row: u16) -> PixelPoint {
        if !self.is_ready() {
            return PixelPoint::default();
        }
        let pitch = self.pitch();
        PixelPoint::new(f64::from(col) * pitch, f64::from(row) * pitch)
    }

    /// Cell containing a pixel, without span clamping.
    ///
    /// Used to read an item's current cell back from its style.
    #[must_use]
    pub fn cell_of_pixel(&self, point: PixelPoint) -> Option<CellPos> {
        if !self.is_ready() || !point.x.is_finite() || !point.y.is_finite() {
            return None;
        }
        let pitch = self.pitch();
        Some(CellPos::new(
            clamp_index((point.y / pitch).floor(), u16::MAX),
            clamp_index((point.x / pitch).floor(), u16::MAX),
        ))
    }

    /// Pixel length of `cells` adjacent cells including the gutters between
    /// them.
    #[must_use]
    pub fn extent(&self, cells: u16) -> f64 {
        if cells == 0 {
            return 0.0;
        }
        f64::from(cells) * self.cell_size + f64::from(cells - 1) * self.gutter
    }

    /// Pixel `(width, height)` of an item covering `span`.
    #[must_use]
    pub fn item_extent(&self, span: Span) -> (f64, f64) {
        (self.extent(span.cols), self.extent(span.rows))
    }

    /// Container height needed to show `rows` rows, trailing gutter included.
    #[must_use]
    pub fn height_for_rows(&self, rows: u16) -> f64 {
        if rows == 0 || !self.is_ready() {
            return 0.0;
        }
        f64::from(rows) * self.pitch() + self.gutter
    }
}

fn clamp_index(value: f64, max: u16) -> u16 {
    if value <= 0.0 {
        0
    } else if value >= f64::from(max) {
        max
    } else {
        value as u16
    }
}
