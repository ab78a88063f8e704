#![forbid(unsafe_code)]

//! Container measurement: column count and cell size from a width.
//!
//! # Invariants
//!
//! 1. The column count comes from the configured [`ColumnPolicy`] and is
//!    never zero.
//! 2. `cell_size = floor((width − gutter × (columns − 1)) / columns)`, so
//!    `columns` cells plus the gutters between them never exceed the width.
//!
//! # Failure Modes
//!
//! A container that is zero-width, not finite, or too narrow to fit one
//! pixel per column is reported as unmeasured (`None`).
//!
//! [`ColumnPolicy`]: mgrid_core::config::ColumnPolicy

use mgrid_core::config::GridConfig;
use mgrid_core::geometry::PixelPoint;
use serde::{Deserialize, Serialize};

use crate::coords::GridMetrics;
use crate::item::GridItem;

/// Client-space box of the grid container. Height is derived, not read.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ContainerGeometry {
    pub left: f64,
    pub top: f64,
    pub width: f64,
}

impl ContainerGeometry {
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64) -> Self {
        Self { left, top, width }
    }

    /// Convert a client-space point into container space.
    #[must_use]
    pub fn to_local(&self, point: PixelPoint) -> PixelPoint {
        PixelPoint::new(point.x - self.left, point.y - self.top)
    }
}

/// Grid metrics for a container of `width` pixels.
#[must_use]
pub fn measure(config: &GridConfig, width: f64) -> Option<GridMetrics> {
    if !width.is_finite() || width <= 0.0 {
        return None;
    }
    let columns = config.columns.columns_for(width);
    let gutters = config.gutter * f64::from(columns - 1);
    let cell_size = ((width - gutters) / f64::from(columns)).floor();
    let metrics = GridMetrics::new(cell_size, config.gutter, columns);
    metrics.is_ready().then_some(metrics)
}

/// Resize every item's style to the pixel footprint of its shape.
pub fn apply_dimensions(items: &mut [GridItem], metrics: &GridMetrics) {
    for item in items {
        item.fit_to(metrics);
    }
}
