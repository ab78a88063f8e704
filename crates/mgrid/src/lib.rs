#![forbid(unsafe_code)]

//! mgrid public facade crate.
//!
//! A draggable masonry grid engine: items are classified as wide, tall or
//! square, laid out first-fit on a responsive column grid, and rearranged
//! live while one of them is dragged. Rendering stays with the host; the
//! engine only writes target positions and transition hints into each
//! item's [`ItemStyle`].
//!
//! [`MasonryGrid`] is the entry point. It re-exports the types most hosts
//! need and offers a lightweight prelude.

pub mod error;
pub mod hooks;
pub mod session;

// --- Core re-exports -------------------------------------------------------

pub use mgrid_core::config::{
    ColumnBreakpoint, ColumnPolicy, ConfigError, DragConfig, GridConfig, OverflowPolicy,
};
pub use mgrid_core::geometry::{CellPos, CellRegion, PixelPoint, PixelRect, Span};
pub use mgrid_core::pointer::PointerEvent;
pub use mgrid_core::{Duration, Instant};

// --- Layout re-exports -----------------------------------------------------

pub use mgrid_layout::{
    ContainerGeometry, GridItem, GridMetrics, ItemId, ItemStyle, ShapeClass, SolveOutcome,
    SolveReport, Transition,
};

// --- Session ---------------------------------------------------------------

pub use error::{DegradationAction, Error, GeometryError, HookError, Result};
pub use hooks::{DragHooks, HookReport, NoHooks};
pub use session::{DragPhase, MasonryGrid, SessionStats, StepReport};

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        ContainerGeometry, DragHooks, DragPhase, Error, GridConfig, GridItem, Instant, ItemId,
        MasonryGrid, PointerEvent, Result, SolveOutcome, StepReport, Transition,
    };

    pub use crate::{core, layout};
}

pub use mgrid_core as core;
pub use mgrid_layout as layout;
