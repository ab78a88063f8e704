#![forbid(unsafe_code)]

//! Core: geometry, pointer input, deferred tasks and configuration.
//!
//! # Role in mgrid
//! `mgrid-core` holds the vocabulary shared by the layout engine
//! (`mgrid-layout`) and the drag session facade (`mgrid`): pixel and cell
//! geometry, the pointer events delivered by the host, single-deadline
//! deferred task slots, and the [`GridConfig`](config::GridConfig) that tunes
//! everything else.
//!
//! Nothing in this crate reads a clock. Every time-dependent API takes an
//! explicit [`Instant`](web_time::Instant) so hosts (and tests) decide when
//! time advances.

pub mod config;
pub mod deferred;
pub mod geometry;
pub mod pointer;

pub use config::{
    ColumnBreakpoint, ColumnPolicy, ConfigError, DragConfig, GridConfig, OverflowPolicy,
};
pub use deferred::DeferredSlot;
pub use geometry::{CellPos, CellRegion, PixelPoint, PixelRect, Span};
pub use pointer::PointerEvent;

pub use web_time::{Duration, Instant};
