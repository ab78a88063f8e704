#![forbid(unsafe_code)]

//! Placement engine of the mgrid masonry grid.
//!
//! - [`coords`]: pixel ⇄ cell conversion ([`GridMetrics`]).
//! - [`occupancy`]: the bounded cell matrix ([`OccupancyGrid`]).
//! - [`collision`]: memoised "item under cell" lookup.
//! - [`solver`]: the placement pass ([`LayoutSolver`]).
//! - [`responsive`]: container measurement and item sizing.

pub mod collision;
pub mod coords;
pub mod item;
pub mod occupancy;
pub mod responsive;
pub mod solver;

pub use collision::{CollisionQuery, CollisionStats};
pub use coords::GridMetrics;
pub use item::{GridItem, ItemId, ItemStyle, ShapeClass, Transition};
pub use occupancy::{OccupancyGrid, Slot};
pub use responsive::{ContainerGeometry, apply_dimensions, measure};
pub use solver::{BusyFlag, LayoutSolver, Placement, SolveOutcome, SolveReport, SolveRequest};
