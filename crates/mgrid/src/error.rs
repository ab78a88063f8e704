#![forbid(unsafe_code)]

//! Error model and graceful degradation.
//!
//! # Design Principles
//!
//! 1. **Fail soft on geometry**: mapping and query operations return
//!    `Option`/`false`/empty. Only session entry points return [`Error`].
//! 2. **Domain-specific errors**: hook failures and geometry problems carry
//!    their own typed errors so callers can match on what matters.
//! 3. **Graceful degradation**: every variant maps to a
//!    [`DegradationAction`]. The worst outcome of any fault is a layout that
//!    does not reflow; a gesture always reaches a terminal phase.

use std::fmt;

use mgrid_core::config::ConfigError;
use mgrid_layout::{ItemId, SolveReport};

use crate::session::DragPhase;

// ── Domain-Specific Error Types ─────────────────────────────────────────

/// Geometry that the engine cannot work with yet.
#[derive(Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// The container has not been measured, so the cell size is unknown.
    Unmeasured,
    /// A pointer coordinate is NaN or infinite.
    NonFinitePointer { x: f64, y: f64 },
    /// The container is too narrow to fit one pixel per column.
    InvalidContainer { width: f64 },
}

/// A caller hook failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HookError {
    /// The hook returned an error.
    Failed { hook: &'static str, message: String },
    /// The hook panicked; the panic was caught.
    Panicked { hook: &'static str, message: String },
}

impl HookError {
    /// Convenience constructor for hook implementations.
    #[must_use]
    pub fn failed(hook: &'static str, message: impl Into<String>) -> Self {
        Self::Failed {
            hook,
            message: message.into(),
        }
    }

    /// Name of the hook that failed.
    #[must_use]
    pub const fn hook(&self) -> &'static str {
        match self {
            Self::Failed { hook, .. } | Self::Panicked { hook, .. } => hook,
        }
    }
}

// ── Unified Error ───────────────────────────────────────────────────────

/// Top-level error type of the mgrid facade.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    Geometry(GeometryError),
    /// Items found no free footprint within the row budget.
    Capacity { unplaced: Vec<ItemId>, row_budget: u16 },
    Hook(HookError),
    /// No item with this id is in the slice.
    UnknownItem(ItemId),
    /// The operation is not valid in the current phase.
    InvalidPhase {
        operation: &'static str,
        phase: DragPhase,
    },
    Config(ConfigError),
}

/// Standard result type for mgrid APIs.
pub type Result<T> = std::result::Result<T, Error>;

// ── Graceful Degradation ────────────────────────────────────────────────

/// What the host should do when an error occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradationAction {
    /// Keep the current layout; do not reflow.
    KeepLayout,
    /// Discard the request; session state is unchanged.
    DropRequest,
    /// Ignore the pointer event and wait for the next one.
    IgnoreInput,
    /// Let the gesture run to its terminal phase regardless.
    FinishGesture,
}

impl Error {
    /// Capacity error for a pass that left items unplaced.
    #[must_use]
    pub fn capacity(report: &SolveReport) -> Option<Self> {
        (!report.unplaced.is_empty()).then(|| Self::Capacity {
            unplaced: report.unplaced.clone(),
            row_budget: report.row_budget,
        })
    }

    /// Determine the graceful degradation action for this error.
    #[must_use]
    pub fn degradation(&self) -> DegradationAction {
        match self {
            Self::Geometry(GeometryError::NonFinitePointer { .. }) => {
                DegradationAction::IgnoreInput
            }
            Self::Geometry(GeometryError::Unmeasured | GeometryError::InvalidContainer { .. }) => {
                DegradationAction::KeepLayout
            }
            Self::Capacity { .. } => DegradationAction::KeepLayout,
            Self::Hook(_) => DegradationAction::FinishGesture,
            Self::UnknownItem(_) | Self::InvalidPhase { .. } => DegradationAction::DropRequest,
            Self::Config(_) => DegradationAction::KeepLayout,
        }
    }

    /// Error type label for tracing fields.
    #[must_use]
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Geometry(_) => "geometry",
            Self::Capacity { .. } => "capacity",
            Self::Hook(_) => "hook",
            Self::UnknownItem(_) => "unknown_item",
            Self::InvalidPhase { .. } => "invalid_phase",
            Self::Config(_) => "config",
        }
    }
}

// ── Display ─────────────────────────────────────────────────────────────

impl fmt::Display for GeometryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unmeasured => write!(f, "grid container has not been measured"),
            Self::NonFinitePointer { x, y } => write!(f, "non-finite pointer position ({x}, {y})"),
            Self::InvalidContainer { width } => {
                write!(f, "container width {width} cannot fit the grid")
            }
        }
    }
}

impl fmt::Display for HookError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { hook, message } => write!(f, "hook '{hook}' failed: {message}"),
            Self::Panicked { hook, message } => write!(f, "hook '{hook}' panicked: {message}"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Geometry(err) => write!(f, "{err}"),
            Self::Capacity {
                unplaced,
                row_budget,
            } => write!(
                f,
                "{} item(s) found no space within {row_budget} rows",
                unplaced.len()
            ),
            Self::Hook(err) => write!(f, "{err}"),
            Self::UnknownItem(id) => write!(f, "unknown item {id}"),
            Self::InvalidPhase { operation, phase } => {
                write!(f, "{operation} is not valid while {phase}")
            }
            Self::Config(err) => write!(f, "{err}"),
        }
    }
}

// ── std::error::Error ───────────────────────────────────────────────────

impl std::error::Error for GeometryError {}
impl std::error::Error for HookError {}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Geometry(err) => Some(err),
            Self::Hook(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Capacity { .. } | Self::UnknownItem(_) | Self::InvalidPhase { .. } => None,
        }
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<GeometryError> for Error {
    fn from(err: GeometryError) -> Self {
        Self::Geometry(err)
    }
}

impl From<HookError> for Error {
    fn from(err: HookError) -> Self {
        Self::Hook(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}
