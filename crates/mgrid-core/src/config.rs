#![forbid(unsafe_code)]

//! Engine configuration.
//!
//! [`GridConfig`] captures every tunable of the grid: spacing, column policy,
//! row budget, overflow handling and the drag timing parameters. All fields
//! have defaults, so partial documents deserialize cleanly.
//!
//! # Loading
//!
//! ```toml
//! # mgrid.toml
//! gutter = 12.0
//! max_rows = 200
//!
//! [columns]
//! kind = "fixed"
//! columns = 5
//!
//! [drag]
//! threshold_px = 6.0
//! debounce_ms = 30
//! ```
//!
//! ```rust,ignore
//! let config = GridConfig::from_toml_str(text)?;
//! let config = GridConfig::from_json_str(json)?;
//! ```
//!
//! The loaders require the `config-files` feature.

use std::fmt;

use serde::{Deserialize, Serialize};
use web_time::Duration;

/// Default spacing between cells, in pixels.
pub const DEFAULT_GUTTER: f64 = 16.0;

/// Default column count.
pub const DEFAULT_COLUMNS: u16 = 4;

/// Default row budget of the occupancy matrix.
pub const DEFAULT_MAX_ROWS: u16 = 100;

/// Default ceiling for [`OverflowPolicy::Grow`].
pub const DEFAULT_HARD_ROW_LIMIT: u16 = 1600;

// ---------------------------------------------------------------------------
// Column policy
// ---------------------------------------------------------------------------

/// One responsive column rule: containers at least `min_width` wide use
/// `columns` columns.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColumnBreakpoint {
    pub min_width: f64,
    pub columns: u16,
}

/// How the column count is derived from the container width.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnPolicy {
    /// Always the same number of columns.
    Fixed { columns: u16 },
    /// The widest rule whose `min_width` fits the container wins. Containers
    /// narrower than every rule use the narrowest rule.
    Breakpoints { rules: Vec<ColumnBreakpoint> },
}

impl Default for ColumnPolicy {
    fn default() -> Self {
        Self::Fixed {
            columns: DEFAULT_COLUMNS,
        }
    }
}

impl ColumnPolicy {
    /// Column count for a container of the given width. Never zero.
    #[must_use]
    pub fn columns_for(&self, container_width: f64) -> u16 {
        let columns = match self {
            Self::Fixed { columns } => *columns,
            Self::Breakpoints { rules } => {
                let fitting = rules
                    .iter()
                    .filter(|rule| rule.min_width <= container_width)
                    .max_by(|a, b| a.min_width.total_cmp(&b.min_width));
                let fallback = || {
                    rules
                        .iter()
                        .min_by(|a, b| a.min_width.total_cmp(&b.min_width))
                };
                fitting.or_else(fallback).map_or(1, |rule| rule.columns)
            }
        };
        columns.max(1)
    }
}

// ---------------------------------------------------------------------------
// Overflow policy
// ---------------------------------------------------------------------------

/// What the solver does when an item finds no free footprint within the row
/// budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverflowPolicy {
    /// Leave the item at its last known position and report it as unplaced.
    #[default]
    Report,
    /// Double the row budget (up to `hard_row_limit`) and retry before
    /// falling back to `Report`.
    Grow,
}

// ---------------------------------------------------------------------------
// Drag configuration
// ---------------------------------------------------------------------------

/// Timing and threshold parameters of a drag gesture.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DragConfig {
    /// Window during which movement must exceed the threshold for the
    /// gesture to become a drag (default: 150ms).
    pub arm_delay_ms: u64,
    /// Euclidean pointer distance that promotes an armed gesture to a drag
    /// (default: 5px).
    pub threshold_px: f64,
    /// Quiet period before a mid-drag layout pass runs (default: 25ms).
    pub debounce_ms: u64,
    /// Delay after a drop before transition hints are cleared
    /// (default: 250ms).
    pub settle_ms: u64,
}

impl Default for DragConfig {
    fn default() -> Self {
        Self {
            arm_delay_ms: 150,
            threshold_px: 5.0,
            debounce_ms: 25,
            settle_ms: 250,
        }
    }
}

impl DragConfig {
    /// Arm delay as a duration.
    #[inline]
    #[must_use]
    pub fn arm_delay(&self) -> Duration {
        Duration::from_millis(self.arm_delay_ms)
    }

    /// Debounce window as a duration.
    #[inline]
    #[must_use]
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Settle delay as a duration.
    #[inline]
    #[must_use]
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

// ---------------------------------------------------------------------------
// GridConfig
// ---------------------------------------------------------------------------

/// Top-level configuration of one masonry grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Spacing between cells in pixels.
    pub gutter: f64,
    /// Column policy.
    pub columns: ColumnPolicy,
    /// Rows in the occupancy matrix.
    pub max_rows: u16,
    /// Capacity exhaustion handling.
    pub overflow: OverflowPolicy,
    /// Upper bound on rows when `overflow` is `Grow`.
    pub hard_row_limit: u16,
    /// Moves at or below this distance (per axis) are not animated.
    pub move_epsilon_px: f64,
    /// Drag gesture parameters.
    pub drag: DragConfig,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            gutter: DEFAULT_GUTTER,
            columns: ColumnPolicy::default(),
            max_rows: DEFAULT_MAX_ROWS,
            overflow: OverflowPolicy::default(),
            hard_row_limit: DEFAULT_HARD_ROW_LIMIT,
            move_epsilon_px: 1.0,
            drag: DragConfig::default(),
        }
    }
}

impl GridConfig {
    /// Builder: fixed column count.
    #[must_use]
    pub fn with_columns(mut self, columns: u16) -> Self {
        self.columns = ColumnPolicy::Fixed { columns };
        self
    }

    /// Builder: gutter in pixels.
    #[must_use]
    pub fn with_gutter(mut self, gutter: f64) -> Self {
        self.gutter = gutter;
        self
    }

    /// Builder: row budget.
    #[must_use]
    pub fn with_max_rows(mut self, max_rows: u16) -> Self {
        self.max_rows = max_rows;
        self
    }

    /// Builder: overflow policy.
    #[must_use]
    pub fn with_overflow(mut self, overflow: OverflowPolicy) -> Self {
        self.overflow = overflow;
        self
    }

    /// Builder: drag parameters.
    #[must_use]
    pub fn with_drag(mut self, drag: DragConfig) -> Self {
        self.drag = drag;
        self
    }

    /// Check the configuration for values the engine cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.gutter.is_finite() || self.gutter < 0.0 {
            return Err(ConfigError::InvalidGutter(self.gutter));
        }
        match &self.columns {
            ColumnPolicy::Fixed { columns: 0 } => return Err(ConfigError::ZeroColumns),
            ColumnPolicy::Breakpoints { rules } => {
                if rules.is_empty() || rules.iter().any(|rule| rule.columns == 0) {
                    return Err(ConfigError::ZeroColumns);
                }
            }
            ColumnPolicy::Fixed { .. } => {}
        }
        if self.max_rows == 0 {
            return Err(ConfigError::ZeroRows);
        }
        if self.hard_row_limit < self.max_rows {
            return Err(ConfigError::RowLimitBelowBudget {
                max_rows: self.max_rows,
                hard_row_limit: self.hard_row_limit,
            });
        }
        if !self.drag.threshold_px.is_finite() || self.drag.threshold_px < 0.0 {
            return Err(ConfigError::InvalidThreshold(self.drag.threshold_px));
        }
        Ok(())
    }

    /// Parse and validate a TOML document.
    #[cfg(feature = "config-files")]
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a JSON document.
    #[cfg(feature = "config-files")]
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(text).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Invalid configuration.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A column policy yields zero columns.
    ZeroColumns,
    /// `max_rows` is zero.
    ZeroRows,
    /// `hard_row_limit` is smaller than `max_rows`.
    RowLimitBelowBudget { max_rows: u16, hard_row_limit: u16 },
    /// Gutter is negative or not a number.
    InvalidGutter(f64),
    /// Drag threshold is negative or not a number.
    InvalidThreshold(f64),
    /// The document could not be parsed.
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroColumns => write!(f, "column policy must yield at least one column"),
            Self::ZeroRows => write!(f, "max_rows must be at least 1"),
            Self::RowLimitBelowBudget {
                max_rows,
                hard_row_limit,
            } => write!(
                f,
                "hard_row_limit ({hard_row_limit}) is below max_rows ({max_rows})"
            ),
            Self::InvalidGutter(gutter) => write!(f, "invalid gutter: {gutter}"),
            Self::InvalidThreshold(threshold) => write!(f, "invalid drag threshold: {threshold}"),
            Self::Parse(msg) => write!(f, "config parse error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GridConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.columns.columns_for(1200.0), 4);
        assert_eq!(config.drag.arm_delay(), Duration::from_millis(150));
        assert_eq!(config.drag.debounce(), Duration::from_millis(25));
    }

    #[test]
    fn breakpoints_pick_widest_fitting_rule() {
        let policy = ColumnPolicy::Breakpoints {
            rules: vec![
                ColumnBreakpoint {
                    min_width: 900.0,
                    columns: 4,
                },
                ColumnBreakpoint {
                    min_width: 0.0,
                    columns: 2,
                },
                ColumnBreakpoint {
                    min_width: 600.0,
                    columns: 3,
                },
            ],
        };
        assert_eq!(policy.columns_for(320.0), 2);
        assert_eq!(policy.columns_for(600.0), 3);
        assert_eq!(policy.columns_for(1400.0), 4);
    }

    #[test]
    fn narrow_container_falls_back_to_narrowest_rule() {
        let policy = ColumnPolicy::Breakpoints {
            rules: vec![ColumnBreakpoint {
                min_width: 500.0,
                columns: 3,
            }],
        };
        assert_eq!(policy.columns_for(100.0), 3);
    }

    #[test]
    fn validate_rejects_degenerate_values() {
        assert_eq!(
            GridConfig::default().with_columns(0).validate(),
            Err(ConfigError::ZeroColumns)
        );
        assert_eq!(
            GridConfig::default().with_max_rows(0).validate(),
            Err(ConfigError::ZeroRows)
        );
        assert!(matches!(
            GridConfig::default().with_gutter(-1.0).validate(),
            Err(ConfigError::InvalidGutter(_))
        ));
        let mut config = GridConfig::default().with_max_rows(500);
        config.hard_row_limit = 200;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::RowLimitBelowBudget { .. })
        ));
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: GridConfig =
            serde_json::from_str(r#"{ "gutter": 10.0, "drag": { "debounce_ms": 40 } }"#)
                .expect("valid json");
        assert_eq!(config.gutter, 10.0);
        assert_eq!(config.drag.debounce_ms, 40);
        assert_eq!(config.drag.arm_delay_ms, 150);
        assert_eq!(config.max_rows, DEFAULT_MAX_ROWS);
    }

    #[cfg(feature = "config-files")]
    #[test]
    fn toml_loader_validates() {
        let config = GridConfig::from_toml_str(
            "gutter = 12.0\n[columns]\nkind = \"fixed\"\ncolumns = 5\n",
        )
        .expect("valid toml");
        assert_eq!(config.columns.columns_for(0.0), 5);

        let err = GridConfig::from_toml_str("max_rows = 0\n").expect_err("zero rows rejected");
        assert_eq!(err, ConfigError::ZeroRows);
    }
}
