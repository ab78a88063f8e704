//! Scenario files: a grid, its items and a timed pointer script.
//!
//! ```json
//! {
//!   "config": { "gutter": 10 },
//!   "container": { "left": 0, "top": 0, "width": 430 },
//!   "items": [{ "id": 1, "width": 100, "height": 100 }],
//!   "steps": [
//!     { "at_ms": 0, "op": "down", "item": 1, "x": 5, "y": 5 },
//!     { "at_ms": 10, "op": "move", "x": 240, "y": 5 },
//!     { "at_ms": 60, "op": "up" },
//!     { "at_ms": 400, "op": "wait" }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::path::Path;

use mgrid::{ContainerGeometry, GridConfig, GridItem};
use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub config: GridConfig,
    pub container: ContainerGeometry,
    pub items: Vec<ItemSpec>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

/// Natural size of one item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ItemSpec {
    pub id: u64,
    pub width: f64,
    pub height: f64,
}

/// One pointer action at a point in scenario time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Milliseconds since the start of the scenario.
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Action {
    /// Pointer-down on an item; coordinates are client space.
    Down { item: u64, x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Up,
    Cancel,
    /// Only advance time.
    Wait,
    /// Container resized.
    Resize { width: f64 },
}

impl Action {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Down { .. } => "down",
            Self::Move { .. } => "move",
            Self::Up => "up",
            Self::Cancel => "cancel",
            Self::Wait => "wait",
            Self::Resize { .. } => "resize",
        }
    }
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(HarnessError::MissingScenario {
                path: path.to_path_buf(),
            });
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let scenario: Self = serde_json::from_str(text)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Ids are unique, sizes positive and steps in time order.
    pub fn validate(&self) -> Result<()> {
        self.config.validate().map_err(mgrid::Error::from)?;

        let mut seen = HashSet::new();
        for spec in &self.items {
            if !seen.insert(spec.id) {
                return Err(HarnessError::invalid(format!("duplicate item id {}", spec.id)));
            }
            if !(spec.width > 0.0 && spec.height > 0.0) {
                return Err(HarnessError::invalid(format!(
                    "item {} has a non-positive size",
                    spec.id
                )));
            }
        }

        if let Some(pair) = self.steps.windows(2).find(|w| w[1].at_ms < w[0].at_ms) {
            return Err(HarnessError::invalid(format!(
                "step at {}ms follows step at {}ms",
                pair[1].at_ms, pair[0].at_ms
            )));
        }
        Ok(())
    }

    /// Fresh items in scenario order.
    #[must_use]
    pub fn build_items(&self) -> Vec<GridItem> {
        self.items
            .iter()
            .map(|spec| GridItem::new(spec.id, spec.width, spec.height))
            .collect()
    }
}
