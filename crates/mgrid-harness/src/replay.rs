//! Drive a scenario through a [`MasonryGrid`] and collect the result.
//!
//! Before each step the session is ticked to the step's time, so deferred
//! work (arm timeout, debounced passes, settle) fires exactly as it would
//! in a host that polls between input events. Engine errors on a single
//! step are recorded in that step's entry and the replay carries on.

use mgrid::{
    CellPos, CellRegion, ContainerGeometry, DragHooks, GridItem, HookError, Instant,
    ItemId, MasonryGrid, PixelRect, PointerEvent, ShapeClass, SolveOutcome, StepReport,
};
use serde::Serialize;

use crate::error::Result;
use crate::scenario::{Action, Scenario};

/// Counts hook invocations so the output shows the gesture lifecycle.
#[derive(Debug, Default, Clone, Copy, Serialize)]
pub struct HookCounts {
    pub drag_start: u32,
    pub drag: u32,
    pub drag_end: u32,
}

impl DragHooks for HookCounts {
    fn on_drag_start(&mut self, _item: &GridItem) -> std::result::Result<(), HookError> {
        self.drag_start += 1;
        Ok(())
    }

    fn on_drag(
        &mut self,
        _item: &GridItem,
        _event: &PointerEvent,
    ) -> std::result::Result<(), HookError> {
        self.drag += 1;
        Ok(())
    }

    fn on_drag_end(&mut self, _item: &GridItem) -> std::result::Result<(), HookError> {
        self.drag_end += 1;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemOutput {
    pub id: u64,
    pub shape: ShapeClass,
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub cell: Option<CellPos>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepOutput {
    pub at_ms: u64,
    pub op: &'static str,
    pub phase: &'static str,
    pub ghost: Option<CellRegion>,
    /// A layout pass completed during the tick or the action.
    pub solved: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsOutput {
    pub passes: u64,
    pub dropped: u64,
    pub gestures: u64,
    pub commits: u64,
    pub cancels: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReplayOutput {
    pub columns: u16,
    pub cell_size: f64,
    pub grid_height: f64,
    pub phase: &'static str,
    pub items: Vec<ItemOutput>,
    pub steps: Vec<StepOutput>,
    pub hooks: HookCounts,
    pub stats: StatsOutput,
}

/// Replay `scenario` from a fresh grid.
pub fn replay(scenario: &Scenario) -> Result<ReplayOutput> {
    let mut grid = MasonryGrid::with_hooks(scenario.config.clone(), HookCounts::default())?;
    let mut items = scenario.build_items();
    let mut container = scenario.container;
    let initial = grid.compute_responsive_layout(&mut items, container)?;
    tracing::debug!(
        target: "mgrid.harness",
        items = items.len(),
        columns = grid.num_columns(),
        completed = initial.is_completed(),
        "scenario loaded"
    );

    let origin = Instant::now();
    let mut steps = Vec::with_capacity(scenario.steps.len());
    for step in &scenario.steps {
        let now = origin + mgrid::Duration::from_millis(step.at_ms);
        let ticked = grid.tick(&mut items, now);
        let mut solved = completed(&ticked);

        let outcome = match &step.action {
            Action::Down { item, x, y } => {
                press(&items, container, *item, *x, *y).and_then(|event| {
                    grid.begin_drag(&mut items, ItemId(*item), &event, now)
                        .map(|_| None)
                })
            }
            Action::Move { x, y } => grid
                .update_drag(&mut items, &PointerEvent::new(*x, *y), now)
                .map(Some),
            Action::Up => Ok(Some(grid.end_drag(&mut items, now))),
            Action::Cancel => Ok(Some(grid.cancel_drag(&mut items))),
            Action::Wait => Ok(None),
            Action::Resize { width } => {
                container = ContainerGeometry::new(container.left, container.top, *width);
                grid.compute_responsive_layout(&mut items, container)
                    .map(|outcome| {
                        Some(StepReport {
                            phase: grid.phase(),
                            solve: Some(outcome),
                            ..StepReport::default()
                        })
                    })
            }
        };

        let error = match outcome {
            Ok(report) => {
                solved |= report.as_ref().is_some_and(completed);
                None
            }
            Err(err) => {
                tracing::debug!(
                    target: "mgrid.harness",
                    at_ms = step.at_ms,
                    op = step.action.name(),
                    error = %err,
                    action = ?err.degradation(),
                    "step rejected"
                );
                Some(err.to_string())
            }
        };

        steps.push(StepOutput {
            at_ms: step.at_ms,
            op: step.action.name(),
            phase: grid.phase().as_str(),
            ghost: grid.ghost_position(),
            solved,
            error,
        });
    }

    Ok(summarize(&grid, &items, steps))
}

/// Pointer-down on `id` at client `(x, y)`, targeting the item's box in
/// client space.
fn press(
    items: &[GridItem],
    container: ContainerGeometry,
    id: u64,
    x: f64,
    y: f64,
) -> mgrid::Result<PointerEvent> {
    let item = items
        .iter()
        .find(|item| item.id() == ItemId(id))
        .ok_or(mgrid::Error::UnknownItem(ItemId(id)))?;
    let style = item.style;
    Ok(PointerEvent::new(x, y).with_target(PixelRect::new(
        container.left + style.left,
        container.top + style.top,
        style.width,
        style.height,
    )))
}

fn completed(report: &StepReport) -> bool {
    report.solve.as_ref().is_some_and(SolveOutcome::is_completed)
}

fn summarize(
    grid: &MasonryGrid<HookCounts>,
    items: &[GridItem],
    steps: Vec<StepOutput>,
) -> ReplayOutput {
    let stats = grid.stats();
    ReplayOutput {
        columns: grid.num_columns(),
        cell_size: grid.cell_size(),
        grid_height: grid.grid_height(),
        phase: grid.phase().as_str(),
        items: items
            .iter()
            .map(|item| ItemOutput {
                id: item.id().0,
                shape: item.shape(),
                left: item.style.left,
                top: item.style.top,
                width: item.style.width,
                height: item.style.height,
                cell: grid.metrics().cell_of_pixel(item.style.position()),
            })
            .collect(),
        steps,
        hooks: *grid.hooks(),
        stats: StatsOutput {
            passes: stats.passes,
            dropped: stats.dropped,
            gestures: stats.gestures,
            commits: stats.commits,
            cancels: stats.cancels,
        },
    }
}

/// Phase names in step order, for quick assertions.
#[must_use]
pub fn phases(output: &ReplayOutput) -> Vec<&'static str> {
    output.steps.iter().map(|step| step.phase).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(steps: &str) -> Scenario {
        let text = format!(
            r#"{{
                "config": {{ "gutter": 10 }},
                "container": {{ "left": 0, "top": 0, "width": 430 }},
                "items": [
                    {{ "id": 1, "width": 100, "height": 100 }},
                    {{ "id": 2, "width": 100, "height": 100 }},
                    {{ "id": 3, "width": 100, "height": 100 }},
                    {{ "id": 4, "width": 100, "height": 100 }},
                    {{ "id": 5, "width": 100, "height": 100 }}
                ],
                "steps": {steps}
            }}"#
        );
        Scenario::from_json(&text).expect("valid scenario")
    }

    fn cell(output: &ReplayOutput, id: u64) -> Option<CellPos> {
        output
            .items
            .iter()
            .find(|item| item.id == id)
            .and_then(|item| item.cell)
    }

    #[test]
    fn empty_script_reports_initial_layout() {
        let output = replay(&scenario("[]")).expect("replayed");
        assert_eq!(output.columns, 4);
        assert_eq!(output.cell_size, 100.0);
        assert_eq!(cell(&output, 5), Some(CellPos::new(1, 0)));
        assert_eq!(output.grid_height, 230.0);
        assert_eq!(output.stats.passes, 1);
        assert_eq!(output.phase, "idle");
    }

    #[test]
    fn drag_and_drop_swaps_into_target() {
        // Drag item 5 (row 1, col 0) onto item 3 (row 0, col 2).
        let output = replay(&scenario(
            r#"[
                { "at_ms": 0, "op": "down", "item": 5, "x": 5, "y": 115 },
                { "at_ms": 10, "op": "move", "x": 230, "y": 10 },
                { "at_ms": 60, "op": "wait" },
                { "at_ms": 70, "op": "up" },
                { "at_ms": 400, "op": "wait" }
            ]"#,
        ))
        .expect("replayed");

        assert_eq!(
            phases(&output),
            vec!["armed", "dragging", "dragging", "committed", "idle"]
        );
        assert!(output.steps[2].solved, "debounced pass ran before the wait");
        assert_eq!(cell(&output, 5), Some(CellPos::new(0, 2)));
        assert_ne!(cell(&output, 3), Some(CellPos::new(0, 2)));
        assert_eq!(output.hooks.drag_start, 1);
        assert_eq!(output.hooks.drag_end, 1);
        assert_eq!(output.stats.commits, 1);
    }

    #[test]
    fn bad_steps_are_recorded_not_fatal() {
        let output = replay(&scenario(
            r#"[
                { "at_ms": 0, "op": "move", "x": 5, "y": 5 },
                { "at_ms": 1, "op": "down", "item": 42, "x": 5, "y": 5 },
                { "at_ms": 2, "op": "down", "item": 1, "x": 5, "y": 5 },
                { "at_ms": 3, "op": "up" }
            ]"#,
        ))
        .expect("replayed");

        assert_eq!(
            output.steps[0].error.as_deref(),
            Some("update_drag is not valid while idle")
        );
        assert_eq!(output.steps[1].error.as_deref(), Some("unknown item #42"));
        assert_eq!(phases(&output), vec!["idle", "idle", "armed", "cancelled"]);
        assert_eq!(output.hooks.drag_start, 0);
    }

    #[test]
    fn resize_repacks_items() {
        let output = replay(&scenario(
            r#"[{ "at_ms": 0, "op": "resize", "width": 210 }]"#,
        ))
        .expect("replayed");
        assert_eq!(output.columns, 4);
        assert!(output.steps[0].error.is_none());
        assert!(output.steps[0].solved);
        // (210 - 30) / 4 = 45
        assert_eq!(output.cell_size, 45.0);
        assert_eq!(cell(&output, 5), Some(CellPos::new(1, 0)));
    }
}
