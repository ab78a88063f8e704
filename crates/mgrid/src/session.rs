#![forbid(unsafe_code)]

//! Drag session controller.
//!
//! [`MasonryGrid`] owns everything one grid needs between calls: metrics,
//! the layout solver, the current gesture, the three deferred slots and the
//! caller hooks. Items stay with the caller and are lent to every call.
//!
//! # State machine
//!
//! ```text
//!          begin_drag            move > threshold
//!   Idle ────────────▶ Armed ─────────────────────▶ Dragging
//!    ▲                   │ arm deadline / release      │        │
//!    │                   ▼                             │ release│ cancel / release
//!    │               Cancelled ◀───────────────────────┼────────┘  without ghost
//!    │                   │                             ▼
//!    └───── tick ────────┴──────── settle ──────── Committed
//! ```
//!
//! # Invariants
//!
//! 1. At most one item has `is_dragging` set, and only while `Dragging`.
//! 2. `on_drag_start` fires exactly once per gesture that reaches `Dragging`.
//! 3. Moves within one debounce window coalesce into a single pass that
//!    sees the latest ghost.
//! 4. Ending, cancelling or resetting a gesture cancels the debounce slot,
//!    so no stale pass runs after a release.
//! 5. Every gesture reaches `Committed` or `Cancelled`, whatever the hooks
//!    do.
//!
//! # Failure Modes
//!
//! | Condition | Behavior |
//! |-----------|----------|
//! | `begin_drag` while a gesture is live | `Err(InvalidPhase)`, state unchanged |
//! | Unknown item id | `Err(UnknownItem)`, state unchanged |
//! | Non-finite pointer | `Err(Geometry)`, event ignored |
//! | Hook error or panic | logged, listed in [`HookReport`], transition completes |
//! | Solve while busy | pass dropped, gesture continues |

use std::fmt;

use mgrid_core::config::GridConfig;
use mgrid_core::deferred::DeferredSlot;
use mgrid_core::geometry::{CellRegion, PixelPoint};
use mgrid_core::pointer::PointerEvent;
use mgrid_layout::{
    CollisionStats, ContainerGeometry, GridItem, GridMetrics, ItemId, LayoutSolver, SolveOutcome,
    SolveRequest, Transition, apply_dimensions, measure,
};
use mgrid_core::Instant;

use crate::error::{Error, GeometryError, Result};
use crate::hooks::{self, DragHooks, HookReport, NoHooks};

/// Phase of the current gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    /// Pointer is down; waiting for movement past the threshold.
    Armed,
    Dragging,
    /// Dropped on a ghost; transition hints clear when the settle slot fires.
    Committed,
    Cancelled,
}

impl DragPhase {
    /// `Committed` or `Cancelled`.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Committed | Self::Cancelled)
    }

    /// A gesture is in progress.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Armed | Self::Dragging)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Armed => "armed",
            Self::Dragging => "dragging",
            Self::Committed => "committed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for DragPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What one session call did.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StepReport {
    /// Phase after the call.
    pub phase: DragPhase,
    pub hooks: HookReport,
    /// Layout pass run by the call, if any.
    pub solve: Option<SolveOutcome>,
}

impl StepReport {
    fn quiet(phase: DragPhase) -> Self {
        Self {
            phase,
            ..Self::default()
        }
    }

    /// Capacity error of the pass run by this call.
    #[must_use]
    pub fn capacity_error(&self) -> Option<Error> {
        self.solve
            .as_ref()
            .and_then(SolveOutcome::report)
            .and_then(Error::capacity)
    }
}

/// Counters over the lifetime of a session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Completed layout passes.
    pub passes: u64,
    /// Passes dropped by the busy guard.
    pub dropped: u64,
    pub gestures: u64,
    pub commits: u64,
    pub cancels: u64,
    pub collision: CollisionStats,
}

#[derive(Debug, Clone, Copy)]
struct Gesture {
    item: ItemId,
    start: PixelPoint,
    grab_offset: PixelPoint,
    passes_at_start: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Timer {
    Arm,
    Debounce,
    Settle,
}

/// One draggable masonry grid.
#[derive(Debug)]
pub struct MasonryGrid<H = NoHooks> {
    config: GridConfig,
    metrics: GridMetrics,
    container: ContainerGeometry,
    solver: LayoutSolver,
    hooks: H,
    phase: DragPhase,
    gesture: Option<Gesture>,
    ghost: Option<CellRegion>,
    displaced: Option<ItemId>,
    settling: Option<ItemId>,
    arm: DeferredSlot,
    debounce: DeferredSlot,
    settle: DeferredSlot,
    dropped: u64,
    gestures: u64,
    commits: u64,
    cancels: u64,
}

impl MasonryGrid<NoHooks> {
    /// Create a grid without hooks.
    pub fn new(config: GridConfig) -> Result<Self> {
        Self::with_hooks(config, NoHooks)
    }
}

impl<H: DragHooks> MasonryGrid<H> {
    /// Create a grid with caller hooks. Fails on an invalid configuration.
    pub fn with_hooks(config: GridConfig, hooks: H) -> Result<Self> {
        config.validate()?;
        let metrics = GridMetrics::unmeasured(config.gutter, config.columns.columns_for(0.0));
        Ok(Self {
            solver: LayoutSolver::new(&config),
            metrics,
            config,
            container: ContainerGeometry::default(),
            hooks,
            phase: DragPhase::Idle,
            gesture: None,
            ghost: None,
            displaced: None,
            settling: None,
            arm: DeferredSlot::new(),
            debounce: DeferredSlot::new(),
            settle: DeferredSlot::new(),
            dropped: 0,
            gestures: 0,
            commits: 0,
            cancels: 0,
        })
    }

    // ── Layout ───────────────────────────────────────────────────────────

    /// Measure the container, resize every item to its shape and run a
    /// forced full pass.
    ///
    /// A zero-width or non-finite container is simply not ready yet. A
    /// container too narrow to hold the columns is an error.
    pub fn compute_responsive_layout(
        &mut self,
        items: &mut [GridItem],
        container: ContainerGeometry,
    ) -> Result<SolveOutcome> {
        self.container = container;
        let Some(metrics) = measure(&self.config, container.width) else {
            self.metrics = GridMetrics::unmeasured(
                self.config.gutter,
                self.config.columns.columns_for(container.width.max(0.0)),
            );
            if container.width.is_finite() && container.width > 0.0 {
                return Err(GeometryError::InvalidContainer {
                    width: container.width,
                }
                .into());
            }
            tracing::debug!(target: "mgrid.layout", width = container.width, "container unmeasured");
            return Ok(SolveOutcome::NotReady);
        };

        if metrics.num_columns != self.metrics.num_columns {
            tracing::debug!(
                target: "mgrid.layout",
                from = self.metrics.num_columns,
                to = metrics.num_columns,
                "column count changed"
            );
        }
        self.metrics = metrics;
        apply_dimensions(items, &metrics);

        let request = SolveRequest {
            ghost: self.ghost.filter(|_| self.phase == DragPhase::Dragging),
            displaced: self.displaced,
            ..SolveRequest::full()
        };
        Ok(self.run_pass(items, &request))
    }

    fn run_pass(&mut self, items: &mut [GridItem], request: &SolveRequest) -> SolveOutcome {
        let outcome = self.solver.solve(items, &self.metrics, request);
        if outcome == SolveOutcome::Dropped {
            self.dropped += 1;
        }
        outcome
    }

    // ── Gesture ──────────────────────────────────────────────────────────

    /// Pointer-down on `id`: arm a gesture.
    ///
    /// Allowed from `Idle` and from a terminal phase; a pending settle is
    /// finished first.
    pub fn begin_drag(
        &mut self,
        items: &mut [GridItem],
        id: ItemId,
        event: &PointerEvent,
        now: Instant,
    ) -> Result<DragPhase> {
        if self.phase.is_live() {
            return Err(Error::InvalidPhase {
                operation: "begin_drag",
                phase: self.phase,
            });
        }
        if !event.is_finite() {
            return Err(GeometryError::NonFinitePointer {
                x: event.x,
                y: event.y,
            }
            .into());
        }
        if !self.metrics.is_ready() {
            return Err(GeometryError::Unmeasured.into());
        }
        let idx = index_of(items, id).ok_or(Error::UnknownItem(id))?;

        self.finish_settle(items);
        let grab_offset = match event.target {
            Some(_) => event.grab_offset(),
            None => {
                let local = self.container.to_local(event.position());
                local.offset_from(items[idx].style.position())
            }
        };
        self.gesture = Some(Gesture {
            item: id,
            start: event.position(),
            grab_offset,
            passes_at_start: self.solver.passes(),
        });
        self.ghost = None;
        self.displaced = None;
        self.arm.schedule(now, self.config.drag.arm_delay());
        self.phase = DragPhase::Armed;
        self.gestures += 1;
        tracing::debug!(target: "mgrid.drag", item = %id, "gesture armed");
        Ok(self.phase)
    }

    /// Pointer-move.
    ///
    /// While armed, promotes the gesture once the pointer has moved farther
    /// than the threshold. While dragging, moves the item, recomputes the
    /// ghost and re-arms the debounce slot.
    pub fn update_drag(
        &mut self,
        items: &mut [GridItem],
        event: &PointerEvent,
        now: Instant,
    ) -> Result<StepReport> {
        if !self.phase.is_live() {
            return Err(Error::InvalidPhase {
                operation: "update_drag",
                phase: self.phase,
            });
        }
        if !event.is_finite() {
            return Err(GeometryError::NonFinitePointer {
                x: event.x,
                y: event.y,
            }
            .into());
        }
        let Some(gesture) = self.gesture else {
            return Ok(self.abandon(items));
        };
        let Some(idx) = index_of(items, gesture.item) else {
            tracing::warn!(target: "mgrid.drag", item = %gesture.item, "dragged item vanished");
            return Ok(self.abandon(items));
        };

        let mut report = StepReport::default();
        if self.phase == DragPhase::Armed {
            if self.arm.take_due(now).is_some() {
                return Ok(self.cancel_armed());
            }
            if event.position().distance(gesture.start) <= self.config.drag.threshold_px {
                return Ok(StepReport::quiet(self.phase));
            }
            self.arm.cancel();
            self.promote(items, idx, &mut report.hooks);
        }

        self.track_move(items, idx, &gesture, event, now, &mut report.hooks);
        report.phase = self.phase;
        Ok(report)
    }

    fn promote(&mut self, items: &mut [GridItem], idx: usize, report: &mut HookReport) {
        let item = &mut items[idx];
        item.is_dragging = true;
        item.style.raised = true;
        item.style.transition = Transition::None;
        self.phase = DragPhase::Dragging;
        tracing::debug!(target: "mgrid.drag", item = %item.id(), "drag started");

        let callbacks = &mut self.hooks;
        let item = &items[idx];
        hooks::invoke(report, "on_drag_start", || callbacks.on_drag_start(item));
    }

    fn track_move(
        &mut self,
        items: &mut [GridItem],
        idx: usize,
        gesture: &Gesture,
        event: &PointerEvent,
        now: Instant,
        report: &mut HookReport,
    ) {
        let local = self.container.to_local(event.position());
        let top_left = local.offset_from(gesture.grab_offset);
        items[idx].style.move_to(top_left);

        let half = self.metrics.pitch() / 2.0;
        let span = items[idx].span();
        if let Some(ghost) = self
            .metrics
            .pixel_to_cell(top_left.x + half, top_left.y + half, span)
        {
            let ghost = self.solver.admit(ghost);
            let dragged = items[idx].clone();
            self.displaced =
                self.solver
                    .item_at(items, &self.metrics, ghost.anchor(), Some(&dragged));
            if self.ghost != Some(ghost) {
                tracing::trace!(
                    target: "mgrid.drag",
                    col = ghost.col,
                    row = ghost.row,
                    displaced = ?self.displaced,
                    "ghost moved"
                );
            }
            self.ghost = Some(ghost);
            self.debounce.schedule(now, self.config.drag.debounce());
        }

        let callbacks = &mut self.hooks;
        let item = &items[idx];
        hooks::invoke(report, "on_drag", || callbacks.on_drag(item, event));
    }

    /// Pointer-up.
    ///
    /// Dragging with a ghost commits: the item snaps to the ghost, is pinned
    /// there and a final pass settles the rest around it. Without a ghost,
    /// or while still armed, the gesture is cancelled.
    pub fn end_drag(&mut self, items: &mut [GridItem], now: Instant) -> StepReport {
        match self.phase {
            DragPhase::Idle | DragPhase::Committed | DragPhase::Cancelled => {
                StepReport::quiet(self.phase)
            }
            DragPhase::Armed => {
                self.arm.cancel();
                self.cancel_armed()
            }
            DragPhase::Dragging => {
                self.debounce.cancel();
                let target = self
                    .gesture
                    .and_then(|gesture| index_of(items, gesture.item))
                    .zip(self.ghost);
                match target {
                    Some((idx, ghost)) => self.commit(items, idx, ghost, now),
                    None => self.cancel_dragging(items),
                }
            }
        }
    }

    fn commit(
        &mut self,
        items: &mut [GridItem],
        idx: usize,
        ghost: CellRegion,
        now: Instant,
    ) -> StepReport {
        let id = items[idx].id();
        let anchor = ghost.anchor();
        {
            let item = &mut items[idx];
            item.is_dragging = false;
            item.style
                .move_to(self.metrics.cell_to_pixel(anchor.col, anchor.row));
        }
        self.solver.commit_position(id, anchor);
        self.ghost = None;
        self.displaced = None;
        self.gesture = None;

        let outcome = self.run_pass(items, &SolveRequest::pinned(id));
        if outcome == SolveOutcome::Dropped {
            tracing::warn!(target: "mgrid.drag", item = %id, "commit pass dropped; item kept at drop cell");
        }

        let item = &mut items[idx];
        item.style.transition = Transition::Animated;
        item.style.raised = true;
        self.settling = Some(id);
        self.settle.schedule(now, self.config.drag.settle());
        self.phase = DragPhase::Committed;
        self.commits += 1;
        tracing::debug!(
            target: "mgrid.drag",
            item = %id,
            col = anchor.col,
            row = anchor.row,
            "drag committed"
        );

        let mut report = StepReport {
            phase: self.phase,
            solve: Some(outcome),
            ..StepReport::default()
        };
        let callbacks = &mut self.hooks;
        let item = &items[idx];
        hooks::invoke(&mut report.hooks, "on_drag_end", || callbacks.on_drag_end(item));
        report
    }

    /// Abort the gesture.
    ///
    /// The dragged item returns to its committed cell. When mid-drag passes
    /// have already reflowed its neighbours, a pinned pass restores a
    /// non-overlapping layout; otherwise the layout is left alone.
    pub fn cancel_drag(&mut self, items: &mut [GridItem]) -> StepReport {
        match self.phase {
            DragPhase::Armed => {
                self.arm.cancel();
                self.cancel_armed()
            }
            DragPhase::Dragging => {
                self.debounce.cancel();
                self.cancel_dragging(items)
            }
            DragPhase::Idle | DragPhase::Committed | DragPhase::Cancelled => {
                StepReport::quiet(self.phase)
            }
        }
    }

    fn cancel_armed(&mut self) -> StepReport {
        if let Some(gesture) = self.gesture.take() {
            tracing::debug!(target: "mgrid.drag", item = %gesture.item, "gesture released as tap");
        }
        self.phase = DragPhase::Cancelled;
        self.cancels += 1;
        StepReport::quiet(self.phase)
    }

    fn cancel_dragging(&mut self, items: &mut [GridItem]) -> StepReport {
        self.ghost = None;
        self.displaced = None;
        let mut report = StepReport::default();
        if let Some(gesture) = self.gesture.take()
            && let Some(idx) = index_of(items, gesture.item)
        {
            let item = &mut items[idx];
            item.is_dragging = false;
            item.style.raised = false;
            if let Some(cell) = self.solver.previous_position(gesture.item) {
                item.style
                    .move_to(self.metrics.cell_to_pixel(cell.col, cell.row));
                item.style.transition = Transition::Animated;
                if self.solver.passes() > gesture.passes_at_start {
                    report.solve = Some(self.run_pass(items, &SolveRequest::pinned(gesture.item)));
                }
            }
            tracing::debug!(target: "mgrid.drag", item = %gesture.item, "drag cancelled");
        }
        self.phase = DragPhase::Cancelled;
        self.cancels += 1;
        report.phase = self.phase;
        report
    }

    fn abandon(&mut self, items: &mut [GridItem]) -> StepReport {
        self.arm.cancel();
        self.debounce.cancel();
        if self.phase == DragPhase::Dragging {
            return self.cancel_dragging(items);
        }
        self.cancel_armed()
    }

    /// Force the session back to `Idle` from any phase.
    ///
    /// Cancels every slot and clears dragging flags and transition hints.
    /// A dragged item returns to its committed cell. When mid-drag passes
    /// have already reflowed its neighbours, a pinned pass restores a
    /// non-overlapping layout; otherwise no pass runs.
    pub fn reset(&mut self, items: &mut [GridItem]) {
        self.arm.cancel();
        self.debounce.cancel();
        self.settle.cancel();
        let restore = self
            .gesture
            .take()
            .filter(|gesture| self.solver.passes() > gesture.passes_at_start)
            .map(|gesture| gesture.item);
        for item in items.iter_mut().filter(|item| item.is_dragging) {
            item.is_dragging = false;
            item.style.raised = false;
            if let Some(cell) = self.solver.previous_position(item.id()) {
                item.style
                    .move_to(self.metrics.cell_to_pixel(cell.col, cell.row));
            }
        }
        if let Some(id) = self.settling.take()
            && let Some(idx) = index_of(items, id)
        {
            items[idx].style.transition = Transition::None;
            items[idx].style.raised = false;
        }
        self.ghost = None;
        self.displaced = None;
        if let Some(id) = restore
            && self.solver.previous_position(id).is_some()
        {
            self.run_pass(items, &SolveRequest::pinned(id));
        }
        self.phase = DragPhase::Idle;
        tracing::debug!(target: "mgrid.drag", restored = restore.is_some(), "session reset");
    }

    // ── Scheduler ────────────────────────────────────────────────────────

    /// Fire every slot due at `now`, earliest deadline first.
    ///
    /// A terminal phase with nothing left pending returns to `Idle`.
    pub fn tick(&mut self, items: &mut [GridItem], now: Instant) -> StepReport {
        let mut due: Vec<(Instant, Timer)> = [
            (self.arm.deadline(), Timer::Arm),
            (self.debounce.deadline(), Timer::Debounce),
            (self.settle.deadline(), Timer::Settle),
        ]
        .into_iter()
        .filter_map(|(deadline, timer)| deadline.filter(|d| *d <= now).map(|d| (d, timer)))
        .collect();
        due.sort_by_key(|(deadline, _)| *deadline);

        let mut report = StepReport::default();
        for (_, timer) in due {
            match timer {
                Timer::Arm => {
                    if self.arm.take_due(now).is_some() && self.phase == DragPhase::Armed {
                        report.merge(self.cancel_armed());
                    }
                }
                Timer::Debounce => {
                    if self.debounce.take_due(now).is_some()
                        && self.phase == DragPhase::Dragging
                        && let Some(ghost) = self.ghost
                    {
                        let request = SolveRequest::drag(ghost, self.displaced);
                        report.solve = Some(self.run_pass(items, &request));
                    }
                }
                Timer::Settle => {
                    if self.settle.take_due(now).is_some() {
                        self.finish_settle(items);
                    }
                }
            }
        }

        if self.phase.is_terminal() && !self.settle.is_pending() {
            self.phase = DragPhase::Idle;
        }
        report.phase = self.phase;
        report
    }

    /// Earliest pending deadline, for hosts that sleep between ticks.
    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.arm.deadline(),
            self.debounce.deadline(),
            self.settle.deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    fn finish_settle(&mut self, items: &mut [GridItem]) {
        self.settle.cancel();
        if let Some(id) = self.settling.take()
            && let Some(idx) = index_of(items, id)
        {
            let item = &mut items[idx];
            item.style.transition = Transition::None;
            item.style.raised = false;
            tracing::debug!(target: "mgrid.drag", item = %id, "drop settled");
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    #[must_use]
    pub const fn num_columns(&self) -> u16 {
        self.metrics.num_columns
    }

    /// Cell edge in pixels; zero until measured.
    #[must_use]
    pub const fn cell_size(&self) -> f64 {
        self.metrics.cell_size
    }

    /// Container height required by the last pass.
    #[must_use]
    pub const fn grid_height(&self) -> f64 {
        self.solver.grid_height()
    }

    #[must_use]
    pub const fn ghost_position(&self) -> Option<CellRegion> {
        self.ghost
    }

    /// Item under the drag target, as of the last move.
    #[must_use]
    pub const fn displaced(&self) -> Option<ItemId> {
        self.displaced
    }

    #[must_use]
    pub const fn phase(&self) -> DragPhase {
        self.phase
    }

    /// Item of the live gesture.
    #[must_use]
    pub fn active_item(&self) -> Option<ItemId> {
        self.gesture.map(|gesture| gesture.item)
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            passes: self.solver.passes(),
            dropped: self.dropped,
            gestures: self.gestures,
            commits: self.commits,
            cancels: self.cancels,
            collision: self.solver.collision().stats(),
        }
    }

    #[must_use]
    pub const fn metrics(&self) -> &GridMetrics {
        &self.metrics
    }

    #[must_use]
    pub const fn config(&self) -> &GridConfig {
        &self.config
    }

    #[must_use]
    pub const fn solver(&self) -> &LayoutSolver {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut LayoutSolver {
        &mut self.solver
    }

    #[must_use]
    pub const fn hooks(&self) -> &H {
        &self.hooks
    }

    pub fn hooks_mut(&mut self) -> &mut H {
        &mut self.hooks
    }
}

impl StepReport {
    fn merge(&mut self, other: StepReport) {
        self.hooks.merge(other.hooks);
        if other.solve.is_some() {
            self.solve = other.solve;
        }
    }
}

fn index_of(items: &[GridItem], id: ItemId) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}
