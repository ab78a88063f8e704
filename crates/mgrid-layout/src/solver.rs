#![forbid(unsafe_code)]

//! Layout solver: one full placement pass over every item.
//!
//! A pass rebuilds the occupancy matrix from scratch, seeds it with the drag
//! target (or a pinned / released item), then places every remaining item in
//! three deterministic phases:
//!
//! 1. **Stay**: unforced items with a committed position keep it when every
//!    footprint cell is passable for them.
//! 2. **Displaced**: the item under the drag target is relocated first-fit.
//! 3. **Reflow**: forced items and stay failures, in slice order, relocated
//!    first-fit.
//!
//! Stay runs before the displaced item on purpose, so the displaced item
//! cannot claim a cell an unforced neighbour could have kept. A
//! displaced-first order moves more items per pass.
//!
//! The pass is planned against an immutable view of the items and applied
//! in one step, so an [`OverflowPolicy::Grow`] retry never observes half a
//! layout.
//!
//! # Invariants
//!
//! 1. After a completed pass no two distinct items share a cell.
//! 2. Identical inputs produce identical placements. Iteration order is the
//!    caller's slice order; hash maps are only ever probed.
//! 3. The committed-position map is swapped wholesale at the end of a pass.
//!    Entries of the dragging item and of unplaced items carry over.
//! 4. A drag target handed out by [`LayoutSolver::admit`] lies inside the
//!    row budget, so seeded cells are never clipped by the matrix.
//!
//! # Failure Modes
//!
//! | Condition | Outcome |
//! |-----------|---------|
//! | Grid unmeasured | [`SolveOutcome::NotReady`], nothing touched |
//! | Pass already in flight | [`SolveOutcome::Dropped`], logged at `warn` |
//! | No free footprint | item listed in [`SolveReport::unplaced`], style untouched |

use mgrid_core::config::{GridConfig, OverflowPolicy};
use mgrid_core::geometry::{CellPos, CellRegion};
use rustc_hash::FxHashMap;

use crate::collision::CollisionQuery;
use crate::coords::GridMetrics;
use crate::item::{GridItem, ItemId, Transition};
use crate::occupancy::{OccupancyGrid, Slot};

// ---------------------------------------------------------------------------
// Busy guard
// ---------------------------------------------------------------------------

/// Marks a layout pass in flight.
#[derive(Debug, Default)]
pub struct BusyFlag {
    busy: bool,
}

impl BusyFlag {
    /// Claim the flag. `false` when it is already held.
    pub fn try_enter(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        true
    }

    /// Release the flag.
    pub fn exit(&mut self) {
        self.busy = false;
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.busy
    }
}

// ---------------------------------------------------------------------------
// Request / report
// ---------------------------------------------------------------------------

/// Inputs of one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SolveRequest {
    /// Drag target footprint.
    pub ghost: Option<CellRegion>,
    /// Item that was just dropped on `ghost` and must be committed there.
    pub released: Option<ItemId>,
    /// Item held at its committed position.
    pub pinned: Option<ItemId>,
    /// Item under the drag target.
    pub displaced: Option<ItemId>,
    /// Relocate every item by first-fit.
    pub force: bool,
}

impl SolveRequest {
    /// Keep everything where it is when possible.
    #[must_use]
    pub const fn refresh() -> Self {
        Self {
            ghost: None,
            released: None,
            pinned: None,
            displaced: None,
            force: false,
        }
    }

    /// Repack every item from the top.
    #[must_use]
    pub const fn full() -> Self {
        Self {
            force: true,
            ..Self::refresh()
        }
    }

    /// Mid-drag pass around a ghost.
    #[must_use]
    pub const fn drag(ghost: CellRegion, displaced: Option<ItemId>) -> Self {
        Self {
            ghost: Some(ghost),
            displaced,
            ..Self::refresh()
        }
    }

    /// Hold `id` at its committed position and reflow the rest.
    #[must_use]
    pub const fn pinned(id: ItemId) -> Self {
        Self {
            pinned: Some(id),
            ..Self::refresh()
        }
    }

    /// Commit `id` to `ghost` and reflow the rest.
    #[must_use]
    pub const fn release(id: ItemId, ghost: CellRegion) -> Self {
        Self {
            ghost: Some(ghost),
            released: Some(id),
            ..Self::refresh()
        }
    }
}

/// One item placed by a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub id: ItemId,
    pub cell: CellPos,
    /// The style moved by more than the animation epsilon.
    pub moved: bool,
}

/// Result of a completed pass.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SolveReport {
    /// Placements in slice order.
    pub placements: Vec<Placement>,
    /// Items that found no free footprint.
    pub unplaced: Vec<ItemId>,
    /// Items forced through relocation by the ghost or as the displaced item.
    pub affected: Vec<ItemId>,
    /// Released item committed by this pass.
    pub released: Option<ItemId>,
    /// Container height in pixels.
    pub grid_height: f64,
    /// One past the lowest occupied row.
    pub rows_used: u16,
    /// Matrix rows the pass ran with.
    pub row_budget: u16,
}

impl SolveReport {
    /// Number of placements whose style moved.
    #[must_use]
    pub fn moved_count(&self) -> usize {
        self.placements.iter().filter(|p| p.moved).count()
    }
}

/// How a solve request ended.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Completed(SolveReport),
    /// Another pass was in flight.
    Dropped,
    /// Cell size not established yet.
    NotReady,
}

impl SolveOutcome {
    #[must_use]
    pub fn report(&self) -> Option<&SolveReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Dropped | Self::NotReady => None,
        }
    }

    #[must_use]
    pub fn into_report(self) -> Option<SolveReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Dropped | Self::NotReady => None,
        }
    }

    #[must_use]
    pub const fn is_completed(&self) -> bool {
        matches!(self, Self::Completed(_))
    }
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

struct Plan {
    matrix: OccupancyGrid,
    placed: Vec<Option<CellPos>>,
    unplaced: Vec<usize>,
    affected: Vec<ItemId>,
    released: Option<ItemId>,
}

/// Owner of the committed positions and the last occupancy matrix.
#[derive(Debug)]
pub struct LayoutSolver {
    previous: FxHashMap<ItemId, CellPos>,
    collision: CollisionQuery,
    busy: BusyFlag,
    matrix: OccupancyGrid,
    grid_height: f64,
    passes: u64,
    row_budget: u16,
    overflow: OverflowPolicy,
    hard_row_limit: u16,
    move_epsilon: f64,
}

impl LayoutSolver {
    #[must_use]
    pub fn new(config: &GridConfig) -> Self {
        Self {
            previous: FxHashMap::default(),
            collision: CollisionQuery::new(),
            busy: BusyFlag::default(),
            matrix: OccupancyGrid::new(0, 0),
            grid_height: 0.0,
            passes: 0,
            row_budget: config.max_rows.max(1),
            overflow: config.overflow,
            hard_row_limit: config.hard_row_limit.max(config.max_rows),
            move_epsilon: config.move_epsilon_px,
        }
    }

    /// Run one pass.
    pub fn solve(
        &mut self,
        items: &mut [GridItem],
        metrics: &GridMetrics,
        request: &SolveRequest,
    ) -> SolveOutcome {
        if !metrics.is_ready() {
            tracing::debug!(target: "mgrid.layout", "solve skipped: grid unmeasured");
            return SolveOutcome::NotReady;
        }
        if !self.busy.try_enter() {
            tracing::warn!(target: "mgrid.layout", "solve dropped: pass already in flight");
            return SolveOutcome::Dropped;
        }

        let _span = tracing::debug_span!(
            "mgrid.solve",
            pass = self.passes + 1,
            items = items.len(),
            force = request.force,
            placed = tracing::field::Empty,
            unplaced = tracing::field::Empty,
        )
        .entered();

        self.collision.reset();

        let pinned_bottom = request.pinned.and_then(|id| {
            let item = items.iter().find(|item| item.id() == id)?;
            let prev = self.previous.get(&id)?;
            Some(CellRegion::at(*prev, item.span()).bottom())
        });
        if let Some(bottom) = request.ghost.map(|ghost| ghost.bottom()).max(pinned_bottom) {
            self.grow_to_cover(bottom);
        }

        let mut rows = self.row_budget;
        let plan = loop {
            let plan = self.plan(items, metrics, request, rows);
            let can_grow = self.overflow == OverflowPolicy::Grow
                && rows < self.hard_row_limit
                && plan
                    .unplaced
                    .iter()
                    .any(|&idx| items[idx].span().cols <= metrics.num_columns);
            if plan.unplaced.is_empty() || !can_grow {
                break plan;
            }
            rows = rows.saturating_mul(2).min(self.hard_row_limit);
            tracing::debug!(target: "mgrid.layout", rows, "row budget grown");
        };
        self.row_budget = rows;

        let report = self.apply(items, metrics, plan, rows);
        self.passes += 1;
        self.busy.exit();

        tracing::Span::current().record("placed", report.placements.len());
        tracing::Span::current().record("unplaced", report.unplaced.len());
        if !report.unplaced.is_empty() {
            tracing::warn!(
                target: "mgrid.layout",
                unplaced = report.unplaced.len(),
                row_budget = rows,
                "capacity exhausted"
            );
        }
        tracing::debug!(
            target: "mgrid.layout",
            placed = report.placements.len(),
            moved = report.moved_count(),
            affected = report.affected.len(),
            grid_height = report.grid_height,
            "layout pass complete"
        );
        SolveOutcome::Completed(report)
    }

    fn plan(
        &self,
        items: &[GridItem],
        metrics: &GridMetrics,
        request: &SolveRequest,
        rows: u16,
    ) -> Plan {
        let columns = metrics.num_columns;
        let mut matrix = OccupancyGrid::new(rows, columns);
        let mut placed: Vec<Option<CellPos>> = vec![None; items.len()];
        let mut fixed: Vec<bool> = items.iter().map(|item| item.is_dragging).collect();
        let mut released = None;

        // Seeding.
        let dragging = items.iter().any(|item| item.is_dragging);
        let pinned_idx = request.pinned.and_then(|id| index_of(items, id));
        let released_idx = request
            .released
            .and_then(|id| index_of(items, id))
            .filter(|&idx| !items[idx].is_dragging);

        match (request.ghost, pinned_idx, released_idx) {
            (Some(ghost), _, _) if dragging => matrix.fill(ghost, Slot::Ghost),
            (_, Some(idx), _) => {
                let item = &items[idx];
                if let Some(prev) = self.previous.get(&item.id()) {
                    matrix.fill(CellRegion::at(*prev, item.span()), Slot::Item(item.id()));
                    placed[idx] = Some(*prev);
                    fixed[idx] = true;
                }
            }
            (Some(ghost), None, Some(idx)) => {
                let item = &items[idx];
                let anchor = ghost.anchor();
                matrix.fill(CellRegion::at(anchor, item.span()), Slot::Item(item.id()));
                placed[idx] = Some(anchor);
                fixed[idx] = true;
                released = Some(item.id());
            }
            _ => {}
        }

        // Forced set.
        let mut affected = request
            .ghost
            .map(|ghost| self.committed_under(items, &fixed, columns, rows, ghost))
            .unwrap_or_default();
        let displaced_idx = request
            .displaced
            .and_then(|id| index_of(items, id))
            .filter(|&idx| !fixed[idx]);
        if let Some(idx) = displaced_idx
            && !affected.contains(&items[idx].id())
        {
            affected.push(items[idx].id());
        }
        let forced = |id: ItemId| request.force || affected.contains(&id);

        // Phase 1: stay.
        for (idx, item) in items.iter().enumerate() {
            if fixed[idx] || Some(idx) == displaced_idx || forced(item.id()) {
                continue;
            }
            if let Some(prev) = self.previous.get(&item.id()) {
                let region = CellRegion::at(*prev, item.span());
                if matrix.is_region_vacant(region, Some(item.id())) {
                    matrix.fill(region, Slot::Item(item.id()));
                    placed[idx] = Some(*prev);
                }
            }
        }

        // Phase 2: displaced. Phase 3: reflow in slice order.
        let mut unplaced = Vec::new();
        let reflow = (0..items.len()).filter(|&idx| Some(idx) != displaced_idx);
        for idx in displaced_idx.into_iter().chain(reflow) {
            if fixed[idx] || placed[idx].is_some() {
                continue;
            }
            let item = &items[idx];
            match matrix.first_fit(item.span()) {
                Some(anchor) => {
                    matrix.fill(CellRegion::at(anchor, item.span()), Slot::Item(item.id()));
                    placed[idx] = Some(anchor);
                }
                None => unplaced.push(idx),
            }
        }

        Plan {
            matrix,
            placed,
            unplaced,
            affected,
            released,
        }
    }

    /// Items whose committed footprint intersects `ghost`.
    fn committed_under(
        &self,
        items: &[GridItem],
        fixed: &[bool],
        columns: u16,
        rows: u16,
        ghost: CellRegion,
    ) -> Vec<ItemId> {
        let mut committed = OccupancyGrid::new(rows, columns);
        for (idx, item) in items.iter().enumerate() {
            if fixed[idx] {
                continue;
            }
            if let Some(prev) = self.previous.get(&item.id()) {
                committed.fill(CellRegion::at(*prev, item.span()), Slot::Item(item.id()));
            }
        }
        committed.find_affected_items(ghost)
    }

    fn apply(
        &mut self,
        items: &mut [GridItem],
        metrics: &GridMetrics,
        plan: Plan,
        rows: u16,
    ) -> SolveReport {
        let mut placements = Vec::with_capacity(items.len());
        let mut next = FxHashMap::default();

        for (item, cell) in items.iter_mut().zip(&plan.placed) {
            let Some(cell) = *cell else {
                if let Some(prev) = self.previous.get(&item.id()) {
                    next.insert(item.id(), *prev);
                }
                continue;
            };
            let target = metrics.cell_to_pixel(cell.col, cell.row);
            let from = item.style.position();
            let moved = (target.x - from.x).abs() > self.move_epsilon
                || (target.y - from.y).abs() > self.move_epsilon;
            item.style.transition = if moved {
                Transition::Animated
            } else {
                Transition::None
            };
            item.style.move_to(target);
            next.insert(item.id(), cell);
            placements.push(Placement {
                id: item.id(),
                cell,
                moved,
            });
        }

        self.previous = next;

        let rows_used = plan.matrix.bottom_edge();
        self.grid_height = metrics.height_for_rows(rows_used);
        self.matrix = plan.matrix;

        SolveReport {
            placements,
            unplaced: plan.unplaced.iter().map(|&idx| items[idx].id()).collect(),
            affected: plan.affected,
            released: plan.released,
            grid_height: self.grid_height,
            rows_used,
            row_budget: rows,
        }
    }

    /// Answer "which item is under `pos`" against current styles.
    pub fn item_at(
        &mut self,
        items: &[GridItem],
        metrics: &GridMetrics,
        pos: CellPos,
        dragged: Option<&GridItem>,
    ) -> Option<ItemId> {
        self.collision.item_at(items, metrics, pos, dragged)
    }

    /// Fit a drag target inside the row budget.
    ///
    /// Under [`OverflowPolicy::Grow`] the budget first doubles until it
    /// covers the region or reaches the hard limit. The row is then clamped
    /// so the region's bottom edge stays within the budget.
    pub fn admit(&mut self, region: CellRegion) -> CellRegion {
        self.grow_to_cover(region.bottom());
        let max_row = self.row_budget.saturating_sub(region.row_span);
        CellRegion::new(
            region.col,
            region.row.min(max_row),
            region.col_span,
            region.row_span,
        )
    }

    fn grow_to_cover(&mut self, bottom: u16) {
        if self.overflow != OverflowPolicy::Grow {
            return;
        }
        while bottom > self.row_budget && self.row_budget < self.hard_row_limit {
            self.row_budget = self.row_budget.saturating_mul(2).min(self.hard_row_limit);
            tracing::debug!(target: "mgrid.layout", rows = self.row_budget, "row budget grown");
        }
    }

    /// Committed cell of `id`.
    #[must_use]
    pub fn previous_position(&self, id: ItemId) -> Option<CellPos> {
        self.previous.get(&id).copied()
    }

    /// Overwrite the committed cell of `id`.
    pub fn commit_position(&mut self, id: ItemId, cell: CellPos) {
        self.previous.insert(id, cell);
    }

    /// Forget every committed position.
    pub fn clear(&mut self) {
        self.previous.clear();
        self.collision.reset();
        self.matrix = OccupancyGrid::new(0, 0);
        self.grid_height = 0.0;
    }

    /// Matrix of the last completed pass.
    #[must_use]
    pub const fn matrix(&self) -> &OccupancyGrid {
        &self.matrix
    }

    /// Container height computed by the last completed pass.
    #[must_use]
    pub const fn grid_height(&self) -> f64 {
        self.grid_height
    }

    /// Completed passes.
    #[must_use]
    pub const fn passes(&self) -> u64 {
        self.passes
    }

    #[must_use]
    pub const fn row_budget(&self) -> u16 {
        self.row_budget
    }

    #[must_use]
    pub const fn collision(&self) -> &CollisionQuery {
        &self.collision
    }

    #[must_use]
    pub const fn busy(&self) -> &BusyFlag {
        &self.busy
    }

    /// Direct access to the busy flag, for hosts that run passes from
    /// re-entrant callbacks.
    pub fn busy_mut(&mut self) -> &mut BusyFlag {
        &mut self.busy
    }
}

fn index_of(items: &[GridItem], id: ItemId) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}
