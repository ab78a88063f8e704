#![forbid(unsafe_code)]

//! Bounded occupancy matrix.
//!
//! [`OccupancyGrid`] records which item (if any) owns each cell of a
//! `max_rows × num_columns` grid. A third state, [`Slot::Ghost`], reserves
//! the cells under the drag target without assigning them to an id.
//!
//! The matrix is rebuilt from scratch on every layout pass; it is never
//! patched in place across passes.
//!
//! # Two notions of "free"
//!
//! - [`is_occupied`](OccupancyGrid::is_occupied) is the *stay* test: ghost
//!   cells and the excluded id are passable, out-of-bounds cells are not.
//! - [`is_region_free`](OccupancyGrid::is_region_free) is the *relocate*
//!   test: every cell must be strictly empty.

use mgrid_core::geometry::{CellPos, CellRegion, Span};

use crate::item::ItemId;

/// Content of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slot {
    #[default]
    Empty,
    /// Reserved for the drag target.
    Ghost,
    Item(ItemId),
}

impl Slot {
    /// Item id held by the slot, if any.
    #[inline]
    #[must_use]
    pub const fn item(self) -> Option<ItemId> {
        match self {
            Self::Item(id) => Some(id),
            Self::Empty | Self::Ghost => None,
        }
    }
}

/// A row-major matrix of [`Slot`]s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyGrid {
    rows: u16,
    columns: u16,
    slots: Vec<Slot>,
}

impl OccupancyGrid {
    /// Create an all-empty matrix.
    #[must_use]
    pub fn new(max_rows: u16, num_columns: u16) -> Self {
        Self {
            rows: max_rows,
            columns: num_columns,
            slots: vec![Slot::Empty; usize::from(max_rows) * usize::from(num_columns)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn rows(&self) -> u16 {
        self.rows
    }

    #[inline]
    #[must_use]
    pub const fn columns(&self) -> u16 {
        self.columns
    }

    #[inline]
    fn index(&self, pos: CellPos) -> Option<usize> {
        (pos.row < self.rows && pos.col < self.columns)
            .then(|| usize::from(pos.row) * usize::from(self.columns) + usize::from(pos.col))
    }

    /// Slot at `pos`, or `None` when out of bounds.
    #[must_use]
    pub fn get(&self, pos: CellPos) -> Option<Slot> {
        self.index(pos).map(|idx| self.slots[idx])
    }

    /// Write one slot. Out-of-bounds writes are ignored and return `false`.
    pub fn set(&mut self, pos: CellPos, slot: Slot) -> bool {
        match self.index(pos) {
            Some(idx) => {
                self.slots[idx] = slot;
                true
            }
            None => false,
        }
    }

    /// Write `slot` into every in-bounds cell of `region`.
    pub fn fill(&mut self, region: CellRegion, slot: Slot) {
        for pos in region.cells() {
            self.set(pos, slot);
        }
    }

    /// Stay test for a single cell.
    ///
    /// `true` when the cell is out of bounds or holds an item other than
    /// `exclude`. Empty and ghost cells are passable.
    #[must_use]
    pub fn is_occupied(&self, row: u16, col: u16, exclude: Option<ItemId>) -> bool {
        match self.get(CellPos::new(row, col)) {
            None => true,
            Some(Slot::Empty | Slot::Ghost) => false,
            Some(Slot::Item(id)) => Some(id) != exclude,
        }
    }

    /// Stay test for a whole footprint.
    #[must_use]
    pub fn is_region_vacant(&self, region: CellRegion, exclude: Option<ItemId>) -> bool {
        region
            .cells()
            .all(|pos| !self.is_occupied(pos.row, pos.col, exclude))
    }

    /// Relocate test: every cell in bounds and strictly empty.
    #[must_use]
    pub fn is_region_free(&self, region: CellRegion) -> bool {
        region
            .cells()
            .all(|pos| self.get(pos) == Some(Slot::Empty))
    }

    /// Distinct item ids under `region`, in row-major first-seen order.
    #[must_use]
    pub fn find_affected_items(&self, region: CellRegion) -> Vec<ItemId> {
        let mut affected = Vec::new();
        for pos in region.cells() {
            if let Some(id) = self.get(pos).and_then(Slot::item)
                && !affected.contains(&id)
            {
                affected.push(id);
            }
        }
        affected
    }

    /// First anchor, scanning rows top-to-bottom and columns left-to-right,
    /// where a footprint of `span` is free.
    #[must_use]
    pub fn first_fit(&self, span: Span) -> Option<CellPos> {
        if span.cols > self.columns || span.rows > self.rows {
            return None;
        }
        for row in 0..=(self.rows - span.rows) {
            for col in 0..=(self.columns - span.cols) {
                let region = CellRegion::new(col, row, span.cols, span.rows);
                if self.is_region_free(region) {
                    return Some(CellPos::new(row, col));
                }
            }
        }
        None
    }

    /// One past the lowest non-empty row (ghost cells count). Zero when the
    /// matrix is empty.
    #[must_use]
    pub fn bottom_edge(&self) -> u16 {
        if self.columns == 0 {
            return 0;
        }
        self.slots
            .chunks(usize::from(self.columns))
            .rposition(|row| row.iter().any(|slot| *slot != Slot::Empty))
            .map_or(0, |row| row as u16 + 1)
    }

    /// All cells holding `id`.
    pub fn cells_of(&self, id: ItemId) -> impl Iterator<Item = CellPos> + '_ {
        let columns = usize::from(self.columns.max(1));
        self.slots
            .iter()
            .enumerate()
            .filter(move |(_, slot)| **slot == Slot::Item(id))
            .map(move |(idx, _)| CellPos::new((idx / columns) as u16, (idx % columns) as u16))
    }
}
