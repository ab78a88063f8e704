#![forbid(unsafe_code)]

//! Collision query: which item lies under a cell.
//!
//! The query reads item footprints from their current style positions, not
//! from the occupancy matrix, so it answers correctly mid-drag while the
//! matrix holds ghost cells.
//!
//! A single most-recent result is memoised by `(row, col, dragged id)`.
//! Pointer moves tend to hover over the same cell for many events; the memo
//! turns those repeats into a lookup. The memo goes stale whenever items
//! move, so the solver calls [`CollisionQuery::reset`] at the start of every
//! pass.

use mgrid_core::geometry::{CellPos, CellRegion, Span};

use crate::coords::GridMetrics;
use crate::item::{GridItem, ItemId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueryKey {
    row: u16,
    col: u16,
    dragged: Option<ItemId>,
}

/// Hit/miss counters of the memo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollisionStats {
    pub hits: u64,
    pub misses: u64,
}

/// Memoised "item under cell" lookup.
#[derive(Debug, Default)]
pub struct CollisionQuery {
    last: Option<(QueryKey, Option<ItemId>)>,
    stats: CollisionStats,
}

impl CollisionQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// First item in slice order whose footprint intersects the query
    /// footprint at `pos`.
    ///
    /// With a `dragged` item the query footprint is that item's full span,
    /// otherwise a single cell. Dragging items and the dragged item itself
    /// are never returned. `None` while the grid is unmeasured.
    pub fn item_at(
        &mut self,
        items: &[GridItem],
        metrics: &GridMetrics,
        pos: CellPos,
        dragged: Option<&GridItem>,
    ) -> Option<ItemId> {
        if !metrics.is_ready() {
            return None;
        }
        let key = QueryKey {
            row: pos.row,
            col: pos.col,
            dragged: dragged.map(GridItem::id),
        };
        if let Some((cached_key, hit)) = self.last
            && cached_key == key
        {
            self.stats.hits += 1;
            tracing::trace!(
                target: "mgrid.layout",
                row = pos.row,
                col = pos.col,
                "collision cache hit"
            );
            return hit;
        }
        self.stats.misses += 1;

        let span = dragged.map_or(Span::UNIT, GridItem::span);
        let probe = CellRegion::at(pos, span);
        let hit = items
            .iter()
            .filter(|item| !item.is_dragging && Some(item.id()) != key.dragged)
            .find(|item| {
                item.footprint(metrics)
                    .is_some_and(|footprint| footprint.intersects(&probe))
            })
            .map(GridItem::id);

        self.last = Some((key, hit));
        hit
    }

    /// Drop the memoised result.
    pub fn reset(&mut self) {
        self.last = None;
    }

    #[must_use]
    pub const fn stats(&self) -> CollisionStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> GridMetrics {
        GridMetrics::new(100.0, 10.0, 4)
    }

    fn items() -> Vec<GridItem> {
        vec![
            GridItem::new(1, 100.0, 100.0).at(0.0, 0.0),
            // Wide at (1, 0)..(2, 0).
            GridItem::new(2, 400.0, 100.0).at(110.0, 0.0),
            // Tall at (0, 1)..(0, 2).
            GridItem::new(3, 100.0, 400.0).at(0.0, 110.0),
        ]
    }

    #[test]
    fn finds_item_covering_cell() {
        let mut query = CollisionQuery::new();
        let items = items();
        let m = metrics();
        assert_eq!(query.item_at(&items, &m, CellPos::new(0, 2), None), Some(ItemId(2)));
        assert_eq!(query.item_at(&items, &m, CellPos::new(2, 0), None), Some(ItemId(3)));
        assert_eq!(query.item_at(&items, &m, CellPos::new(1, 1), None), None);
    }

    #[test]
    fn dragged_span_widens_probe_and_skips_self() {
        let mut query = CollisionQuery::new();
        let mut items = items();
        items[1].is_dragging = true;
        let dragged = items[1].clone();
        let m = metrics();

        // A 2x1 probe at (1, 2) reaches nothing but empty cells.
        assert_eq!(query.item_at(&items, &m, CellPos::new(1, 2), Some(&dragged)), None);
        // At (1, 0) it touches the tall item at column 0.
        assert_eq!(
            query.item_at(&items, &m, CellPos::new(1, 0), Some(&dragged)),
            Some(ItemId(3))
        );
        // Over its own old footprint the dragged item is never reported.
        assert_eq!(query.item_at(&items, &m, CellPos::new(0, 2), Some(&dragged)), None);
    }

    #[test]
    fn repeated_query_hits_memo_until_reset() {
        let mut query = CollisionQuery::new();
        let mut items = items();
        let m = metrics();

        assert_eq!(query.item_at(&items, &m, CellPos::new(0, 0), None), Some(ItemId(1)));
        items[0].style.left = 330.0;
        // Stale but memoised.
        assert_eq!(query.item_at(&items, &m, CellPos::new(0, 0), None), Some(ItemId(1)));
        assert_eq!(query.stats(), CollisionStats { hits: 1, misses: 1 });

        query.reset();
        assert_eq!(query.item_at(&items, &m, CellPos::new(0, 0), None), None);
        assert_eq!(query.stats().misses, 2);
    }

    #[test]
    fn unmeasured_grid_yields_none() {
        let mut query = CollisionQuery::new();
        let items = items();
        let m = GridMetrics::unmeasured(10.0, 4);
        assert_eq!(query.item_at(&items, &m, CellPos::new(0, 0), None), None);
    }
}
