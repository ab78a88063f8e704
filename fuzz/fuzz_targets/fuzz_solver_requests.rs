#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mgrid_core::config::{GridConfig, OverflowPolicy};
use mgrid_core::geometry::CellRegion;
use mgrid_layout::{GridItem, GridMetrics, ItemId, LayoutSolver, SolveRequest};

#[derive(Debug, Arbitrary)]
enum Shape {
    Wide,
    Tall,
    Square,
}

#[derive(Debug, Arbitrary)]
enum Op {
    Full,
    Refresh,
    Drag { item: u8, col: u8, row: u8 },
    Release { item: u8, col: u8, row: u8 },
    Pin { item: u8 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    columns: u8,
    max_rows: u8,
    grow: bool,
    shapes: Vec<Shape>,
    ops: Vec<Op>,
}

fuzz_target!(|input: Input| {
    let columns = u16::from(input.columns % 8) + 1;
    let max_rows = u16::from(input.max_rows % 32) + 1;
    if input.shapes.len() > 64 || input.ops.len() > 64 {
        return;
    }
    let metrics = GridMetrics::new(50.0, 5.0, columns);
    let mut config = GridConfig::default().with_max_rows(max_rows);
    if input.grow {
        config = config.with_overflow(OverflowPolicy::Grow);
        config.hard_row_limit = 256;
    }
    let mut solver = LayoutSolver::new(&config);
    let mut items: Vec<GridItem> = input
        .shapes
        .iter()
        .enumerate()
        .map(|(idx, shape)| {
            let (w, h) = match shape {
                Shape::Wide => (200.0, 50.0),
                Shape::Tall => (50.0, 200.0),
                Shape::Square => (50.0, 50.0),
            };
            GridItem::new(idx as u64, w, h)
        })
        .collect();
    if items.is_empty() {
        return;
    }

    for op in &input.ops {
        for item in &mut items {
            item.is_dragging = false;
        }
        let request = match *op {
            Op::Full => SolveRequest::full(),
            Op::Refresh => SolveRequest::refresh(),
            Op::Drag { item, col, row } => {
                let idx = usize::from(item) % items.len();
                let span = items[idx].span();
                let ghost = CellRegion::new(
                    u16::from(col) % columns.saturating_sub(span.cols).saturating_add(1),
                    u16::from(row % 16),
                    span.cols,
                    span.rows,
                );
                items[idx].is_dragging = true;
                let dragged = items[idx].clone();
                let displaced = solver.item_at(&items, &metrics, ghost.anchor(), Some(&dragged));
                SolveRequest::drag(ghost, displaced)
            }
            Op::Release { item, col, row } => {
                let idx = usize::from(item) % items.len();
                let span = items[idx].span();
                let ghost = CellRegion::new(
                    u16::from(col) % columns.saturating_sub(span.cols).saturating_add(1),
                    u16::from(row % 16),
                    span.cols,
                    span.rows,
                );
                SolveRequest::release(items[idx].id(), ghost)
            }
            Op::Pin { item } => SolveRequest::pinned(ItemId(u64::from(item) % items.len() as u64)),
        };

        let Some(report) = solver.solve(&mut items, &metrics, &request).into_report() else {
            panic!("measured, idle solver must complete");
        };
        assert!(!solver.busy().is_busy());

        // Placed, non-dragging items never share a cell.
        let placed: Vec<CellRegion> = items
            .iter()
            .filter(|item| !item.is_dragging && !report.unplaced.contains(&item.id()))
            .filter_map(|item| item.footprint(&metrics))
            .collect();
        for (i, a) in placed.iter().enumerate() {
            for b in &placed[i + 1..] {
                assert!(!a.intersects(b), "overlap {a:?} / {b:?}");
            }
        }
        assert!(report.grid_height >= 0.0);
    }
});
