#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use mgrid::{
    ContainerGeometry, Duration, GridConfig, GridItem, Instant, ItemId, MasonryGrid,
    PointerEvent,
};

#[derive(Debug, Arbitrary)]
enum Event {
    Down { item: u8, x: i16, y: i16 },
    Move { x: i16, y: i16 },
    Up,
    Cancel,
    Reset,
    Resize { width: u16 },
    Advance { ms: u8 },
}

#[derive(Debug, Arbitrary)]
struct Input {
    sizes: Vec<(u8, u8)>,
    events: Vec<Event>,
}

fuzz_target!(|input: Input| {
    if input.sizes.is_empty() || input.sizes.len() > 32 || input.events.len() > 256 {
        return;
    }
    let Ok(mut grid) = MasonryGrid::new(GridConfig::default().with_gutter(8.0)) else {
        return;
    };
    let mut items: Vec<GridItem> = input
        .sizes
        .iter()
        .enumerate()
        .map(|(idx, (w, h))| GridItem::new(idx as u64, f64::from(*w) + 1.0, f64::from(*h) + 1.0))
        .collect();
    let _ = grid.compute_responsive_layout(&mut items, ContainerGeometry::new(0.0, 0.0, 640.0));

    let mut now = Instant::now();
    for event in &input.events {
        match *event {
            Event::Down { item, x, y } => {
                let id = ItemId(u64::from(item) % items.len() as u64);
                let _ = grid.begin_drag(&mut items, id, &PointerEvent::new(f64::from(x), f64::from(y)), now);
            }
            Event::Move { x, y } => {
                let _ = grid.update_drag(&mut items, &PointerEvent::new(f64::from(x), f64::from(y)), now);
            }
            Event::Up => {
                grid.end_drag(&mut items, now);
            }
            Event::Cancel => {
                grid.cancel_drag(&mut items);
            }
            Event::Reset => grid.reset(&mut items),
            Event::Resize { width } => {
                let _ = grid.compute_responsive_layout(
                    &mut items,
                    ContainerGeometry::new(0.0, 0.0, f64::from(width)),
                );
            }
            Event::Advance { ms } => {
                now += Duration::from_millis(u64::from(ms));
                grid.tick(&mut items, now);
            }
        }

        let dragging = items.iter().filter(|item| item.is_dragging).count();
        assert!(dragging <= 1, "{dragging} items dragging at once");
        if dragging == 1 {
            assert_eq!(grid.phase(), mgrid::DragPhase::Dragging);
        }
        assert!(!grid.solver().busy().is_busy());
    }
});
