//! End-to-end drag sessions against the public `MasonryGrid` API.
//!
//! Time is driven explicitly through `Instant` offsets, so every scenario is
//! deterministic: no sleeps, no wall clock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use mgrid::layout::{Slot, SolveRequest};
use mgrid::{
    CellPos, ContainerGeometry, DegradationAction, DragHooks, DragPhase, Duration, Error,
    GeometryError, GridConfig, GridItem, HookError, Instant, ItemId, MasonryGrid, NoHooks,
    OverflowPolicy, PixelPoint, PixelRect, PointerEvent, SolveOutcome, Transition,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn squares(n: u64) -> Vec<GridItem> {
    (1..=n).map(|id| GridItem::new(id, 100.0, 100.0)).collect()
}

/// Four 100 px columns with 10 px gutters (pitch 110).
fn setup<H: DragHooks>(hooks: H, count: u64) -> (MasonryGrid<H>, Vec<GridItem>) {
    let config = GridConfig::default().with_gutter(10.0);
    let mut grid = MasonryGrid::with_hooks(config, hooks).expect("valid config");
    let mut items = squares(count);
    let outcome = grid
        .compute_responsive_layout(&mut items, ContainerGeometry::new(0.0, 0.0, 430.0))
        .expect("measured");
    assert!(outcome.is_completed());
    (grid, items)
}

fn press(item: &GridItem, dx: f64, dy: f64) -> PointerEvent {
    let style = item.style;
    PointerEvent::new(style.left + dx, style.top + dy)
        .with_target(PixelRect::new(style.left, style.top, style.width, style.height))
}

/// Arm a gesture on item `id`, grabbed 5 px inside its top-left corner.
fn grab<H: DragHooks>(
    grid: &mut MasonryGrid<H>,
    items: &mut [GridItem],
    id: u64,
    at: Instant,
) -> mgrid::Result<DragPhase> {
    let idx = items
        .iter()
        .position(|item| item.id() == ItemId(id))
        .expect("item exists");
    let down = press(&items[idx], 5.0, 5.0);
    grid.begin_drag(items, ItemId(id), &down, at)
}

fn cell_of<H: DragHooks>(grid: &MasonryGrid<H>, item: &GridItem) -> CellPos {
    grid.metrics()
        .cell_of_pixel(item.style.position())
        .expect("measured")
}

fn assert_no_overlap<H: DragHooks>(grid: &MasonryGrid<H>, items: &[GridItem]) {
    let placed: Vec<_> = items
        .iter()
        .filter(|item| !item.is_dragging)
        .map(|item| (item.id(), item.footprint(grid.metrics()).expect("measured")))
        .collect();
    for (i, (a, ra)) in placed.iter().enumerate() {
        for (b, rb) in &placed[i + 1..] {
            assert!(!ra.intersects(rb), "{a} overlaps {b}");
        }
    }
}

#[derive(Debug, Default)]
struct Recorder {
    starts: u32,
    moves: u32,
    ends: u32,
    panic_on_start: bool,
    fail_on_end: bool,
}

impl DragHooks for Recorder {
    fn on_drag_start(&mut self, _item: &GridItem) -> Result<(), HookError> {
        self.starts += 1;
        if self.panic_on_start {
            panic!("start hook exploded");
        }
        Ok(())
    }

    fn on_drag(&mut self, _item: &GridItem, _event: &PointerEvent) -> Result<(), HookError> {
        self.moves += 1;
        Ok(())
    }

    fn on_drag_end(&mut self, item: &GridItem) -> Result<(), HookError> {
        self.ends += 1;
        if self.fail_on_end {
            return Err(HookError::failed("on_drag_end", format!("cannot save {}", item.id())));
        }
        Ok(())
    }
}

// ============================================================================
// Threshold and hook cadence
// ============================================================================

#[test]
fn small_moves_never_start_a_drag() {
    let (mut grid, mut items) = setup(Recorder::default(), 4);
    let t0 = Instant::now();
    let down = press(&items[0], 10.0, 10.0);
    grid.begin_drag(&mut items, ItemId(1), &down, t0)
        .expect("armed");

    let nudge = PointerEvent::new(down.x + 3.0, down.y);
    let report = grid.update_drag(&mut items, &nudge, t0 + ms(5)).expect("live");
    assert_eq!(report.phase, DragPhase::Armed);
    assert_eq!(grid.hooks().starts, 0);
    assert!(!items[0].is_dragging);

    let pull = PointerEvent::new(down.x + 8.0, down.y);
    let report = grid.update_drag(&mut items, &pull, t0 + ms(10)).expect("live");
    assert_eq!(report.phase, DragPhase::Dragging);
    assert_eq!(grid.hooks().starts, 1);

    for step in 1u32..=5 {
        let more = PointerEvent::new(down.x + 8.0 + f64::from(step) * 20.0, down.y);
        grid.update_drag(&mut items, &more, t0 + ms(10 + u64::from(step)))
            .expect("live");
    }
    assert_eq!(grid.hooks().starts, 1);
    assert_eq!(grid.hooks().moves, 6);
}

#[test]
fn release_while_armed_is_a_tap() {
    let (mut grid, mut items) = setup(Recorder::default(), 4);
    let t0 = Instant::now();
    let before = items.clone();
    grab(&mut grid, &mut items, 2, t0)
        .expect("armed");

    let report = grid.end_drag(&mut items, t0 + ms(50));
    assert_eq!(report.phase, DragPhase::Cancelled);
    assert_eq!(report.solve, None);
    assert_eq!(grid.hooks().ends, 0);
    assert_eq!(items, before);
    assert_eq!(grid.tick(&mut items, t0 + ms(60)).phase, DragPhase::Idle);
}

// ============================================================================
// Debounced mid-drag passes
// ============================================================================

#[test]
fn moves_within_debounce_window_coalesce_into_one_pass() {
    let (mut grid, mut items) = setup(NoHooks, 8);
    // Row 0: 1 2 3 4, row 1: 5 6 7 8.
    let t0 = Instant::now();
    let passes_before = grid.stats().passes;
    grab(&mut grid, &mut items, 1, t0)
        .expect("armed");

    // Top-left lands at x = 115, 225, 335; the last move also drops a row.
    let path = [(120.0, 5.0, 1), (230.0, 5.0, 10), (340.0, 120.0, 20)];
    for (x, y, at) in path {
        let report = grid
            .update_drag(&mut items, &PointerEvent::new(x, y), t0 + ms(at))
            .expect("live");
        assert_eq!(report.solve, None);
    }
    let ghost = grid.ghost_position().expect("ghost");
    assert_eq!(ghost.anchor(), CellPos::new(1, 3));
    assert_eq!(grid.displaced(), Some(ItemId(8)));

    // Debounce re-armed at 20 ms; nothing is due at 30 ms.
    assert_eq!(grid.tick(&mut items, t0 + ms(30)).solve, None);
    assert_eq!(grid.stats().passes, passes_before);

    let report = grid.tick(&mut items, t0 + ms(50));
    let solved = report
        .solve
        .and_then(SolveOutcome::into_report)
        .expect("one pass");
    assert_eq!(grid.stats().passes, passes_before + 1);
    assert_eq!(solved.affected, vec![ItemId(8)]);
    assert_eq!(grid.solver().matrix().get(CellPos::new(1, 3)), Some(Slot::Ghost));
    assert_ne!(cell_of(&grid, &items[7]), CellPos::new(1, 3));
    assert_no_overlap(&grid, &items);

    // Later ticks do not repeat the pass.
    assert_eq!(grid.tick(&mut items, t0 + ms(200)).solve, None);
    assert_eq!(grid.stats().passes, passes_before + 1);
}

#[test]
fn busy_solver_drops_debounced_pass() {
    let (mut grid, mut items) = setup(NoHooks, 4);
    let t0 = Instant::now();
    grab(&mut grid, &mut items, 1, t0)
        .expect("armed");
    grid.update_drag(&mut items, &PointerEvent::new(120.0, 5.0), t0 + ms(1))
        .expect("live");

    assert!(grid.solver_mut().busy_mut().try_enter());
    let report = grid.tick(&mut items, t0 + ms(40));
    assert_eq!(report.solve, Some(SolveOutcome::Dropped));
    assert_eq!(report.phase, DragPhase::Dragging);
    assert_eq!(grid.stats().dropped, 1);

    grid.solver_mut().busy_mut().exit();
    let report = grid.end_drag(&mut items, t0 + ms(50));
    assert_eq!(report.phase, DragPhase::Committed);
    assert!(report.solve.as_ref().is_some_and(SolveOutcome::is_completed));
    assert_no_overlap(&grid, &items);
}

// ============================================================================
// Commit, cancel, settle
// ============================================================================

#[test]
fn drop_commits_to_ghost_and_reflows_neighbours() {
    let (mut grid, mut items) = setup(Recorder::default(), 6);
    let t0 = Instant::now();
    // Drag item 6 (row 1, col 1) onto item 2 (row 0, col 1).
    grab(&mut grid, &mut items, 6, t0)
        .expect("armed");
    grid.update_drag(&mut items, &PointerEvent::new(120.0, 10.0), t0 + ms(5))
        .expect("live");
    assert_eq!(grid.displaced(), Some(ItemId(2)));
    grid.tick(&mut items, t0 + ms(40));

    let report = grid.end_drag(&mut items, t0 + ms(60));
    assert_eq!(report.phase, DragPhase::Committed);
    assert!(report.hooks.is_clean());
    assert_eq!(grid.hooks().ends, 1);
    assert_eq!(cell_of(&grid, &items[5]), CellPos::new(0, 1));
    assert_eq!(
        grid.solver().previous_position(ItemId(6)),
        Some(CellPos::new(0, 1))
    );
    assert_eq!(items[5].style.transition, Transition::Animated);
    assert!(items[5].style.raised);
    assert!(items.iter().all(|item| !item.is_dragging));
    assert_no_overlap(&grid, &items);

    // Settle fires 250 ms after the drop.
    assert_eq!(grid.tick(&mut items, t0 + ms(200)).phase, DragPhase::Committed);
    assert_eq!(grid.tick(&mut items, t0 + ms(310)).phase, DragPhase::Idle);
    assert_eq!(items[5].style.transition, Transition::None);
    assert!(!items[5].style.raised);
    assert_eq!(grid.stats().commits, 1);
}

#[test]
fn new_gesture_finishes_pending_settle() {
    let (mut grid, mut items) = setup(NoHooks, 4);
    let t0 = Instant::now();
    grab(&mut grid, &mut items, 4, t0)
        .expect("armed");
    grid.update_drag(&mut items, &PointerEvent::new(10.0, 130.0), t0 + ms(5))
        .expect("live");
    grid.end_drag(&mut items, t0 + ms(10));
    assert_eq!(grid.phase(), DragPhase::Committed);

    let phase = grab(&mut grid, &mut items, 1, t0 + ms(20))
        .expect("terminal phases accept a new gesture");
    assert_eq!(phase, DragPhase::Armed);
    assert_eq!(items[3].style.transition, Transition::None);
    assert!(!items[3].style.raised);
}

#[test]
fn cancel_after_mid_drag_pass_restores_layout() {
    let (mut grid, mut items) = setup(NoHooks, 4);
    let original: Vec<PixelPoint> = items.iter().map(|item| item.style.position()).collect();
    let t0 = Instant::now();

    // Drag item 1 over item 2 and let the debounced pass push item 2 aside.
    grab(&mut grid, &mut items, 1, t0)
        .expect("armed");
    grid.update_drag(&mut items, &PointerEvent::new(120.0, 5.0), t0 + ms(5))
        .expect("live");
    grid.tick(&mut items, t0 + ms(40));
    assert_eq!(cell_of(&grid, &items[1]), CellPos::new(0, 0));

    let report = grid.cancel_drag(&mut items);
    assert_eq!(report.phase, DragPhase::Cancelled);
    assert!(report.solve.as_ref().is_some_and(SolveOutcome::is_completed));
    let restored: Vec<PixelPoint> = items.iter().map(|item| item.style.position()).collect();
    assert_eq!(restored, original);
    assert_no_overlap(&grid, &items);
    assert_eq!(grid.stats().cancels, 1);
}

#[test]
fn reset_from_any_phase_returns_to_idle() {
    let (mut grid, mut items) = setup(NoHooks, 4);
    let t0 = Instant::now();
    grab(&mut grid, &mut items, 3, t0)
        .expect("armed");
    grid.update_drag(&mut items, &PointerEvent::new(20.0, 200.0), t0 + ms(5))
        .expect("live");

    grid.reset(&mut items);
    assert_eq!(grid.phase(), DragPhase::Idle);
    assert_eq!(grid.ghost_position(), None);
    assert_eq!(grid.next_deadline(), None);
    assert_eq!(grid.tick(&mut items, t0 + ms(500)).solve, None);
    assert_eq!(cell_of(&grid, &items[2]), CellPos::new(0, 2));
}

#[test]
fn reset_after_mid_drag_pass_restores_layout() {
    let (mut grid, mut items) = setup(NoHooks, 4);
    let original: Vec<PixelPoint> = items.iter().map(|item| item.style.position()).collect();
    let t0 = Instant::now();

    grab(&mut grid, &mut items, 1, t0)
        .expect("armed");
    grid.update_drag(&mut items, &PointerEvent::new(120.0, 5.0), t0 + ms(5))
        .expect("live");
    grid.tick(&mut items, t0 + ms(40));
    assert_eq!(cell_of(&grid, &items[1]), CellPos::new(0, 0));

    let passes = grid.stats().passes;
    grid.reset(&mut items);
    assert_eq!(grid.phase(), DragPhase::Idle);
    assert_eq!(grid.stats().passes, passes + 1);
    let restored: Vec<PixelPoint> = items.iter().map(|item| item.style.position()).collect();
    assert_eq!(restored, original);
    assert_no_overlap(&grid, &items);
}

// ============================================================================
// Row budget
// ============================================================================

/// Four squares on a three-row budget; item 1 is dropped 150 rows down.
fn drop_far_below(overflow: OverflowPolicy) -> (MasonryGrid<NoHooks>, Vec<GridItem>) {
    let config = GridConfig::default()
        .with_gutter(10.0)
        .with_max_rows(3)
        .with_overflow(overflow);
    let mut grid = MasonryGrid::new(config).expect("valid config");
    let mut items = squares(4);
    grid.compute_responsive_layout(&mut items, ContainerGeometry::new(0.0, 0.0, 430.0))
        .expect("measured");

    let t0 = Instant::now();
    grab(&mut grid, &mut items, 1, t0)
        .expect("armed");
    grid.update_drag(&mut items, &PointerEvent::new(5.0, 110.0 * 150.0 + 5.0), t0 + ms(5))
        .expect("live");
    let report = grid.end_drag(&mut items, t0 + ms(10));
    assert_eq!(report.phase, DragPhase::Committed);
    (grid, items)
}

fn refresh_keeps(grid: &mut MasonryGrid<NoHooks>, items: &mut [GridItem], id: ItemId) {
    let metrics = *grid.metrics();
    let report = grid
        .solver_mut()
        .solve(items, &metrics, &SolveRequest::refresh())
        .into_report()
        .expect("completed");
    let placement = report
        .placements
        .iter()
        .find(|placement| placement.id == id)
        .expect("placed");
    assert!(!placement.moved);
}

#[test]
fn drop_below_budget_lands_on_last_row() {
    let (mut grid, mut items) = drop_far_below(OverflowPolicy::Report);
    assert_eq!(cell_of(&grid, &items[0]), CellPos::new(2, 0));
    assert_eq!(
        grid.solver().matrix().get(CellPos::new(2, 0)),
        Some(Slot::Item(ItemId(1)))
    );
    assert_eq!(grid.grid_height(), 3.0 * 110.0 + 10.0);

    refresh_keeps(&mut grid, &mut items, ItemId(1));
    assert_eq!(cell_of(&grid, &items[0]), CellPos::new(2, 0));
    assert_no_overlap(&grid, &items);
}

#[test]
fn drop_below_budget_grows_rows_under_grow_policy() {
    let (mut grid, mut items) = drop_far_below(OverflowPolicy::Grow);
    assert_eq!(cell_of(&grid, &items[0]), CellPos::new(150, 0));
    assert_eq!(grid.solver().row_budget(), 192);
    assert_eq!(grid.grid_height(), 151.0 * 110.0 + 10.0);

    refresh_keeps(&mut grid, &mut items, ItemId(1));
    assert_eq!(cell_of(&grid, &items[0]), CellPos::new(150, 0));
    assert_no_overlap(&grid, &items);
}

// ============================================================================
// Fault isolation
// ============================================================================

#[test]
fn panicking_start_hook_does_not_stop_the_drag() {
    let hooks = Recorder {
        panic_on_start: true,
        ..Recorder::default()
    };
    let (mut grid, mut items) = setup(hooks, 4);
    let t0 = Instant::now();
    grab(&mut grid, &mut items, 1, t0)
        .expect("armed");

    let report = grid
        .update_drag(&mut items, &PointerEvent::new(250.0, 5.0), t0 + ms(5))
        .expect("live");
    assert_eq!(report.phase, DragPhase::Dragging);
    assert_eq!(report.hooks.invoked, 2);
    assert!(matches!(
        report.hooks.failures.as_slice(),
        [HookError::Panicked { hook: "on_drag_start", .. }]
    ));

    let end = grid.end_drag(&mut items, t0 + ms(10));
    assert_eq!(end.phase, DragPhase::Committed);
}

#[test]
fn failing_end_hook_still_commits() {
    let hooks = Recorder {
        fail_on_end: true,
        ..Recorder::default()
    };
    let (mut grid, mut items) = setup(hooks, 4);
    let t0 = Instant::now();
    grab(&mut grid, &mut items, 2, t0)
        .expect("armed");
    grid.update_drag(&mut items, &PointerEvent::new(5.0, 120.0), t0 + ms(5))
        .expect("live");

    let report = grid.end_drag(&mut items, t0 + ms(10));
    assert_eq!(report.phase, DragPhase::Committed);
    let failure = report.hooks.failures.first().expect("hook failed");
    assert_eq!(failure.to_string(), "hook 'on_drag_end' failed: cannot save #2");
    assert_eq!(Error::from(failure.clone()).degradation(), DegradationAction::FinishGesture);
    assert_eq!(cell_of(&grid, &items[1]), CellPos::new(1, 0));
}

#[test]
fn non_finite_pointer_is_ignored() {
    let (mut grid, mut items) = setup(NoHooks, 2);
    let t0 = Instant::now();
    let err = grid
        .begin_drag(&mut items, ItemId(1), &PointerEvent::new(f64::NAN, 0.0), t0)
        .expect_err("nan");
    assert_eq!(err.degradation(), DegradationAction::IgnoreInput);
    assert_eq!(grid.phase(), DragPhase::Idle);

    grab(&mut grid, &mut items, 1, t0)
        .expect("armed");
    let err = grid
        .update_drag(&mut items, &PointerEvent::new(1.0, f64::INFINITY), t0 + ms(1))
        .expect_err("inf");
    assert!(matches!(err, Error::Geometry(GeometryError::NonFinitePointer { .. })));
    assert_eq!(grid.phase(), DragPhase::Armed);
}

#[test]
fn overflow_surfaces_as_capacity_error() {
    let config = GridConfig::default().with_gutter(10.0).with_max_rows(1);
    let mut grid = MasonryGrid::new(config).expect("valid config");
    let mut items = squares(5);
    let outcome = grid
        .compute_responsive_layout(&mut items, ContainerGeometry::new(0.0, 0.0, 430.0))
        .expect("measured");
    let report = outcome.report().expect("completed");
    let err = Error::capacity(report).expect("one item left over");
    assert_eq!(
        err,
        Error::Capacity {
            unplaced: vec![ItemId(5)],
            row_budget: 1,
        }
    );
    assert_eq!(err.degradation(), DegradationAction::KeepLayout);
}

// ============================================================================
// Responsive relayout
// ============================================================================

#[test]
fn breakpoints_repack_on_resize() {
    let config = GridConfig {
        columns: mgrid::ColumnPolicy::Breakpoints {
            rules: vec![
                mgrid::ColumnBreakpoint {
                    min_width: 0.0,
                    columns: 2,
                },
                mgrid::ColumnBreakpoint {
                    min_width: 400.0,
                    columns: 4,
                },
            ],
        },
        ..GridConfig::default().with_gutter(10.0)
    };
    let mut grid = MasonryGrid::new(config).expect("valid config");
    let mut items = squares(4);

    grid.compute_responsive_layout(&mut items, ContainerGeometry::new(0.0, 0.0, 430.0))
        .expect("measured");
    assert_eq!(grid.num_columns(), 4);
    assert_eq!(grid.grid_height(), 120.0);

    grid.compute_responsive_layout(&mut items, ContainerGeometry::new(0.0, 0.0, 210.0))
        .expect("measured");
    assert_eq!(grid.num_columns(), 2);
    assert_eq!(grid.cell_size(), 100.0);
    assert_eq!(cell_of(&grid, &items[2]), CellPos::new(1, 0));
    assert_eq!(grid.grid_height(), 230.0);
}

// ============================================================================
// Tracing
// ============================================================================

#[derive(Debug, Clone)]
struct CapturedEvent {
    level: tracing::Level,
    target: String,
    fields: HashMap<String, String>,
}

struct Capture {
    spans: Arc<Mutex<Vec<String>>>,
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

struct FieldVisitor(Vec<(String, String)>);

impl tracing::field::Visit for FieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        self.0.push((field.name().to_string(), format!("{value:?}")));
    }

    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.0.push((field.name().to_string(), value.to_string()));
    }
}

impl<S> tracing_subscriber::Layer<S> for Capture
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_new_span(
        &self,
        attrs: &tracing::span::Attributes<'_>,
        _id: &tracing::span::Id,
        _ctx: tracing_subscriber::layer::Context<'_, S>,
    ) {
        self.spans
            .lock()
            .unwrap()
            .push(attrs.metadata().name().to_string());
    }

    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let mut visitor = FieldVisitor(Vec::new());
        event.record(&mut visitor);
        self.events.lock().unwrap().push(CapturedEvent {
            level: *event.metadata().level(),
            target: event.metadata().target().to_string(),
            fields: visitor.0.into_iter().collect(),
        });
    }
}

fn with_capture<F: FnOnce()>(f: F) -> (Vec<String>, Vec<CapturedEvent>) {
    let spans = Arc::new(Mutex::new(Vec::new()));
    let events = Arc::new(Mutex::new(Vec::new()));
    let layer = Capture {
        spans: spans.clone(),
        events: events.clone(),
    };
    let subscriber = tracing_subscriber::registry().with(layer);
    tracing::subscriber::with_default(subscriber, f);
    let s = spans.lock().unwrap().clone();
    let e = events.lock().unwrap().clone();
    (s, e)
}

#[test]
fn passes_and_hook_failures_are_traced() {
    let (spans, events) = with_capture(|| {
        let hooks = Recorder {
            fail_on_end: true,
            ..Recorder::default()
        };
        let (mut grid, mut items) = setup(hooks, 4);
        let t0 = Instant::now();
        grab(&mut grid, &mut items, 1, t0)
            .expect("armed");
        grid.update_drag(&mut items, &PointerEvent::new(120.0, 5.0), t0 + ms(5))
            .expect("live");
        grid.end_drag(&mut items, t0 + ms(10));
    });

    // Initial full pass plus the commit pass.
    assert_eq!(spans.iter().filter(|name| *name == "mgrid.solve").count(), 2);

    let hook_warning = events
        .iter()
        .find(|event| event.level == tracing::Level::WARN && event.target == "mgrid.drag")
        .expect("hook failure logged");
    assert_eq!(
        hook_warning.fields.get("hook").map(String::as_str),
        Some("on_drag_end")
    );
    assert!(events.iter().any(|event| {
        event.target == "mgrid.drag"
            && event.fields.get("message").map(String::as_str) == Some("drag committed")
    }));
}

// ============================================================================
// Random gestures
// ============================================================================

proptest::proptest! {
    #![proptest_config(proptest::prelude::ProptestConfig::with_cases(64))]

    #[test]
    fn random_drops_settle_without_overlap(
        count in 2u64..=12,
        pick in 0u64..12,
        path in proptest::collection::vec((0.0f64..430.0, 0.0f64..500.0), 1..6),
        wait_between in proptest::bool::ANY,
    ) {
        let (mut grid, mut items) = setup(NoHooks, count);
        let id = pick % count + 1;
        let t0 = Instant::now();
        grab(&mut grid, &mut items, id, t0).expect("armed");

        let mut at = 0;
        for (x, y) in path {
            at += if wait_between { 30 } else { 3 };
            if !grid.tick(&mut items, t0 + ms(at)).phase.is_live() {
                break;
            }
            grid.update_drag(&mut items, &PointerEvent::new(x, y), t0 + ms(at))
                .expect("live");
        }
        let report = grid.end_drag(&mut items, t0 + ms(at + 1));
        proptest::prop_assert!(report.phase.is_terminal() || report.phase == DragPhase::Idle);
        grid.tick(&mut items, t0 + ms(at + 1000));

        proptest::prop_assert_eq!(grid.phase(), DragPhase::Idle);
        proptest::prop_assert!(items.iter().all(|item| !item.is_dragging));
        assert_no_overlap(&grid, &items);
    }
}
