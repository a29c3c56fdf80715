//! End-to-end tests of the mutate, notify, invalidate, recompute flow.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use horizon_grid::{
    CacheSpace, CacheSpaceGrid, ChangeReason, Color, GuiContext, ItemID, LayoutBackground,
    LayoutClient, LayoutSide, ModelCallback, Painter, Range, RangeAll, RangeColumn, Rect, Signal,
    Space, UniformGrid, View, ViewApplicationMask, ViewColor, ViewText,
};
use parking_lot::Mutex;

/// A range over every cell that counts membership tests.
#[derive(Default)]
struct CountingRange {
    tests: AtomicUsize,
    changed: Signal<ChangeReason>,
}

impl CountingRange {
    fn tests(&self) -> usize {
        self.tests.load(Ordering::SeqCst)
    }
}

impl Range for CountingRange {
    fn has_item(&self, _item: ItemID) -> bool {
        self.tests.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn changed(&self) -> &Signal<ChangeReason> {
        &self.changed
    }
}

#[derive(Default)]
struct Recorder {
    fills: Vec<(Rect, Color)>,
    texts: Vec<(Rect, String)>,
}

impl Painter for Recorder {
    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.fills.push((rect, color));
    }

    fn draw_text(&mut self, rect: Rect, text: &str) {
        self.texts.push((rect, text.to_string()));
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("horizon_grid=trace")
        .with_test_writer()
        .try_init();
}

struct Fixture {
    space: Arc<Space>,
    range: Arc<CountingRange>,
    background: Arc<ViewColor>,
    side: Arc<LayoutSide>,
    cache: CacheSpaceGrid,
}

/// A 2x2 window over a grid with a colored background and a side text.
fn fixture() -> Fixture {
    init_tracing();

    let space = Arc::new(Space::new());
    let range = Arc::new(CountingRange::default());
    let background = Arc::new(ViewColor::new(Color::WHITE));
    let side = Arc::new(LayoutSide::left());
    let labels = Arc::new(ModelCallback::new(|item: ItemID| item.row.to_string()));

    space.add_schema(range.clone(), background.clone(), Arc::new(LayoutBackground::new()));
    space.add_schema(Arc::new(RangeAll::new()), Arc::new(ViewText::new(labels)), side.clone());

    let mut cache = CacheSpaceGrid::new(space.clone(), Arc::new(UniformGrid::new(10, 10, 16, 40)));
    cache.set_window(Rect::new(0, 0, 80, 32));

    Fixture {
        space,
        range,
        background,
        side,
        cache,
    }
}

#[test]
fn test_content_change_repaints_without_resolution() {
    let mut f = fixture();
    let mut painter = Recorder::default();
    f.cache.draw(&mut painter, &GuiContext::default());

    let tests_after_first_draw = f.range.tests();
    assert_eq!(tests_after_first_draw, 4);
    assert!(!f.cache.take_repaint_request());

    f.background.set_color(Color::BLACK);
    assert!(f.cache.take_repaint_request());

    let mut painter = Recorder::default();
    f.cache.draw(&mut painter, &GuiContext::default());

    assert_eq!(f.range.tests(), tests_after_first_draw);
    assert!(painter.fills.iter().all(|(_, color)| *color == Color::BLACK));
    assert_eq!(painter.fills.len(), 4);
}

#[test]
fn test_layout_change_forces_resolution() {
    let mut f = fixture();
    let before = f.cache.cache_item(ItemID::new(0, 0)).unwrap();
    let tests = f.range.tests();

    f.side.set_margin(2);
    assert!(f.cache.take_repaint_request());

    let after = f.cache.cache_item(ItemID::new(0, 0)).unwrap();
    assert!(f.range.tests() > tests);
    assert!(!Arc::ptr_eq(&before, &after));

    // text "0" is 8 pixels wide, plus the margin on both sides
    assert_eq!(before.views()[1].rect(), Rect::new(0, 0, 8, 16));
    assert_eq!(after.views()[1].rect(), Rect::new(2, 0, 8, 16));
}

#[test]
fn test_validate_is_idempotent() {
    let mut f = fixture();
    f.cache.validate_items_cache();
    let item = f.cache.cache_item(ItemID::new(1, 1)).unwrap();
    let tests = f.range.tests();

    f.cache.validate_items_cache();
    f.cache.validate_items_cache();

    let again = f.cache.cache_item(ItemID::new(1, 1)).unwrap();
    assert!(Arc::ptr_eq(&item, &again));
    assert_eq!(f.range.tests(), tests);
}

#[test]
fn test_clear_keeps_schema_snapshot() {
    let mut f = fixture();
    f.cache.validate_items_cache();
    let snapshot = f.space.schemas_ordered();
    let before = f.cache.cache_item(ItemID::new(0, 0)).unwrap();

    f.cache.clear_items_cache();
    let after = f.cache.cache_item(ItemID::new(0, 0)).unwrap();

    assert!(!Arc::ptr_eq(&before, &after));
    assert_eq!(*before, *after);
    assert!(Arc::ptr_eq(&snapshot, &f.space.schemas_ordered()));
}

#[test]
fn test_composite_follows_draw_order() {
    let mut f = fixture();
    let item = f.cache.cache_item(ItemID::new(0, 0)).unwrap();

    assert!(item.is_composite());
    let schemas = f.cache.schemas();
    let order: Vec<bool> = item
        .views()
        .iter()
        .map(|view| schemas[view.schema()].layout.is_final())
        .collect();
    assert_eq!(order, vec![false, false]);

    f.space.add_schema(
        Arc::new(RangeColumn::new(0)),
        Arc::new(ViewColor::new(Color::from_rgb8(255, 0, 0))),
        Arc::new(LayoutClient::new()),
    );
    f.space.add_schema(
        Arc::new(RangeColumn::new(0)),
        Arc::new(ViewColor::new(Color::from_rgb8(0, 0, 255))),
        Arc::new(LayoutBackground::new()),
    );

    let item = f.cache.cache_item(ItemID::new(0, 0)).unwrap();
    let schemas = f.cache.schemas();
    let finals: Vec<bool> = item
        .views()
        .iter()
        .map(|view| schemas[view.schema()].layout.is_final())
        .collect();
    assert_eq!(finals, vec![false, false, false, true]);
}

#[test]
fn test_excluding_a_view_changes_membership() {
    let mut f = fixture();
    assert_eq!(f.cache.cache_item(ItemID::new(0, 0)).unwrap().views().len(), 2);

    f.background
        .base()
        .set_exclude_application_mask(ViewApplicationMask::DRAW);

    let item = f.cache.cache_item(ItemID::new(0, 0)).unwrap();
    assert!(!item.is_composite());
    assert_eq!(item.views().len(), 1);
}

#[test]
fn test_removed_schema_is_no_longer_drawn() {
    let mut f = fixture();
    let background: Arc<dyn View> = f.background.clone();
    assert!(f.space.remove_schema(&background));
    assert!(!f.space.remove_schema(&background));

    let mut painter = Recorder::default();
    f.cache.draw(&mut painter, &GuiContext::default());
    assert!(painter.fills.is_empty());
    assert_eq!(painter.texts.len(), 4);
}

#[test]
fn test_events_reach_cache_synchronously() {
    let f = fixture();
    let received = Arc::new(Mutex::new(Vec::new()));
    let received_clone = received.clone();
    let id = f
        .space
        .changed()
        .connect(move |reason| received_clone.lock().push(*reason));

    f.background.set_color(Color::BLACK);
    f.side.set_margin(1);

    assert_eq!(
        *received.lock(),
        vec![
            ChangeReason::VIEW_CONTENT | ChangeReason::SPACE_ITEMS_CONTENT,
            ChangeReason::LAYOUT | ChangeReason::SPACE_ITEMS_STRUCTURE,
        ]
    );
    f.space.changed().disconnect(id).unwrap();
}
