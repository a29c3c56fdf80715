//! Cache over a grid viewport.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use horizon_grid_core::PerfSpan;
use horizon_grid_core::logging::targets;

use super::{CacheCore, CacheItem, CacheSpace};
use crate::change::ViewApplicationMask;
use crate::geometry::{Point, Rect};
use crate::item::ItemID;
use crate::space::{GridGeometry, ItemSchema, Space};
use crate::view::{GuiContext, Painter};

/// Caches the items of a grid visible through a window.
///
/// Item rectangles are kept in space coordinates, so moving the window only
/// recomputes which items are visible; items visible before and after the
/// move keep their resolution. Items that scroll out of view are dropped on
/// the next validation.
pub struct CacheSpaceGrid {
    core: CacheCore,
    geometry: Arc<dyn GridGeometry>,
    gui_context: GuiContext,
    window: Rect,
    visible: Option<Vec<ItemID>>,
    items: HashMap<ItemID, Option<Arc<CacheItem>>>,
}

impl CacheSpaceGrid {
    /// Create a cache resolving views for drawing.
    pub fn new(space: Arc<Space>, geometry: Arc<dyn GridGeometry>) -> Self {
        Self::with_view_application_mask(space, geometry, ViewApplicationMask::DRAW)
    }

    /// Create a cache resolving views applicable to `mask`.
    pub fn with_view_application_mask(
        space: Arc<Space>,
        geometry: Arc<dyn GridGeometry>,
        mask: ViewApplicationMask,
    ) -> Self {
        Self {
            core: CacheCore::new(space, mask),
            geometry,
            gui_context: GuiContext::default(),
            window: Rect::ZERO,
            visible: None,
            items: HashMap::new(),
        }
    }

    pub fn window(&self) -> Rect {
        self.window
    }

    /// Move or resize the viewport.
    pub fn set_window(&mut self, window: Rect) {
        if self.window != window {
            self.window = window;
            self.visible = None;
        }
    }

    pub fn geometry(&self) -> &Arc<dyn GridGeometry> {
        &self.geometry
    }

    /// Replace the grid geometry; every item rectangle is recomputed.
    pub fn set_geometry(&mut self, geometry: Arc<dyn GridGeometry>) {
        self.geometry = geometry;
        self.clear_items_cache();
    }

    pub fn gui_context(&self) -> &GuiContext {
        &self.gui_context
    }

    /// Items visible through the window, in row-major order.
    pub fn visible_items(&mut self) -> &[ItemID] {
        self.validate_items_cache();
        self.visible.as_deref().unwrap_or_default()
    }

    /// Number of items with a cached resolution.
    pub fn cached_item_count(&self) -> usize {
        self.items.len()
    }

    fn set_gui_context(&mut self, ctx: &GuiContext) {
        if self.gui_context != *ctx {
            tracing::trace!(target: targets::CACHE, "gui context changed");
            self.gui_context = *ctx;
            self.clear_items_cache();
        }
    }
}

impl CacheSpace for CacheSpaceGrid {
    fn space(&self) -> &Arc<Space> {
        &self.core.space
    }

    fn schemas(&self) -> &[ItemSchema] {
        self.core.schemas()
    }

    fn cache_item(&mut self, item: ItemID) -> Option<Arc<CacheItem>> {
        self.validate_items_cache();

        if let Some(cached) = self.items.get(&item) {
            return cached.clone();
        }

        let rect = self.geometry.item_rect(item)?;
        let resolved = self
            .core
            .resolve(item, rect, &self.gui_context)
            .map(Arc::new);
        self.items.insert(item, resolved.clone());
        resolved
    }

    fn cache_item_by_position(&mut self, point: Point) -> Option<Arc<CacheItem>> {
        self.validate_items_cache();

        let cached = self
            .items
            .values()
            .flatten()
            .find(|cache_item| cache_item.rect().contains(point));
        if let Some(cache_item) = cached {
            return Some(Arc::clone(cache_item));
        }

        let item = self.geometry.item_at(point)?;
        self.cache_item(item)
    }

    fn clear_items_cache(&mut self) {
        self.items.clear();
        self.visible = None;
    }

    fn validate_items_cache(&mut self) {
        if self.core.validate_structure() {
            self.clear_items_cache();
        }

        if self.visible.is_some() {
            return;
        }

        let visible = self.geometry.visible_items(self.window);
        let visible_set: HashSet<ItemID> = visible.iter().copied().collect();
        self.items.retain(|item, _| visible_set.contains(item));

        tracing::trace!(
            target: targets::CACHE,
            visible = visible.len(),
            retained = self.items.len(),
            "visible items recomputed"
        );
        self.visible = Some(visible);
    }

    fn invalidate_items_cache_structure(&mut self) {
        self.core.invalidate_structure();
    }

    fn draw(&mut self, painter: &mut dyn Painter, ctx: &GuiContext) {
        let _span = PerfSpan::new("cache_space_grid_draw");
        self.set_gui_context(ctx);
        self.validate_items_cache();
        self.core.take_repaint_request();

        let visible = self.visible.clone().unwrap_or_default();
        for item in visible {
            if let Some(cache_item) = self.cache_item(item) {
                cache_item.draw(self.core.schemas(), painter, ctx);
            }
        }
    }

    fn take_repaint_request(&self) -> bool {
        self.core.take_repaint_request()
    }
}

impl fmt::Debug for CacheSpaceGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheSpaceGrid")
            .field("core", &self.core)
            .field("window", &self.window)
            .field("visible", &self.visible.as_ref().map(Vec::len))
            .field("items", &self.items.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Color;
    use crate::layout::LayoutClient;
    use crate::range::{RangeAll, RangeColumn};
    use crate::space::UniformGrid;
    use crate::view::ViewColor;

    #[derive(Default)]
    struct Fills(Vec<(Rect, Color)>);

    impl Painter for Fills {
        fn fill_rect(&mut self, rect: Rect, color: Color) {
            self.0.push((rect, color));
        }

        fn draw_text(&mut self, _rect: Rect, _text: &str) {}
    }

    fn cache() -> (Arc<Space>, CacheSpaceGrid) {
        let space = Arc::new(Space::new());
        space.add_schema(
            Arc::new(RangeColumn::new(1)),
            Arc::new(ViewColor::new(Color::WHITE)),
            Arc::new(LayoutClient::new()),
        );
        let grid = Arc::new(UniformGrid::new(100, 10, 20, 50));
        let cache = CacheSpaceGrid::new(space.clone(), grid);
        (space, cache)
    }

    #[test]
    fn test_cache_item_is_memoized() {
        let (_space, mut cache) = cache();

        let first = cache.cache_item(ItemID::new(0, 1)).unwrap();
        let second = cache.cache_item(ItemID::new(0, 1)).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.rect(), Rect::new(50, 0, 50, 20));

        assert!(cache.cache_item(ItemID::new(0, 0)).is_none());
        assert!(cache.cache_item(ItemID::new(500, 1)).is_none());
    }

    #[test]
    fn test_draw_visible_items() {
        let (_space, mut cache) = cache();
        cache.set_window(Rect::new(0, 0, 100, 40));

        let mut painter = Fills::default();
        cache.draw(&mut painter, &GuiContext::default());

        assert_eq!(
            painter.0,
            vec![
                (Rect::new(50, 0, 50, 20), Color::WHITE),
                (Rect::new(50, 20, 50, 20), Color::WHITE),
            ]
        );
        assert_eq!(cache.visible_items().len(), 4);
    }

    #[test]
    fn test_scrolling_keeps_overlapping_items() {
        let (_space, mut cache) = cache();
        cache.set_window(Rect::new(0, 0, 100, 40));
        let kept = cache.cache_item(ItemID::new(1, 1)).unwrap();
        cache.cache_item(ItemID::new(0, 1)).unwrap();

        cache.set_window(Rect::new(0, 20, 100, 40));
        cache.validate_items_cache();

        assert_eq!(cache.cached_item_count(), 1);
        let again = cache.cache_item(ItemID::new(1, 1)).unwrap();
        assert!(Arc::ptr_eq(&kept, &again));
    }

    #[test]
    fn test_cache_item_by_position() {
        let (_space, mut cache) = cache();
        cache.set_window(Rect::new(0, 0, 500, 100));

        let item = cache.cache_item_by_position(Point::new(60, 45)).unwrap();
        assert_eq!(item.item(), ItemID::new(2, 1));
        assert!(cache.cache_item_by_position(Point::new(10, 45)).is_none());
        assert!(cache.cache_item_by_position(Point::new(-5, 0)).is_none());
    }

    #[test]
    fn test_structure_change_drops_items() {
        let (space, mut cache) = cache();
        let before = cache.cache_item(ItemID::new(0, 1)).unwrap();

        space.add_schema(
            Arc::new(RangeAll::new()),
            Arc::new(ViewColor::new(Color::BLACK)),
            Arc::new(LayoutClient::new()),
        );

        let after = cache.cache_item(ItemID::new(0, 1)).unwrap();
        assert!(!Arc::ptr_eq(&before, &after));
        assert!(after.is_composite());
        assert!(cache.cache_item(ItemID::new(0, 0)).is_some());
    }

    #[test]
    fn test_invalidate_structure_rebuilds_on_next_read() {
        let (_space, mut cache) = cache();
        let before = cache.cache_item(ItemID::new(0, 1)).unwrap();

        cache.invalidate_items_cache_structure();
        let after = cache.cache_item(ItemID::new(0, 1)).unwrap();

        assert!(!Arc::ptr_eq(&before, &after));
        assert_eq!(*before, *after);
    }
}
