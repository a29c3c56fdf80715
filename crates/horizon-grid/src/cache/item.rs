//! Cache of a single standalone item.

use std::fmt;
use std::sync::Arc;

use horizon_grid_core::PerfSpan;

use super::{CacheCore, CacheItem, CacheSpace};
use crate::change::ViewApplicationMask;
use crate::geometry::{Point, Rect};
use crate::item::ItemID;
use crate::space::{ItemSchema, Space};
use crate::view::{GuiContext, Painter};

/// Caches one item drawn at a fixed rectangle.
///
/// Used for cells rendered outside a grid, such as headers, drag previews
/// or an editor overlay.
pub struct CacheSpaceItem {
    core: CacheCore,
    item: ItemID,
    rect: Rect,
    gui_context: GuiContext,
    cached: Option<Option<Arc<CacheItem>>>,
}

impl CacheSpaceItem {
    pub fn new(space: Arc<Space>, item: ItemID, rect: Rect) -> Self {
        Self::with_view_application_mask(space, item, rect, ViewApplicationMask::DRAW)
    }

    pub fn with_view_application_mask(
        space: Arc<Space>,
        item: ItemID,
        rect: Rect,
        mask: ViewApplicationMask,
    ) -> Self {
        Self {
            core: CacheCore::new(space, mask),
            item,
            rect,
            gui_context: GuiContext::default(),
            cached: None,
        }
    }

    pub fn item(&self) -> ItemID {
        self.item
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Move the item; its views are laid out again on the next read.
    pub fn set_rect(&mut self, rect: Rect) {
        if self.rect != rect {
            self.rect = rect;
            self.clear_items_cache();
        }
    }
}

impl CacheSpace for CacheSpaceItem {
    fn space(&self) -> &Arc<Space> {
        &self.core.space
    }

    fn schemas(&self) -> &[ItemSchema] {
        self.core.schemas()
    }

    fn cache_item(&mut self, item: ItemID) -> Option<Arc<CacheItem>> {
        if item != self.item {
            return None;
        }
        self.validate_items_cache();

        if let Some(cached) = &self.cached {
            return cached.clone();
        }

        let resolved = self
            .core
            .resolve(self.item, self.rect, &self.gui_context)
            .map(Arc::new);
        self.cached = Some(resolved.clone());
        resolved
    }

    fn cache_item_by_position(&mut self, point: Point) -> Option<Arc<CacheItem>> {
        if !self.rect.contains(point) {
            return None;
        }
        self.cache_item(self.item)
    }

    fn clear_items_cache(&mut self) {
        self.cached = None;
    }

    fn validate_items_cache(&mut self) {
        if self.core.validate_structure() {
            self.clear_items_cache();
        }
    }

    fn invalidate_items_cache_structure(&mut self) {
        self.core.invalidate_structure();
    }

    fn draw(&mut self, painter: &mut dyn Painter, ctx: &GuiContext) {
        let _span = PerfSpan::new("cache_space_item_draw");
        if self.gui_context != *ctx {
            self.gui_context = *ctx;
            self.clear_items_cache();
        }
        self.core.take_repaint_request();

        if let Some(cache_item) = self.cache_item(self.item) {
            cache_item.draw(self.core.schemas(), painter, ctx);
        }
    }

    fn take_repaint_request(&self) -> bool {
        self.core.take_repaint_request()
    }
}

impl fmt::Debug for CacheSpaceItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheSpaceItem")
            .field("core", &self.core)
            .field("item", &self.item)
            .field("rect", &self.rect)
            .field("cached", &self.cached.is_some())
            .finish()
    }
}
