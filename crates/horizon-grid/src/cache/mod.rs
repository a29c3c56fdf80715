//! The cache layer.
//!
//! A cache memoizes, per item, which views render the item and where. It is
//! built over a [`Space`] and kept consistent with it through
//! [`Space::changed`]:
//!
//! - a structural change marks the cache's schema snapshot stale; the next
//!   read rebuilds the snapshot and drops every resolved item,
//! - a content change only raises a repaint request; resolved items are kept.
//!
//! The change handler does nothing but flip flags. All reconciliation happens
//! in [`CacheSpace::validate_items_cache`], which every read runs first, so a
//! resolution in progress is never disturbed by notifications it triggers.
//!
//! Resolved items refer to schemas by index into the cache's snapshot of
//! [`Space::schemas_ordered`]. The snapshot is replaced only during
//! validation, together with the items that index it.

mod grid;
mod item;

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use horizon_grid_core::ConnectionId;
use horizon_grid_core::logging::targets;

use crate::change::{ChangeReason, ViewApplicationMask};
use crate::controller::{ControllerContext, MouseEvent};
use crate::geometry::{Point, Rect};
use crate::item::ItemID;
use crate::layout::Layout;
use crate::space::{ItemSchema, Space, ViewSchema, view_schema_for_item};
use crate::view::{CacheContext, GuiContext, Painter, View, ViewSizeMode};

pub use grid::CacheSpaceGrid;
pub use item::CacheSpaceItem;

/// One placed view of a cached item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheView {
    schema: usize,
    rect: Rect,
}

impl CacheView {
    /// Index of the view's schema in the cache's schema snapshot.
    pub fn schema(&self) -> usize {
        self.schema
    }

    /// Rectangle of the view in space coordinates.
    pub fn rect(&self) -> Rect {
        self.rect
    }
}

/// The resolved views of one item and their rectangles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheItem {
    item: ItemID,
    rect: Rect,
    views: Vec<CacheView>,
    composite: bool,
}

impl CacheItem {
    pub fn item(&self) -> ItemID {
        self.item
    }

    /// Rectangle of the whole item in space coordinates.
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Placed views in draw order (topmost last).
    pub fn views(&self) -> &[CacheView] {
        &self.views
    }

    /// Returns `true` if several schemas were composed for this item.
    pub fn is_composite(&self) -> bool {
        self.composite
    }

    /// Views under `point`, topmost first.
    pub fn views_at(&self, point: Point) -> impl Iterator<Item = &CacheView> {
        self.views
            .iter()
            .rev()
            .filter(move |view| view.rect.contains(point))
    }

    /// Draw every placed view.
    pub fn draw(&self, schemas: &[ItemSchema], painter: &mut dyn Painter, ctx: &GuiContext) {
        for view in &self.views {
            let Some(schema) = schemas.get(view.schema) else {
                continue;
            };
            let cache = CacheContext {
                item: self.item,
                item_rect: self.rect,
                view_rect: view.rect,
            };
            schema.view.draw(painter, ctx, &cache);
        }
    }
}

/// A cache of resolved items over a space.
pub trait CacheSpace {
    /// The space the cache resolves against.
    fn space(&self) -> &Arc<Space>;

    /// The schema snapshot resolved items index into.
    ///
    /// Empty until the cache was validated once.
    fn schemas(&self) -> &[ItemSchema];

    /// The resolved item, computing it if it is not cached.
    ///
    /// Returns `None` for items outside the cache's area and for items no
    /// schema applies to.
    fn cache_item(&mut self, item: ItemID) -> Option<Arc<CacheItem>>;

    /// The resolved item whose rectangle contains `point`.
    fn cache_item_by_position(&mut self, point: Point) -> Option<Arc<CacheItem>>;

    /// Drop every resolved item. The schema snapshot is kept.
    fn clear_items_cache(&mut self);

    /// Reconcile the cache with the space. Validating a valid cache does
    /// nothing.
    fn validate_items_cache(&mut self);

    /// Mark the schema snapshot stale; the next validation rebuilds it and
    /// drops every resolved item.
    fn invalidate_items_cache_structure(&mut self);

    /// Draw the cached items. Items without views are skipped.
    fn draw(&mut self, painter: &mut dyn Painter, ctx: &GuiContext);

    /// Returns `true` once after the space reported a change.
    fn take_repaint_request(&self) -> bool;

    /// Tooltip of the topmost view under `point` that provides one.
    fn tooltip_text(&mut self, point: Point) -> Option<String> {
        let cache_item = self.cache_item_by_position(point)?;
        let schemas = self.schemas();
        cache_item.views_at(point).find_map(|view| {
            let schema = schemas.get(view.schema)?;
            if !schema.view.is_applicable(ViewApplicationMask::TOOLTIP) {
                return None;
            }
            schema.view.tooltip_text(cache_item.item)
        })
    }

    /// Offer `event` to the views under its position, topmost first, until
    /// one claims it.
    fn dispatch_mouse_event(&mut self, event: &MouseEvent) -> bool {
        let Some(cache_item) = self.cache_item_by_position(event.position) else {
            return false;
        };
        let schemas = self.schemas();
        let claimed = cache_item.views_at(event.position).any(|view| {
            let Some(schema) = schemas.get(view.schema) else {
                return false;
            };
            if !schema.view.is_applicable(ViewApplicationMask::MOUSE) {
                return false;
            }
            let ctx = ControllerContext {
                item: cache_item.item,
                view_rect: view.rect,
            };
            schema.view.process_mouse_event(event, &ctx)
        });
        tracing::trace!(target: targets::CACHE, item = %cache_item.item, claimed, "mouse event dispatched");
        claimed
    }
}

/// Flags raised by the space change handler.
#[derive(Debug)]
struct CacheFlags {
    structure_stale: AtomicBool,
    repaint: AtomicBool,
}

/// State shared by the cache implementations: the space connection and the
/// schema snapshot.
struct CacheCore {
    space: Arc<Space>,
    mask: ViewApplicationMask,
    flags: Arc<CacheFlags>,
    connection: ConnectionId,
    schemas: Option<Arc<[ItemSchema]>>,
}

impl CacheCore {
    fn new(space: Arc<Space>, mask: ViewApplicationMask) -> Self {
        let flags = Arc::new(CacheFlags {
            structure_stale: AtomicBool::new(true),
            repaint: AtomicBool::new(true),
        });

        let handler_flags = Arc::clone(&flags);
        let connection = space.changed().connect(move |reason: &ChangeReason| {
            tracing::trace!(target: targets::CACHE, ?reason, "space change received");
            if reason.is_structural() {
                handler_flags.structure_stale.store(true, Ordering::Release);
            }
            handler_flags.repaint.store(true, Ordering::Release);
        });

        Self {
            space,
            mask,
            flags,
            connection,
            schemas: None,
        }
    }

    fn schemas(&self) -> &[ItemSchema] {
        self.schemas.as_deref().unwrap_or_default()
    }

    fn invalidate_structure(&self) {
        self.flags.structure_stale.store(true, Ordering::Release);
    }

    fn take_repaint_request(&self) -> bool {
        self.flags.repaint.swap(false, Ordering::AcqRel)
    }

    /// Refresh the schema snapshot if it is stale.
    ///
    /// Returns `true` if the snapshot was replaced; resolved items must then
    /// be dropped by the caller.
    fn validate_structure(&mut self) -> bool {
        let stale = self.flags.structure_stale.swap(false, Ordering::AcqRel);
        if !stale && self.schemas.is_some() {
            return false;
        }

        let schemas = self.space.schemas_ordered();
        tracing::trace!(target: targets::CACHE, schemas = schemas.len(), "schema snapshot rebuilt");
        self.schemas = Some(schemas);
        true
    }

    /// Resolve `item` placed at `item_rect`.
    fn resolve(&self, item: ItemID, item_rect: Rect, ctx: &GuiContext) -> Option<CacheItem> {
        let schemas = self.schemas();
        let mask = self.mask | self.space.view_application_mask();

        let (views, composite) = match view_schema_for_item(item, mask, schemas) {
            ViewSchema::Empty => {
                tracing::trace!(target: targets::CACHE, %item, "nothing to cache");
                return None;
            }
            ViewSchema::Single(index) => {
                let schema = &schemas[index];
                let mut remaining = item_rect;
                let mut view_rect = Rect::ZERO;
                let placed = schema.layout.do_layout(
                    schema.view.as_ref(),
                    ctx,
                    item,
                    ViewSizeMode::Exact,
                    &mut view_rect,
                    &mut remaining,
                );
                let views = if placed {
                    vec![CacheView {
                        schema: index,
                        rect: view_rect,
                    }]
                } else {
                    Vec::new()
                };
                (views, false)
            }
            ViewSchema::Composite(composite) => {
                let views = composite
                    .layout_parts(schemas, ctx, item, item_rect)
                    .into_iter()
                    .map(|(schema, rect)| CacheView { schema, rect })
                    .collect();
                (views, true)
            }
        };

        tracing::trace!(target: targets::CACHE, %item, views = views.len(), composite, "item resolved");
        Some(CacheItem {
            item,
            rect: item_rect,
            views,
            composite,
        })
    }
}

impl Drop for CacheCore {
    fn drop(&mut self) {
        if let Err(err) = self.space.changed().disconnect(self.connection) {
            tracing::warn!(target: targets::CACHE, %err, "cache was already disconnected from its space");
        }
    }
}

impl fmt::Debug for CacheCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheCore")
            .field("mask", &self.mask)
            .field("flags", &self.flags)
            .field("schemas", &self.schemas.as_ref().map(|schemas| schemas.len()))
            .finish()
    }
}
