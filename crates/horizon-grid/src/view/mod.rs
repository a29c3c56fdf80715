//! Views render cells.
//!
//! A [`View`] draws one cell inside the rectangle its layout assigned, reports
//! a size hint, and optionally answers tooltip and mouse queries. The shared
//! state every view carries (change signal, exclude mask, controller slot,
//! tooltip override) lives in a [`ViewBase`] the view exposes through
//! [`View::base`].
//!
//! Views announce their mutations on `changed`:
//!
//! - anything that affects the size hint includes [`ChangeReason::VIEW_SIZE`],
//!   which the owning space escalates to a structural change,
//! - pure appearance changes use [`ChangeReason::VIEW_CONTENT`] (or
//!   [`ChangeReason::VIEW_CONTROLLER`]) and only trigger a repaint,
//! - a view whose size hint depends on its model forwards model changes as
//!   [`ChangeReason::MODEL`] together with [`ChangeReason::VIEW_SIZE`].

mod color;
mod text;

use std::fmt;
use std::sync::Arc;

use horizon_grid_core::logging::targets;
use horizon_grid_core::{Property, Signal};
use parking_lot::RwLock;

use crate::change::{ChangeReason, ViewApplicationMask};
use crate::controller::{ControllerContext, ControllerMouse, MouseEvent, ViewController};
use crate::geometry::{Color, Rect, Size};
use crate::item::ItemID;

pub use color::ViewColor;
pub use text::ViewText;

/// How precisely a size is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewSizeMode {
    /// The size the view needs to draw its content exactly.
    #[default]
    Exact,
    /// A cheaper estimate used for layout hints.
    Hint,
}

/// Font metrics and other environment the views are measured and drawn in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GuiContext {
    /// Advance of one character in pixels.
    pub char_width: i32,
    /// Height of one text line in pixels.
    pub line_height: i32,
}

impl Default for GuiContext {
    fn default() -> Self {
        Self {
            char_width: 8,
            line_height: 16,
        }
    }
}

/// The drawing backend the views paint through.
pub trait Painter {
    /// Fill a rectangle with a solid color.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Draw a single line of text clipped to `rect`.
    fn draw_text(&mut self, rect: Rect, text: &str);
}

/// Placement of a view while it is being drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheContext {
    /// The cell being drawn.
    pub item: ItemID,
    /// The full rectangle of the cell.
    pub item_rect: Rect,
    /// The part of the cell assigned to this view by its layout.
    pub view_rect: Rect,
}

type TooltipCallback = Arc<dyn Fn(ItemID) -> Option<String> + Send + Sync>;

/// State shared by every view.
pub struct ViewBase {
    changed: Arc<Signal<ChangeReason>>,
    exclude_mask: Property<ViewApplicationMask>,
    controller: RwLock<Option<ViewController>>,
    tooltip: RwLock<Option<TooltipCallback>>,
}

impl Default for ViewBase {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewBase {
    pub fn new() -> Self {
        Self {
            changed: Arc::new(Signal::new()),
            exclude_mask: Property::new(ViewApplicationMask::NONE),
            controller: RwLock::new(None),
            tooltip: RwLock::new(None),
        }
    }

    /// Signal emitted when the view changes.
    pub fn changed(&self) -> &Signal<ChangeReason> {
        &self.changed
    }

    /// Shared handle to the change signal, for forwarding from collaborators.
    pub(crate) fn changed_handle(&self) -> Arc<Signal<ChangeReason>> {
        Arc::clone(&self.changed)
    }

    /// Emit a change of this view.
    pub fn emit_changed(&self, reason: ChangeReason) {
        self.changed.emit(reason);
    }

    pub fn exclude_application_mask(&self) -> ViewApplicationMask {
        self.exclude_mask.get()
    }

    /// Exclude the view from some applications (drawing, mouse, tooltips...).
    ///
    /// Applicability decides schema membership, so this is reported as a size
    /// change too.
    pub fn set_exclude_application_mask(&self, mask: ViewApplicationMask) {
        if self.exclude_mask.set(mask) {
            self.emit_changed(ChangeReason::VIEW_APPLICATION | ChangeReason::VIEW_SIZE);
        }
    }

    /// Returns `true` if the view takes part in `mask`.
    pub fn is_applicable(&self, mask: ViewApplicationMask) -> bool {
        !self.exclude_mask.get().intersects(mask)
    }

    /// Returns a snapshot of the controller slot.
    pub fn controller(&self) -> Option<ViewController> {
        self.controller.read().clone()
    }

    /// Replace the controller slot with a single controller (or none).
    pub fn set_controller(&self, controller: Option<Arc<dyn ControllerMouse>>) {
        {
            let mut slot = self.controller.write();
            let unchanged = match (&*slot, &controller) {
                (None, None) => true,
                (Some(ViewController::Single(current)), Some(new)) => Arc::ptr_eq(current, new),
                _ => false,
            };
            if unchanged {
                return;
            }
            *slot = controller.map(ViewController::Single);
        }
        self.emit_changed(ChangeReason::VIEW_CONTROLLER);
    }

    /// Add a controller after the ones already installed.
    ///
    /// The first controller occupies the slot alone; the second one upgrades
    /// the slot to a multiplexer.
    pub fn add_controller(&self, controller: Arc<dyn ControllerMouse>) {
        {
            let mut slot = self.controller.write();
            *slot = Some(match slot.take() {
                None => ViewController::Single(controller),
                Some(current) => current.with_added(controller),
            });
        }
        self.emit_changed(ChangeReason::VIEW_CONTROLLER);
    }

    /// Offer a mouse event to the controller slot.
    pub fn process_mouse_event(&self, event: &MouseEvent, ctx: &ControllerContext) -> bool {
        // dispatch on a snapshot so controllers may modify the slot
        let Some(controller) = self.controller() else {
            return false;
        };
        let claimed = controller.process_event(event, ctx);
        tracing::trace!(target: targets::VIEW, item = %ctx.item, claimed, "mouse event dispatched");
        claimed
    }

    /// Override tooltips of the view with a fixed text.
    pub fn set_tooltip_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.set_tooltip_callback(move |_| Some(text.clone()));
    }

    /// Override tooltips of the view with a callback.
    pub fn set_tooltip_callback<F>(&self, callback: F)
    where
        F: Fn(ItemID) -> Option<String> + Send + Sync + 'static,
    {
        *self.tooltip.write() = Some(Arc::new(callback));
        self.emit_changed(ChangeReason::VIEW_CONTENT);
    }

    fn tooltip_override(&self) -> Option<TooltipCallback> {
        self.tooltip.read().clone()
    }
}

impl fmt::Debug for ViewBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewBase")
            .field("exclude_mask", &self.exclude_mask.get())
            .field("controller", &*self.controller.read())
            .field("has_tooltip", &self.tooltip.read().is_some())
            .finish()
    }
}

/// Renders a cell.
///
/// Implementors provide [`base`](Self::base) and [`draw`](Self::draw); the
/// remaining methods have defaults built on the base.
pub trait View: Send + Sync {
    /// The shared view state.
    fn base(&self) -> &ViewBase;

    /// Draw the view for `cache.item` inside `cache.view_rect`.
    fn draw(&self, painter: &mut dyn Painter, ctx: &GuiContext, cache: &CacheContext);

    /// The size the view wants for `item`.
    fn size(&self, _ctx: &GuiContext, _item: ItemID, _mode: ViewSizeMode) -> Size {
        Size::ZERO
    }

    /// Tooltip provided by the view itself, used when no override is set.
    fn view_tooltip_text(&self, _item: ItemID) -> Option<String> {
        None
    }

    /// Signal emitted when the view changes.
    fn changed(&self) -> &Signal<ChangeReason> {
        self.base().changed()
    }

    /// Returns `true` if the view takes part in `mask`.
    fn is_applicable(&self, mask: ViewApplicationMask) -> bool {
        self.base().is_applicable(mask)
    }

    /// Tooltip for `item`: the override if one is set, else the view's own.
    fn tooltip_text(&self, item: ItemID) -> Option<String> {
        match self.base().tooltip_override() {
            Some(callback) => callback(item),
            None => self.view_tooltip_text(item),
        }
    }

    /// Offer a mouse event to the view's controllers.
    fn process_mouse_event(&self, event: &MouseEvent, ctx: &ControllerContext) -> bool {
        self.base().process_mouse_event(event, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{MouseButton, MouseEventKind};
    use crate::geometry::Point;
    use parking_lot::Mutex;

    struct Claim(bool);

    impl ControllerMouse for Claim {
        fn process_event(&self, _event: &MouseEvent, _ctx: &ControllerContext) -> bool {
            self.0
        }
    }

    fn record(view: &dyn View) -> (Arc<Mutex<Vec<ChangeReason>>>, horizon_grid_core::ConnectionId) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        let id = view
            .changed()
            .connect(move |reason| received_clone.lock().push(*reason));
        (received, id)
    }

    #[test]
    fn test_exclude_mask() {
        let view = ViewColor::new(Color::WHITE);
        assert!(view.is_applicable(ViewApplicationMask::DRAW));

        view.base().set_exclude_application_mask(ViewApplicationMask::TOOLTIP);
        assert!(view.is_applicable(ViewApplicationMask::DRAW));
        assert!(!view.is_applicable(ViewApplicationMask::TOOLTIP));
        assert!(!view.is_applicable(ViewApplicationMask::DRAW | ViewApplicationMask::TOOLTIP));
    }

    #[test]
    fn test_exclude_mask_change_is_size_change() {
        let view = ViewColor::new(Color::WHITE);
        let (received, id) = record(&view);

        view.base().set_exclude_application_mask(ViewApplicationMask::MOUSE);
        view.base().set_exclude_application_mask(ViewApplicationMask::MOUSE);

        assert_eq!(
            *received.lock(),
            vec![ChangeReason::VIEW_APPLICATION | ChangeReason::VIEW_SIZE]
        );
        view.changed().disconnect(id).unwrap();
    }

    #[test]
    fn test_add_controller_upgrades_slot() {
        let view = ViewColor::new(Color::WHITE);
        let (received, id) = record(&view);

        view.base().add_controller(Arc::new(Claim(false)));
        assert!(matches!(view.base().controller(), Some(ViewController::Single(_))));

        view.base().add_controller(Arc::new(Claim(true)));
        assert!(matches!(view.base().controller(), Some(ViewController::Multiple(_))));
        assert_eq!(received.lock().len(), 2);

        let event = MouseEvent::new(MouseEventKind::Press, MouseButton::Left, Point::new(0, 0));
        let ctx = ControllerContext {
            item: ItemID::new(0, 0),
            view_rect: Rect::new(0, 0, 10, 10),
        };
        assert!(view.process_mouse_event(&event, &ctx));

        view.changed().disconnect(id).unwrap();
    }

    #[test]
    fn test_set_same_controller_is_no_op() {
        let view = ViewColor::new(Color::WHITE);
        let controller: Arc<dyn ControllerMouse> = Arc::new(Claim(true));
        let (received, id) = record(&view);

        view.base().set_controller(Some(controller.clone()));
        view.base().set_controller(Some(controller));
        view.base().set_controller(None);
        view.base().set_controller(None);

        assert_eq!(
            *received.lock(),
            vec![ChangeReason::VIEW_CONTROLLER, ChangeReason::VIEW_CONTROLLER]
        );
        view.changed().disconnect(id).unwrap();
    }

    #[test]
    fn test_no_controller_claims_nothing() {
        let view = ViewColor::new(Color::WHITE);
        let event = MouseEvent::new(MouseEventKind::Move, MouseButton::Left, Point::new(0, 0));
        let ctx = ControllerContext {
            item: ItemID::new(0, 0),
            view_rect: Rect::ZERO,
        };
        assert!(!view.process_mouse_event(&event, &ctx));
    }

    #[test]
    fn test_tooltip_override() {
        let view = ViewColor::new(Color::WHITE);
        assert_eq!(view.tooltip_text(ItemID::new(0, 0)), None);

        view.base().set_tooltip_text("swatch");
        assert_eq!(view.tooltip_text(ItemID::new(0, 0)), Some("swatch".to_string()));

        view.base()
            .set_tooltip_callback(|item| Some(format!("row {}", item.row)));
        assert_eq!(view.tooltip_text(ItemID::new(3, 0)), Some("row 3".to_string()));
    }
}
