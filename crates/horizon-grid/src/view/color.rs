//! Solid color view.

use horizon_grid_core::Property;

use super::{CacheContext, GuiContext, Painter, View, ViewBase};
use crate::change::ChangeReason;
use crate::geometry::Color;

/// Fills its rectangle with one color.
///
/// Typically laid out with a background layout to paint cell backgrounds.
#[derive(Debug)]
pub struct ViewColor {
    base: ViewBase,
    color: Property<Color>,
}

impl ViewColor {
    pub fn new(color: Color) -> Self {
        Self {
            base: ViewBase::new(),
            color: Property::new(color),
        }
    }

    pub fn color(&self) -> Color {
        self.color.get()
    }

    /// Change the fill color; a pure repaint.
    pub fn set_color(&self, color: Color) {
        if self.color.set(color) {
            self.base.emit_changed(ChangeReason::VIEW_CONTENT);
        }
    }
}

impl View for ViewColor {
    fn base(&self) -> &ViewBase {
        &self.base
    }

    fn draw(&self, painter: &mut dyn Painter, _ctx: &GuiContext, cache: &CacheContext) {
        painter.fill_rect(cache.view_rect, self.color.get());
    }
}
