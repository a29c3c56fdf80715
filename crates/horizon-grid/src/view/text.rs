//! Text view backed by a model.

use std::sync::Arc;

use horizon_grid_core::ConnectionId;
use horizon_grid_core::logging::targets;

use super::{CacheContext, GuiContext, Painter, View, ViewBase, ViewSizeMode};
use crate::change::ChangeReason;
use crate::geometry::Size;
use crate::item::ItemID;
use crate::model::Model;

/// Draws the string value a [`Model`] holds for each cell.
///
/// Model changes are forwarded on the view's `changed` signal as
/// [`ChangeReason::MODEL`] together with [`ChangeReason::VIEW_SIZE`], since
/// text length feeds the size hint.
pub struct ViewText {
    base: ViewBase,
    model: Arc<dyn Model<String>>,
    model_connection: ConnectionId,
}

impl ViewText {
    pub fn new(model: Arc<dyn Model<String>>) -> Self {
        let base = ViewBase::new();
        let changed = base.changed_handle();
        let model_connection = model.changed().connect(move |reason| {
            changed.emit(*reason | ChangeReason::MODEL | ChangeReason::VIEW_SIZE);
        });

        Self {
            base,
            model,
            model_connection,
        }
    }

    pub fn model(&self) -> &Arc<dyn Model<String>> {
        &self.model
    }

    pub fn text(&self, item: ItemID) -> String {
        self.model.value(item)
    }
}

impl View for ViewText {
    fn base(&self) -> &ViewBase {
        &self.base
    }

    fn draw(&self, painter: &mut dyn Painter, _ctx: &GuiContext, cache: &CacheContext) {
        let text = self.model.value(cache.item);
        if !text.is_empty() {
            painter.draw_text(cache.view_rect, &text);
        }
    }

    fn size(&self, ctx: &GuiContext, item: ItemID, _mode: ViewSizeMode) -> Size {
        let chars = self.model.value(item).chars().count() as i32;
        Size::new(chars * ctx.char_width, ctx.line_height)
    }

    fn view_tooltip_text(&self, item: ItemID) -> Option<String> {
        let text = self.model.value(item);
        (!text.is_empty()).then_some(text)
    }
}

impl Drop for ViewText {
    fn drop(&mut self) {
        if let Err(err) = self.model.changed().disconnect(self.model_connection) {
            tracing::warn!(target: targets::VIEW, %err, "text view model connection already gone");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelCallback;
    use parking_lot::Mutex;

    fn names() -> Arc<ModelCallback<String>> {
        let values = Arc::new(Mutex::new(vec!["alpha".to_string(), String::new()]));
        let setter_values = values.clone();
        Arc::new(
            ModelCallback::new(move |item: ItemID| values.lock()[item.row as usize].clone())
                .with_setter(move |item: ItemID, value: String| {
                    setter_values.lock()[item.row as usize] = value;
                    true
                }),
        )
    }

    #[test]
    fn test_size_from_metrics() {
        let view = ViewText::new(names());
        let ctx = GuiContext {
            char_width: 7,
            line_height: 12,
        };

        assert_eq!(
            view.size(&ctx, ItemID::new(0, 0), ViewSizeMode::Hint),
            Size::new(35, 12)
        );
        assert_eq!(
            view.size(&ctx, ItemID::new(1, 0), ViewSizeMode::Exact),
            Size::new(0, 12)
        );
    }

    #[test]
    fn test_tooltip_is_value() {
        let view = ViewText::new(names());
        assert_eq!(view.tooltip_text(ItemID::new(0, 0)), Some("alpha".to_string()));
        assert_eq!(view.tooltip_text(ItemID::new(1, 0)), None);
    }

    #[test]
    fn test_model_changes_are_forwarded() {
        let model = names();
        let view = ViewText::new(model.clone());

        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        let id = view
            .changed()
            .connect(move |reason| received_clone.lock().push(*reason));

        assert!(model.set_value(ItemID::new(1, 0), "beta".to_string()));
        assert_eq!(
            *received.lock(),
            vec![ChangeReason::MODEL | ChangeReason::VIEW_SIZE]
        );
        assert_eq!(view.text(ItemID::new(1, 0)), "beta");

        view.changed().disconnect(id).unwrap();
    }

    #[test]
    fn test_drop_disconnects_from_model() {
        let model = names();
        let view = ViewText::new(model.clone());
        assert_eq!(model.changed().connection_count(), 1);

        drop(view);
        assert_eq!(model.changed().connection_count(), 0);
    }

    #[test]
    fn test_drop_after_model_was_disconnected() {
        let model = names();
        let view = ViewText::new(model.clone());
        model.changed().disconnect_all();

        drop(view);
        assert!(model.changed().is_empty());
    }
}
