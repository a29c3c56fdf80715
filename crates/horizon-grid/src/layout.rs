//! Layouts place views inside a cell.
//!
//! A cell is laid out by running the layouts of its views in order over a
//! shared *remaining* rectangle. Side layouts carve a strip off one edge of
//! the remaining rectangle; the client layout takes whatever is left.
//!
//! Final layouts ([`Layout::is_final`]) are always run after all non-final
//! ones, so side strips are reserved before the client area is assigned.

use horizon_grid_core::{Property, Signal};

use crate::change::ChangeReason;
use crate::geometry::{Rect, Size};
use crate::item::ItemID;
use crate::view::{GuiContext, View, ViewSizeMode};

/// Computes the rectangle of a view inside a cell.
pub trait Layout: Send + Sync {
    /// Final layouts run after every non-final layout of the same cell.
    fn is_final(&self) -> bool;

    /// Place `view` for `item`.
    ///
    /// `item_rect` is the part of the cell not consumed by earlier layouts;
    /// a layout that reserves space shrinks it. On success the view's
    /// rectangle is written to `view_rect`. Returns `false` if there is no
    /// room for the view, in which case neither rectangle is modified.
    fn do_layout(
        &self,
        view: &dyn View,
        ctx: &GuiContext,
        item: ItemID,
        mode: ViewSizeMode,
        view_rect: &mut Rect,
        item_rect: &mut Rect,
    ) -> bool;

    /// Signal emitted when the layout's geometry changes.
    fn changed(&self) -> &Signal<ChangeReason>;
}

/// Fills the whole cell and leaves it available to the next layouts.
#[derive(Debug, Default)]
pub struct LayoutBackground {
    changed: Signal<ChangeReason>,
}

impl LayoutBackground {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layout for LayoutBackground {
    fn is_final(&self) -> bool {
        false
    }

    fn do_layout(
        &self,
        _view: &dyn View,
        _ctx: &GuiContext,
        _item: ItemID,
        _mode: ViewSizeMode,
        view_rect: &mut Rect,
        item_rect: &mut Rect,
    ) -> bool {
        *view_rect = *item_rect;
        true
    }

    fn changed(&self) -> &Signal<ChangeReason> {
        &self.changed
    }
}

/// Fills what is left of the cell after the side layouts.
#[derive(Debug, Default)]
pub struct LayoutClient {
    changed: Signal<ChangeReason>,
}

impl LayoutClient {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Layout for LayoutClient {
    fn is_final(&self) -> bool {
        true
    }

    fn do_layout(
        &self,
        _view: &dyn View,
        _ctx: &GuiContext,
        _item: ItemID,
        _mode: ViewSizeMode,
        view_rect: &mut Rect,
        item_rect: &mut Rect,
    ) -> bool {
        if item_rect.is_empty() {
            return false;
        }
        *view_rect = *item_rect;
        true
    }

    fn changed(&self) -> &Signal<ChangeReason> {
        &self.changed
    }
}

/// The edge a [`LayoutSide`] reserves its strip on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// Reserves a strip along one edge of the cell, sized by the view's hint.
///
/// The strip is as wide (or tall) as the view's size hint plus the margin
/// on both sides of the view.
#[derive(Debug)]
pub struct LayoutSide {
    side: Side,
    margin: Property<i32>,
    changed: Signal<ChangeReason>,
}

impl LayoutSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            margin: Property::new(0),
            changed: Signal::new(),
        }
    }

    pub fn left() -> Self {
        Self::new(Side::Left)
    }

    pub fn right() -> Self {
        Self::new(Side::Right)
    }

    pub fn top() -> Self {
        Self::new(Side::Top)
    }

    pub fn bottom() -> Self {
        Self::new(Side::Bottom)
    }

    pub fn side(&self) -> Side {
        self.side
    }

    pub fn margin(&self) -> i32 {
        self.margin.get()
    }

    /// Set the gap kept on both sides of the view.
    pub fn set_margin(&self, margin: i32) {
        if self.margin.set(margin.max(0)) {
            self.changed.emit(ChangeReason::LAYOUT);
        }
    }

    fn strip_extent(&self, size: Size) -> i32 {
        let margin = self.margin.get();
        match self.side {
            Side::Left | Side::Right => size.width.saturating_add(margin.saturating_mul(2)),
            Side::Top | Side::Bottom => size.height.saturating_add(margin.saturating_mul(2)),
        }
    }
}

impl Layout for LayoutSide {
    fn is_final(&self) -> bool {
        false
    }

    fn do_layout(
        &self,
        view: &dyn View,
        ctx: &GuiContext,
        item: ItemID,
        _mode: ViewSizeMode,
        view_rect: &mut Rect,
        item_rect: &mut Rect,
    ) -> bool {
        let size = view.size(ctx, item, ViewSizeMode::Hint);
        let extent = self.strip_extent(size);
        let margin = self.margin.get();

        let available = match self.side {
            Side::Left | Side::Right => item_rect.width(),
            Side::Top | Side::Bottom => item_rect.height(),
        };
        if extent <= 0 || extent > available {
            return false;
        }

        let strip = match self.side {
            Side::Left => {
                let strip = Rect::new(item_rect.left(), item_rect.top(), extent, item_rect.height());
                *item_rect = item_rect.adjusted(extent, 0, 0, 0);
                strip
            }
            Side::Right => {
                let strip = Rect::new(
                    item_rect.right() - extent,
                    item_rect.top(),
                    extent,
                    item_rect.height(),
                );
                *item_rect = item_rect.adjusted(0, 0, -extent, 0);
                strip
            }
            Side::Top => {
                let strip = Rect::new(item_rect.left(), item_rect.top(), item_rect.width(), extent);
                *item_rect = item_rect.adjusted(0, extent, 0, 0);
                strip
            }
            Side::Bottom => {
                let strip = Rect::new(
                    item_rect.left(),
                    item_rect.bottom() - extent,
                    item_rect.width(),
                    extent,
                );
                *item_rect = item_rect.adjusted(0, 0, 0, -extent);
                strip
            }
        };

        *view_rect = match self.side {
            Side::Left | Side::Right => strip.adjusted(margin, 0, -margin, 0),
            Side::Top | Side::Bottom => strip.adjusted(0, margin, 0, -margin),
        };
        true
    }

    fn changed(&self) -> &Signal<ChangeReason> {
        &self.changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Color;
    use crate::view::{CacheContext, Painter, ViewBase, ViewColor};
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct Fixed {
        base: ViewBase,
        size: Size,
    }

    impl View for Fixed {
        fn base(&self) -> &ViewBase {
            &self.base
        }

        fn draw(&self, _painter: &mut dyn Painter, _ctx: &GuiContext, _cache: &CacheContext) {}

        fn size(&self, _ctx: &GuiContext, _item: ItemID, _mode: ViewSizeMode) -> Size {
            self.size
        }
    }

    fn fixed(width: i32, height: i32) -> Fixed {
        Fixed {
            base: ViewBase::new(),
            size: Size::new(width, height),
        }
    }

    fn run(layout: &dyn Layout, view: &dyn View, item_rect: &mut Rect) -> Option<Rect> {
        let mut view_rect = Rect::ZERO;
        layout
            .do_layout(
                view,
                &GuiContext::default(),
                ItemID::new(0, 0),
                ViewSizeMode::Exact,
                &mut view_rect,
                item_rect,
            )
            .then_some(view_rect)
    }

    #[test]
    fn test_background_does_not_consume() {
        let view = ViewColor::new(Color::WHITE);
        let mut item_rect = Rect::new(0, 0, 100, 20);

        assert_eq!(
            run(&LayoutBackground::new(), &view, &mut item_rect),
            Some(Rect::new(0, 0, 100, 20))
        );
        assert_eq!(item_rect, Rect::new(0, 0, 100, 20));
        assert!(!LayoutBackground::new().is_final());
    }

    #[test]
    fn test_left_then_client() {
        let icon = fixed(16, 16);
        let text = fixed(50, 16);
        let mut item_rect = Rect::new(0, 0, 100, 20);

        assert_eq!(
            run(&LayoutSide::left(), &icon, &mut item_rect),
            Some(Rect::new(0, 0, 16, 20))
        );
        assert_eq!(item_rect, Rect::new(16, 0, 84, 20));

        let client = LayoutClient::new();
        assert!(client.is_final());
        assert_eq!(
            run(&client, &text, &mut item_rect),
            Some(Rect::new(16, 0, 84, 20))
        );
    }

    #[test]
    fn test_right_and_bottom() {
        let view = fixed(10, 5);

        let mut item_rect = Rect::new(0, 0, 100, 20);
        assert_eq!(
            run(&LayoutSide::right(), &view, &mut item_rect),
            Some(Rect::new(90, 0, 10, 20))
        );
        assert_eq!(item_rect, Rect::new(0, 0, 90, 20));

        let mut item_rect = Rect::new(0, 0, 100, 20);
        assert_eq!(
            run(&LayoutSide::bottom(), &view, &mut item_rect),
            Some(Rect::new(0, 15, 100, 5))
        );
        assert_eq!(item_rect, Rect::new(0, 0, 100, 15));
    }

    #[test]
    fn test_margin_applies_to_strip() {
        let layout = LayoutSide::left();
        layout.set_margin(2);

        let mut item_rect = Rect::new(0, 0, 100, 20);
        assert_eq!(
            run(&layout, &fixed(16, 16), &mut item_rect),
            Some(Rect::new(2, 0, 16, 20))
        );
        assert_eq!(item_rect, Rect::new(20, 0, 80, 20));
    }

    #[test]
    fn test_huge_margin_leaves_no_room() {
        let layout = LayoutSide::right();
        layout.set_margin(i32::MAX);

        let mut item_rect = Rect::new(0, 0, 100, 20);
        assert_eq!(run(&layout, &fixed(16, 16), &mut item_rect), None);
        assert_eq!(item_rect, Rect::new(0, 0, 100, 20));
    }

    #[test]
    fn test_no_room() {
        let mut item_rect = Rect::new(0, 0, 10, 20);
        assert_eq!(run(&LayoutSide::left(), &fixed(16, 16), &mut item_rect), None);
        assert_eq!(item_rect, Rect::new(0, 0, 10, 20));

        let mut empty = Rect::new(0, 0, 0, 20);
        assert_eq!(run(&LayoutClient::new(), &fixed(1, 1), &mut empty), None);
    }

    #[test]
    fn test_set_margin_emits_layout() {
        let layout = LayoutSide::top();
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        let id = layout
            .changed()
            .connect(move |reason| received_clone.lock().push(*reason));

        layout.set_margin(3);
        layout.set_margin(3);
        layout.set_margin(0);

        assert_eq!(*received.lock(), vec![ChangeReason::LAYOUT, ChangeReason::LAYOUT]);
        layout.changed().disconnect(id).unwrap();
    }
}
