//! Schemas and per-item schema resolution.

use std::fmt;
use std::sync::Arc;

use horizon_grid_core::logging::targets;

use crate::change::ViewApplicationMask;
use crate::geometry::Rect;
use crate::item::ItemID;
use crate::layout::Layout;
use crate::range::Range;
use crate::view::{GuiContext, View, ViewSizeMode};

/// Binds a set of cells to the layout and view that render them.
#[derive(Clone)]
pub struct ItemSchema {
    pub range: Arc<dyn Range>,
    pub layout: Arc<dyn Layout>,
    pub view: Arc<dyn View>,
}

impl ItemSchema {
    pub fn new(range: Arc<dyn Range>, layout: Arc<dyn Layout>, view: Arc<dyn View>) -> Self {
        Self {
            range,
            layout,
            view,
        }
    }

    /// Returns `true` if the schema applies to `item` under `mask`.
    pub fn matches(&self, item: ItemID, mask: ViewApplicationMask) -> bool {
        self.range.has_item(item) && self.view.is_applicable(mask)
    }
}

impl fmt::Debug for ItemSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemSchema")
            .field("is_final", &self.layout.is_final())
            .field("exclude_mask", &self.view.base().exclude_application_mask())
            .finish()
    }
}

/// Several schemas matched by one item, laid out over a shared cell.
///
/// A composite carries no layout of its own: it is always placed with
/// [`LayoutBackground`](crate::layout::LayoutBackground) semantics, covering
/// the whole cell without consuming it. Inside that cell it runs the layouts
/// of its parts in scan order, each part consuming what it reserves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewComposite {
    parts: Vec<usize>,
}

impl ViewComposite {
    /// Indices of the matched schemas in scan order.
    pub fn parts(&self) -> &[usize] {
        &self.parts
    }

    /// Lay out the parts inside `item_rect`.
    ///
    /// Returns `(schema index, view rect)` for every part that found room.
    /// Parts without room are skipped.
    pub fn layout_parts(
        &self,
        schemas: &[ItemSchema],
        ctx: &GuiContext,
        item: ItemID,
        item_rect: Rect,
    ) -> Vec<(usize, Rect)> {
        let mut remaining = item_rect;
        self.parts
            .iter()
            .filter_map(|&index| {
                let schema = schemas.get(index)?;
                let mut view_rect = Rect::ZERO;
                schema
                    .layout
                    .do_layout(
                        schema.view.as_ref(),
                        ctx,
                        item,
                        ViewSizeMode::Exact,
                        &mut view_rect,
                        &mut remaining,
                    )
                    .then_some((index, view_rect))
            })
            .collect()
    }
}

/// The resolved rendering of one item.
///
/// Schemas are referred to by their index in the slice the resolution ran
/// over; the caller keeps that slice alive for as long as it keeps the
/// result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewSchema {
    /// No schema applies; nothing is drawn.
    Empty,
    /// Exactly one schema applies and is used as is.
    Single(usize),
    /// Several schemas apply and are composed over the whole cell, as if
    /// laid out by a background layout.
    Composite(ViewComposite),
}

impl ViewSchema {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Number of schemas the item resolved to.
    pub fn len(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::Single(_) => 1,
            Self::Composite(composite) => composite.parts.len(),
        }
    }
}

/// Resolve which schemas render `item`.
///
/// A schema applies if its range contains the item and its view is
/// applicable to `mask`. `schemas` is expected in draw order (see
/// [`Space::schemas_ordered`](super::Space::schemas_ordered)); composite
/// parts keep that order.
pub fn view_schema_for_item(
    item: ItemID,
    mask: ViewApplicationMask,
    schemas: &[ItemSchema],
) -> ViewSchema {
    let mut matched = schemas
        .iter()
        .enumerate()
        .filter(|(_, schema)| schema.matches(item, mask))
        .map(|(index, _)| index);

    let Some(first) = matched.next() else {
        tracing::trace!(target: targets::SPACE, %item, "no schema applies");
        return ViewSchema::Empty;
    };
    let Some(second) = matched.next() else {
        return ViewSchema::Single(first);
    };

    let mut parts = vec![first, second];
    parts.extend(matched);
    tracing::trace!(target: targets::SPACE, %item, parts = parts.len(), "composite view schema");
    ViewSchema::Composite(ViewComposite { parts })
}
