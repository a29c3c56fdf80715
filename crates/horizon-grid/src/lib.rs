//! Horizon Grid - the rendering and data-binding core of a spreadsheet grid.
//!
//! A grid is assembled from a few kinds of shared objects:
//!
//! - [`Range`]s select the cells a schema applies to,
//! - [`Layout`]s place a view inside a cell,
//! - [`View`]s draw a cell and answer tooltip and mouse queries,
//! - [`Model`]s own the values views display.
//!
//! A [`Space`] binds them into ordered [`ItemSchema`]s and re-emits the
//! changes of their parts classified as structural or content changes. A
//! cache ([`CacheSpaceGrid`], [`CacheSpaceItem`]) resolves the schemas of
//! each visible item once and keeps the result until the space reports a
//! structural change.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_grid::{
//!     CacheSpace, CacheSpaceGrid, Color, GridConfig, ItemID, LayoutBackground, LayoutClient,
//!     ModelCallback, Painter, RangeAll, RangeColumn, Rect, Space, ViewColor, ViewText,
//! };
//!
//! struct Log(Vec<String>);
//!
//! impl Painter for Log {
//!     fn fill_rect(&mut self, rect: Rect, _color: Color) {
//!         self.0.push(format!("fill {rect:?}"));
//!     }
//!
//!     fn draw_text(&mut self, _rect: Rect, text: &str) {
//!         self.0.push(text.to_string());
//!     }
//! }
//!
//! let config = GridConfig::default().with_rows(3).with_columns(2);
//!
//! let space = Arc::new(Space::new());
//! let model = Arc::new(ModelCallback::new(|item: ItemID| format!("{item}")));
//! space.add_schema(Arc::new(RangeAll::new()), Arc::new(ViewText::new(model)), Arc::new(LayoutClient::new()));
//! space.add_schema(
//!     Arc::new(RangeColumn::new(0)),
//!     Arc::new(ViewColor::new(Color::from_rgb8(240, 240, 240))),
//!     Arc::new(LayoutBackground::new()),
//! );
//!
//! let mut cache = CacheSpaceGrid::new(space.clone(), Arc::new(config.grid()));
//! cache.set_window(Rect::new(0, 0, 160, 20));
//!
//! let mut painter = Log(Vec::new());
//! cache.draw(&mut painter, &config.gui_context());
//! assert_eq!(painter.0.len(), 3);
//! assert_eq!(painter.0[1], "(0, 0)");
//! ```
//!
//! # Threading
//!
//! All shared objects are `Send + Sync` and are shared as `Arc<dyn ...>`.
//! Change signals are delivered synchronously on the mutating thread; a
//! cache is owned by one rendering thread and only reads flags raised by
//! the space.

pub mod cache;
mod change;
pub mod config;
pub mod controller;
mod error;
pub mod geometry;
mod item;
pub mod layout;
pub mod model;
pub mod range;
pub mod space;
pub mod view;

pub use horizon_grid_core::{ConnectionId, ConnectionTag, PerfSpan, Signal, SignalError, logging};

pub use cache::{CacheItem, CacheSpace, CacheSpaceGrid, CacheSpaceItem, CacheView};
pub use change::{ChangeReason, ViewApplicationMask};
pub use config::{FontConfig, GridConfig};
pub use controller::{
    ControllerContext, ControllerMouse, ControllerMouseMultiple, MouseButton, MouseEvent,
    MouseEventKind, ViewController,
};
pub use error::{GridError, GridResult};
pub use geometry::{Color, Point, Rect, Size};
pub use item::ItemID;
pub use layout::{Layout, LayoutBackground, LayoutClient, LayoutSide, Side};
pub use model::{Model, ModelCallback, ModelCallbackComparable, ModelComparable};
pub use range::{
    Range, RangeAll, RangeColumn, RangeColumns, RangeNone, RangeRect, RangeRow, RangeRows,
    RangeSelection,
};
pub use space::{
    GridGeometry, ItemSchema, Space, UniformGrid, ViewComposite, ViewSchema, view_schema_for_item,
};
pub use view::{
    CacheContext, GuiContext, Painter, View, ViewBase, ViewColor, ViewSizeMode, ViewText,
};

// Shared objects cross threads behind `Arc`
static_assertions::assert_impl_all!(Space: Send, Sync);
static_assertions::assert_impl_all!(CacheItem: Send, Sync);
static_assertions::assert_impl_all!(ItemSchema: Send, Sync);
