//! Grid geometry collaborators.
//!
//! The cache does not decide where cells are; it asks a [`GridGeometry`].
//! Real grids with per-line sizes, hidden lines or frozen panes implement
//! the trait outside the core. [`UniformGrid`] covers the fixed-size case.

use std::fmt;

use crate::geometry::{Point, Rect, Size};
use crate::item::ItemID;

/// Maps cells to rectangles in space coordinates and back.
pub trait GridGeometry: Send + Sync {
    /// Total size of the space.
    fn size(&self) -> Size;

    /// Rectangle of `item`, or `None` if the item is outside the grid.
    fn item_rect(&self, item: ItemID) -> Option<Rect>;

    /// The item under `point`.
    fn item_at(&self, point: Point) -> Option<ItemID>;

    /// Items intersecting `window`, in row-major order.
    fn visible_items(&self, window: Rect) -> Vec<ItemID>;
}

/// A grid whose rows and columns all share one size.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct UniformGrid {
    rows: u32,
    columns: u32,
    row_height: i32,
    column_width: i32,
}

impl UniformGrid {
    /// Create a grid. Line sizes are clamped to at least one pixel.
    pub fn new(rows: u32, columns: u32, row_height: i32, column_width: i32) -> Self {
        Self {
            rows,
            columns,
            row_height: row_height.max(1),
            column_width: column_width.max(1),
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn row_height(&self) -> i32 {
        self.row_height
    }

    pub fn column_width(&self) -> i32 {
        self.column_width
    }

    /// Half-open range of lines covering `begin..end` pixels.
    fn lines(begin: i32, end: i32, line_size: i32, count: u32) -> std::ops::Range<u32> {
        let extent = i64::from(count) * i64::from(line_size);
        let begin = i64::from(begin).clamp(0, extent);
        let end = i64::from(end).clamp(0, extent);
        if begin >= end {
            return 0..0;
        }
        let first = begin / i64::from(line_size);
        let last = (end + i64::from(line_size) - 1) / i64::from(line_size);
        // both bounds are within 0..=count
        first as u32..last as u32
    }
}

impl GridGeometry for UniformGrid {
    fn size(&self) -> Size {
        let extent = |count: u32, line_size: i32| {
            let extent = i64::from(count) * i64::from(line_size);
            i32::try_from(extent).unwrap_or(i32::MAX)
        };
        Size::new(
            extent(self.columns, self.column_width),
            extent(self.rows, self.row_height),
        )
    }

    /// Cells whose origin does not fit in `i32` coordinates have no rectangle.
    fn item_rect(&self, item: ItemID) -> Option<Rect> {
        if item.row >= self.rows || item.column >= self.columns {
            return None;
        }
        let x = i64::from(item.column) * i64::from(self.column_width);
        let y = i64::from(item.row) * i64::from(self.row_height);
        Some(Rect::new(
            i32::try_from(x).ok()?,
            i32::try_from(y).ok()?,
            self.column_width,
            self.row_height,
        ))
    }

    fn item_at(&self, point: Point) -> Option<ItemID> {
        if point.x < 0 || point.y < 0 {
            return None;
        }
        let row = (point.y / self.row_height) as u32;
        let column = (point.x / self.column_width) as u32;
        (row < self.rows && column < self.columns).then(|| ItemID::new(row, column))
    }

    fn visible_items(&self, window: Rect) -> Vec<ItemID> {
        let rows = Self::lines(window.top(), window.bottom(), self.row_height, self.rows);
        let columns = Self::lines(window.left(), window.right(), self.column_width, self.columns);

        rows.flat_map(|row| columns.clone().map(move |column| ItemID::new(row, column)))
            .collect()
    }
}

impl fmt::Debug for UniformGrid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "UniformGrid({}x{} @ {}x{})",
            self.rows, self.columns, self.column_width, self.row_height
        )
    }
}
