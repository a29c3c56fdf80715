//! Cell addressing.

use std::fmt;

/// Identifies one cell of a space by row and column.
///
/// `ItemID` is a plain value type; it carries no reference to the space it
/// addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ItemID {
    pub row: u32,
    pub column: u32,
}

impl ItemID {
    /// Create a new item id.
    #[inline]
    pub const fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

impl From<(u32, u32)> for ItemID {
    fn from((row, column): (u32, u32)) -> Self {
        Self { row, column }
    }
}

impl fmt::Display for ItemID {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}
