//! Core model traits.

use std::cmp::Ordering;

use horizon_grid_core::Signal;

use crate::change::ChangeReason;
use crate::item::ItemID;

/// Typed value access per cell.
///
/// Implementations should emit [`ChangeReason::MODEL`] on `changed` after a
/// value was actually modified.
pub trait Model<T: Clone>: Send + Sync {
    /// Returns the value of `item`.
    fn value(&self, item: ItemID) -> T;

    /// Signal emitted when values change.
    fn changed(&self) -> &Signal<ChangeReason>;

    /// Sets the value of `item`.
    ///
    /// Returns `true` if the value was stored. The default implementation is
    /// read-only and returns `false`.
    fn set_value(&self, _item: ItemID, _value: T) -> bool {
        false
    }

    /// Sets the same value on several items.
    ///
    /// The default implementation sets the items one by one and returns `true`
    /// if any of them was stored.
    fn set_value_multiple(&self, items: &mut dyn Iterator<Item = ItemID>, value: T) -> bool {
        let mut stored = false;
        for item in items {
            stored |= self.set_value(item, value.clone());
        }
        stored
    }
}

/// Ordering of cells, used by sorting collaborators.
pub trait ModelComparable: Send + Sync {
    /// Compare the values of two cells.
    fn compare(&self, left: ItemID, right: ItemID) -> Ordering;

    /// Whether sorting by `item`'s column starts ascending.
    fn is_ascending_default(&self, _item: ItemID) -> bool {
        true
    }
}
