//! Ranges select the cells a schema applies to.
//!
//! A [`Range`] is a predicate over [`ItemID`]s. Parameterised ranges emit
//! [`ChangeReason::RANGE`] from their `changed` signal when a setter actually
//! changes their membership; setting an equal value is a silent no-op.
//!
//! Bounds-based constructors use half-open `[begin, end)` intervals, so
//! `begin == end` yields an empty range.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_grid::{ItemID, Range, RangeAll, RangeColumn, RangeSelection};
//!
//! // every cell except column 2
//! let selection = RangeSelection::new();
//! selection.add_range(Arc::new(RangeAll::new()), false);
//! selection.add_range(Arc::new(RangeColumn::new(2)), true);
//!
//! assert!(!selection.has_item(ItemID::new(5, 2)));
//! assert!(selection.has_item(ItemID::new(5, 3)));
//! ```

use std::collections::HashSet;
use std::sync::Arc;

use horizon_grid_core::{ConnectionId, Property, Signal};
use parking_lot::RwLock;

use crate::change::ChangeReason;
use crate::item::ItemID;

/// A predicate over cells.
///
/// `has_item` must be a pure function of the range's current state.
pub trait Range: Send + Sync {
    /// Returns `true` if the range contains `item`.
    fn has_item(&self, item: ItemID) -> bool;

    /// Signal emitted when the membership of the range changes.
    fn changed(&self) -> &Signal<ChangeReason>;
}

fn bounds(begin: u32, end: u32) -> HashSet<u32> {
    debug_assert!(begin <= end, "inverted range bounds {begin}..{end}");
    (begin..end).collect()
}

/// A range that contains no cell.
#[derive(Default)]
pub struct RangeNone {
    changed: Signal<ChangeReason>,
}

impl RangeNone {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Range for RangeNone {
    fn has_item(&self, _item: ItemID) -> bool {
        false
    }

    fn changed(&self) -> &Signal<ChangeReason> {
        &self.changed
    }
}

/// A range that contains every cell.
#[derive(Default)]
pub struct RangeAll {
    changed: Signal<ChangeReason>,
}

impl RangeAll {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Range for RangeAll {
    fn has_item(&self, _item: ItemID) -> bool {
        true
    }

    fn changed(&self) -> &Signal<ChangeReason> {
        &self.changed
    }
}

/// All cells of one column.
pub struct RangeColumn {
    column: Property<u32>,
    changed: Signal<ChangeReason>,
}

impl RangeColumn {
    pub fn new(column: u32) -> Self {
        Self {
            column: Property::new(column),
            changed: Signal::new(),
        }
    }

    pub fn column(&self) -> u32 {
        self.column.get()
    }

    pub fn set_column(&self, column: u32) {
        if self.column.set(column) {
            self.changed.emit(ChangeReason::RANGE);
        }
    }
}

impl Range for RangeColumn {
    fn has_item(&self, item: ItemID) -> bool {
        item.column == self.column.get()
    }

    fn changed(&self) -> &Signal<ChangeReason> {
        &self.changed
    }
}

/// All cells of a set of columns.
pub struct RangeColumns {
    columns: Property<HashSet<u32>>,
    changed: Signal<ChangeReason>,
}

impl RangeColumns {
    pub fn new(columns: HashSet<u32>) -> Self {
        Self {
            columns: Property::new(columns),
            changed: Signal::new(),
        }
    }

    /// Columns `begin..end`.
    pub fn from_bounds(begin: u32, end: u32) -> Self {
        Self::new(bounds(begin, end))
    }

    pub fn columns(&self) -> HashSet<u32> {
        self.columns.get()
    }

    pub fn set_columns(&self, columns: HashSet<u32>) {
        if self.columns.set(columns) {
            self.changed.emit(ChangeReason::RANGE);
        }
    }
}

impl Range for RangeColumns {
    fn has_item(&self, item: ItemID) -> bool {
        self.columns.with(|columns| columns.contains(&item.column))
    }

    fn changed(&self) -> &Signal<ChangeReason> {
        &self.changed
    }
}

/// All cells of one row.
pub struct RangeRow {
    row: Property<u32>,
    changed: Signal<ChangeReason>,
}

impl RangeRow {
    pub fn new(row: u32) -> Self {
        Self {
            row: Property::new(row),
            changed: Signal::new(),
        }
    }

    pub fn row(&self) -> u32 {
        self.row.get()
    }

    pub fn set_row(&self, row: u32) {
        if self.row.set(row) {
            self.changed.emit(ChangeReason::RANGE);
        }
    }
}

impl Range for RangeRow {
    fn has_item(&self, item: ItemID) -> bool {
        item.row == self.row.get()
    }

    fn changed(&self) -> &Signal<ChangeReason> {
        &self.changed
    }
}

/// All cells of a set of rows.
pub struct RangeRows {
    rows: Property<HashSet<u32>>,
    changed: Signal<ChangeReason>,
}

impl RangeRows {
    pub fn new(rows: HashSet<u32>) -> Self {
        Self {
            rows: Property::new(rows),
            changed: Signal::new(),
        }
    }

    /// Rows `begin..end`.
    pub fn from_bounds(begin: u32, end: u32) -> Self {
        Self::new(bounds(begin, end))
    }

    pub fn rows(&self) -> HashSet<u32> {
        self.rows.get()
    }

    pub fn set_rows(&self, rows: HashSet<u32>) {
        if self.rows.set(rows) {
            self.changed.emit(ChangeReason::RANGE);
        }
    }
}

impl Range for RangeRows {
    fn has_item(&self, item: ItemID) -> bool {
        self.rows.with(|rows| rows.contains(&item.row))
    }

    fn changed(&self) -> &Signal<ChangeReason> {
        &self.changed
    }
}

/// Cells at the crossing of a set of rows and a set of columns.
pub struct RangeRect {
    rows: Property<HashSet<u32>>,
    columns: Property<HashSet<u32>>,
    changed: Signal<ChangeReason>,
}

impl RangeRect {
    pub fn new(rows: HashSet<u32>, columns: HashSet<u32>) -> Self {
        Self {
            rows: Property::new(rows),
            columns: Property::new(columns),
            changed: Signal::new(),
        }
    }

    /// Rows `row_begin..row_end` crossed with columns `column_begin..column_end`.
    pub fn from_bounds(row_begin: u32, row_end: u32, column_begin: u32, column_end: u32) -> Self {
        Self::new(bounds(row_begin, row_end), bounds(column_begin, column_end))
    }

    pub fn set_rows(&self, rows: HashSet<u32>) {
        if self.rows.set(rows) {
            self.changed.emit(ChangeReason::RANGE);
        }
    }

    pub fn set_columns(&self, columns: HashSet<u32>) {
        if self.columns.set(columns) {
            self.changed.emit(ChangeReason::RANGE);
        }
    }
}

impl Range for RangeRect {
    fn has_item(&self, item: ItemID) -> bool {
        self.rows.with(|rows| rows.contains(&item.row))
            && self.columns.with(|columns| columns.contains(&item.column))
    }

    fn changed(&self) -> &Signal<ChangeReason> {
        &self.changed
    }
}

struct SelectionEntry {
    range: Arc<dyn Range>,
    exclude: bool,
    /// Forwarding connection on the child's `changed` signal.
    connection: ConnectionId,
}

/// An ordered composition of include/exclude ranges.
///
/// Membership is decided by the last contained range that matches the cell:
/// a later `exclude` entry carves a hole into earlier, broader ranges and a
/// later include entry fills it again. A cell matched by no entry is not in
/// the selection.
///
/// The selection forwards change events of its children, so mutating a
/// child range invalidates whoever observes the selection. A selection must
/// not contain itself.
pub struct RangeSelection {
    entries: RwLock<Vec<SelectionEntry>>,
    changed: Arc<Signal<ChangeReason>>,
}

impl Default for RangeSelection {
    fn default() -> Self {
        Self::new()
    }
}

impl RangeSelection {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            changed: Arc::new(Signal::new()),
        }
    }

    /// Number of contained ranges.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Append a range; it overrides every earlier entry on the cells it matches.
    pub fn add_range(&self, range: Arc<dyn Range>, exclude: bool) {
        let entry = self.connect_entry(range, exclude);
        self.entries.write().push(entry);
        self.changed.emit(ChangeReason::RANGE);
    }

    /// Replace all contained ranges at once.
    pub fn set_ranges(&self, ranges: Vec<(Arc<dyn Range>, bool)>) {
        let entries: Vec<SelectionEntry> = ranges
            .into_iter()
            .map(|(range, exclude)| self.connect_entry(range, exclude))
            .collect();

        let old = std::mem::replace(&mut *self.entries.write(), entries);
        Self::disconnect_entries(old);
        self.changed.emit(ChangeReason::RANGE);
    }

    /// Remove all contained ranges.
    pub fn clear(&self) {
        let old = std::mem::take(&mut *self.entries.write());
        Self::disconnect_entries(old);
        self.changed.emit(ChangeReason::RANGE);
    }

    fn connect_entry(&self, range: Arc<dyn Range>, exclude: bool) -> SelectionEntry {
        let changed = Arc::clone(&self.changed);
        let connection = range
            .changed()
            .connect(move |reason| changed.emit(*reason | ChangeReason::RANGE));

        SelectionEntry {
            range,
            exclude,
            connection,
        }
    }

    fn disconnect_entries(entries: Vec<SelectionEntry>) {
        for entry in entries {
            // the pairing with connect_entry is exact, a failure is a bug
            let result = entry.range.changed().disconnect(entry.connection);
            debug_assert!(result.is_ok(), "range selection lost a child connection");
        }
    }
}

impl Range for RangeSelection {
    fn has_item(&self, item: ItemID) -> bool {
        let mut included = false;
        for entry in self.entries.read().iter() {
            if entry.range.has_item(item) {
                included = !entry.exclude;
            }
        }
        included
    }

    fn changed(&self) -> &Signal<ChangeReason> {
        &self.changed
    }
}

impl Drop for RangeSelection {
    fn drop(&mut self) {
        Self::disconnect_entries(std::mem::take(self.entries.get_mut()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn record(range: &dyn Range) -> (Arc<Mutex<Vec<ChangeReason>>>, ConnectionId) {
        let received = Arc::new(Mutex::new(Vec::new()));
        let received_clone = received.clone();
        let id = range
            .changed()
            .connect(move |reason| received_clone.lock().push(*reason));
        (received, id)
    }

    #[test]
    fn test_simple_ranges() {
        let item = ItemID::new(4, 7);

        assert!(!RangeNone::new().has_item(item));
        assert!(RangeAll::new().has_item(item));
        assert!(RangeColumn::new(7).has_item(item));
        assert!(!RangeColumn::new(4).has_item(item));
        assert!(RangeRow::new(4).has_item(item));
        assert!(!RangeRow::new(7).has_item(item));
    }

    #[test]
    fn test_bounds_are_half_open() {
        let columns = RangeColumns::from_bounds(2, 4);
        assert!(!columns.has_item(ItemID::new(0, 1)));
        assert!(columns.has_item(ItemID::new(0, 2)));
        assert!(columns.has_item(ItemID::new(0, 3)));
        assert!(!columns.has_item(ItemID::new(0, 4)));

        let rows = RangeRows::from_bounds(1, 2);
        assert!(rows.has_item(ItemID::new(1, 9)));
        assert!(!rows.has_item(ItemID::new(2, 9)));

        let rect = RangeRect::from_bounds(0, 2, 5, 6);
        assert!(rect.has_item(ItemID::new(1, 5)));
        assert!(!rect.has_item(ItemID::new(2, 5)));
        assert!(!rect.has_item(ItemID::new(1, 6)));
    }

    #[test]
    fn test_empty_bounds() {
        let columns = RangeColumns::from_bounds(3, 3);
        assert!(columns.columns().is_empty());
        assert!(!columns.has_item(ItemID::new(0, 3)));

        let rect = RangeRect::from_bounds(1, 1, 0, 10);
        assert!(!rect.has_item(ItemID::new(1, 0)));
    }

    #[test]
    fn test_setter_emits_only_on_change() {
        let range = RangeColumn::new(1);
        let (received, id) = record(&range);

        range.set_column(1);
        assert!(received.lock().is_empty());

        range.set_column(2);
        assert_eq!(*received.lock(), vec![ChangeReason::RANGE]);
        assert!(range.has_item(ItemID::new(0, 2)));

        range.changed().disconnect(id).unwrap();
    }

    #[test]
    fn test_set_rows_no_op_suppression() {
        let range = RangeRows::from_bounds(0, 3);
        let (received, id) = record(&range);

        range.set_rows((0..3).collect());
        assert!(received.lock().is_empty());

        range.set_rows(HashSet::from([7]));
        assert_eq!(received.lock().len(), 1);

        range.changed().disconnect(id).unwrap();
    }

    #[test]
    fn test_selection_last_match_wins() {
        let selection = RangeSelection::new();
        selection.add_range(Arc::new(RangeAll::new()), false);
        selection.add_range(Arc::new(RangeColumn::new(2)), true);

        assert!(!selection.has_item(ItemID::new(5, 2)));
        assert!(selection.has_item(ItemID::new(5, 3)));
    }

    #[test]
    fn test_selection_is_order_sensitive() {
        let selection = RangeSelection::new();
        selection.add_range(Arc::new(RangeColumn::new(2)), true);
        selection.add_range(Arc::new(RangeAll::new()), false);

        // the broad include now comes last and wins everywhere
        assert!(selection.has_item(ItemID::new(5, 2)));
        assert!(selection.has_item(ItemID::new(5, 3)));
    }

    #[test]
    fn test_selection_include_after_exclude() {
        let selection = RangeSelection::new();
        selection.add_range(Arc::new(RangeAll::new()), false);
        selection.add_range(Arc::new(RangeColumn::new(2)), true);
        selection.add_range(Arc::new(RangeRow::new(0)), false);

        assert!(selection.has_item(ItemID::new(0, 2)));
        assert!(!selection.has_item(ItemID::new(1, 2)));
    }

    #[test]
    fn test_empty_selection_contains_nothing() {
        let selection = RangeSelection::new();
        assert!(!selection.has_item(ItemID::new(0, 0)));
    }

    #[test]
    fn test_selection_forwards_child_changes() {
        let column = Arc::new(RangeColumn::new(2));
        let selection = RangeSelection::new();
        selection.add_range(column.clone(), false);

        let (received, id) = record(&selection);
        column.set_column(3);

        assert_eq!(*received.lock(), vec![ChangeReason::RANGE]);
        assert!(selection.has_item(ItemID::new(0, 3)));

        selection.changed().disconnect(id).unwrap();
    }

    #[test]
    fn test_selection_clear_disconnects_children() {
        let column = Arc::new(RangeColumn::new(2));
        let selection = RangeSelection::new();
        selection.add_range(column.clone(), false);
        assert_eq!(column.changed().connection_count(), 1);

        selection.clear();
        assert_eq!(column.changed().connection_count(), 0);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_selection_drop_disconnects_children() {
        let column = Arc::new(RangeColumn::new(2));
        {
            let selection = RangeSelection::new();
            selection.set_ranges(vec![(column.clone() as Arc<dyn Range>, false)]);
            assert_eq!(selection.len(), 1);
        }
        assert_eq!(column.changed().connection_count(), 0);
    }
}
