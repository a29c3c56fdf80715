//! Closure-backed models.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use horizon_grid_core::logging::targets;
use horizon_grid_core::Signal;

use super::traits::{Model, ModelComparable};
use crate::change::ChangeReason;
use crate::item::ItemID;

/// Type alias for a value getter.
pub type GetValueFn<T> = Arc<dyn Fn(ItemID) -> T + Send + Sync>;

/// Type alias for a value setter.
pub type SetValueFn<T> = Arc<dyn Fn(ItemID, T) -> bool + Send + Sync>;

/// Type alias for a setter applying one value to many items.
pub type SetValueMultipleFn<T> =
    Arc<dyn Fn(&mut dyn Iterator<Item = ItemID>, T) -> bool + Send + Sync>;

/// A model whose accessors are closures.
///
/// The getter is mandatory. Without a setter the model is read-only and
/// `set_value` returns `false`. Without a multi-setter, `set_value_multiple`
/// falls back to setting the items one by one.
pub struct ModelCallback<T> {
    get_value: GetValueFn<T>,
    set_value: Option<SetValueFn<T>>,
    set_value_multiple: Option<SetValueMultipleFn<T>>,
    changed: Signal<ChangeReason>,
}

impl<T: Clone + 'static> ModelCallback<T> {
    /// Creates a read-only model from a getter.
    pub fn new<F>(get_value: F) -> Self
    where
        F: Fn(ItemID) -> T + Send + Sync + 'static,
    {
        Self {
            get_value: Arc::new(get_value),
            set_value: None,
            set_value_multiple: None,
            changed: Signal::new(),
        }
    }

    /// Adds a setter to the model.
    pub fn with_setter<F>(mut self, set_value: F) -> Self
    where
        F: Fn(ItemID, T) -> bool + Send + Sync + 'static,
    {
        self.set_value = Some(Arc::new(set_value));
        self
    }

    /// Adds a setter applying one value to many items at once.
    pub fn with_multiple_setter<F>(mut self, set_value_multiple: F) -> Self
    where
        F: Fn(&mut dyn Iterator<Item = ItemID>, T) -> bool + Send + Sync + 'static,
    {
        self.set_value_multiple = Some(Arc::new(set_value_multiple));
        self
    }

    /// Returns `true` if values can be set.
    pub fn is_editable(&self) -> bool {
        self.set_value.is_some() || self.set_value_multiple.is_some()
    }
}

impl<T: Clone + Send + Sync + 'static> Model<T> for ModelCallback<T> {
    fn value(&self, item: ItemID) -> T {
        (self.get_value)(item)
    }

    fn changed(&self) -> &Signal<ChangeReason> {
        &self.changed
    }

    fn set_value(&self, item: ItemID, value: T) -> bool {
        let Some(setter) = &self.set_value else {
            tracing::trace!(target: targets::MODEL, %item, "no setter configured");
            return false;
        };

        let stored = setter(item, value);
        if stored {
            self.changed.emit(ChangeReason::MODEL);
        }
        stored
    }

    fn set_value_multiple(&self, items: &mut dyn Iterator<Item = ItemID>, value: T) -> bool {
        let Some(setter) = &self.set_value_multiple else {
            let mut stored = false;
            for item in items {
                stored |= self.set_value(item, value.clone());
            }
            return stored;
        };

        let stored = setter(items, value);
        if stored {
            self.changed.emit(ChangeReason::MODEL);
        }
        stored
    }
}

impl<T> fmt::Debug for ModelCallback<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelCallback")
            .field("has_setter", &self.set_value.is_some())
            .field("has_multiple_setter", &self.set_value_multiple.is_some())
            .finish()
    }
}

/// A comparable model whose ordering is a closure.
pub struct ModelCallbackComparable {
    compare: Arc<dyn Fn(ItemID, ItemID) -> Ordering + Send + Sync>,
    ascending_default: bool,
}

impl ModelCallbackComparable {
    pub fn new<F>(compare: F) -> Self
    where
        F: Fn(ItemID, ItemID) -> Ordering + Send + Sync + 'static,
    {
        Self {
            compare: Arc::new(compare),
            ascending_default: true,
        }
    }

    /// Sets the initial sort direction reported for every column.
    pub fn with_ascending_default(mut self, ascending: bool) -> Self {
        self.ascending_default = ascending;
        self
    }
}

impl ModelComparable for ModelCallbackComparable {
    fn compare(&self, left: ItemID, right: ItemID) -> Ordering {
        (self.compare)(left, right)
    }

    fn is_ascending_default(&self, _item: ItemID) -> bool {
        self.ascending_default
    }
}
