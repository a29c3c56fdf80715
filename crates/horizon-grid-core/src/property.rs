//! Change-tracking values for Horizon Grid.
//!
//! - **Property<T>**: a value whose setter reports whether it actually changed,
//!   so the owner emits its change signal only for real mutations.
//! - **Memo<T>**: lazily derived state that is invalidated by clearing and
//!   recomputed on the next read.
//!
//! # Example
//!
//! ```
//! use horizon_grid_core::{Property, Signal};
//!
//! struct Column {
//!     index: Property<u32>,
//!     changed: Signal<u32>,
//! }
//!
//! impl Column {
//!     fn set_index(&self, index: u32) {
//!         if self.index.set(index) {
//!             self.changed.emit(index);
//!         }
//!     }
//! }
//!
//! let column = Column { index: Property::new(0), changed: Signal::new() };
//! column.set_index(0); // no-op, nothing emitted
//! column.set_index(3);
//! assert_eq!(column.index.get(), 3);
//! ```

use std::fmt;

use parking_lot::{Mutex, RwLock};

/// A value that tracks changes.
///
/// `set()` compares the new value with the current one and returns whether the
/// value actually changed.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    /// Create a new property with an initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Get the current value.
    ///
    /// This clones the value. For large types, consider using `with()` instead.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Access the value through a closure without cloning.
    pub fn with<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&T) -> R,
    {
        f(&self.value.read())
    }

    /// Set the value without change detection.
    pub fn set_silent(&self, value: T) {
        *self.value.write() = value;
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Set the value, returning `true` if the value changed.
    ///
    /// The caller should emit the associated notification signal when this
    /// returns `true`.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current != value {
            *current = value;
            true
        } else {
            false
        }
    }

    /// Set the value, returning the old value if it changed.
    pub fn replace(&self, value: T) -> Option<T> {
        let mut current = self.value.write();
        if *current != value {
            Some(std::mem::replace(&mut *current, value))
        } else {
            None
        }
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: Clone + fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("value", &*self.value.read())
            .finish()
    }
}

/// Lazily derived state.
///
/// A `Memo` is either empty or holds the last computed value. Mutators of the
/// canonical data call [`invalidate`](Self::invalidate); readers call
/// [`get_or_compute`](Self::get_or_compute), which runs the computation only
/// when the memo is empty. Nothing is ever recomputed eagerly.
///
/// The computation runs outside the internal lock, so it may freely call back
/// into the owner. If the memo is invalidated while a computation is running,
/// the stale result is returned to that caller but not stored.
pub struct Memo<T> {
    state: Mutex<MemoState<T>>,
}

struct MemoState<T> {
    value: Option<T>,
    /// Bumped on every invalidation.
    epoch: u64,
}

impl<T: Clone> Memo<T> {
    /// Create an empty memo.
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoState {
                value: None,
                epoch: 0,
            }),
        }
    }

    /// Returns the memoized value, computing it first if the memo is empty.
    pub fn get_or_compute<F>(&self, compute: F) -> T
    where
        F: FnOnce() -> T,
    {
        let epoch = {
            let state = self.state.lock();
            if let Some(value) = &state.value {
                return value.clone();
            }
            state.epoch
        };

        let value = compute();

        let mut state = self.state.lock();
        if state.epoch == epoch {
            state.value = Some(value.clone());
        }
        value
    }

    /// Returns the memoized value without computing it.
    pub fn peek(&self) -> Option<T> {
        self.state.lock().value.clone()
    }

    /// Drop the memoized value.
    pub fn invalidate(&self) {
        let mut state = self.state.lock();
        state.value = None;
        state.epoch = state.epoch.wrapping_add(1);
    }

    /// Check if a value is currently memoized.
    pub fn is_valid(&self) -> bool {
        self.state.lock().value.is_some()
    }
}

impl<T: Clone> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("Memo")
            .field("value", &state.value)
            .field("epoch", &state.epoch)
            .finish()
    }
}
