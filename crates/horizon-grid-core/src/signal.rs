//! Signal/slot registry for Horizon Grid.
//!
//! This module provides a small, synchronous multicast primitive used by every
//! mutable grid entity (ranges, layouts, views, models, spaces) to announce
//! changes. Slots are plain closures invoked in registration order on the
//! emitting thread.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type for emitting notifications
//! - [`ConnectionId`] - Token returned when connecting a slot
//! - [`ConnectionTag`] - Owner tag for bulk disconnection
//!
//! # Slot Reuse
//!
//! Connections live in a flat table. Disconnecting a slot leaves a hole that
//! the next `connect` fills before the table grows, so repeated
//! connect/disconnect cycles do not grow memory. The table remembers the
//! lowest index known to be free and starts its search there.
//!
//! # Re-entrancy
//!
//! Emission works on a snapshot of the live slots. A slot may connect or
//! disconnect other slots (or itself) while the signal is being emitted:
//!
//! - a slot disconnected before it was reached is not invoked,
//! - a slot disconnected after it ran is simply removed,
//! - a slot connected during emission is first invoked by the next emission.
//!
//! # Example
//!
//! ```
//! use horizon_grid_core::Signal;
//!
//! let text_changed = Signal::<String>::new();
//!
//! let conn_id = text_changed.connect(|text| {
//!     println!("Text changed to: {}", text);
//! });
//!
//! text_changed.emit("Hello, World!".to_string());
//!
//! // Signals must be empty when they are dropped.
//! text_changed.disconnect(conn_id).unwrap();
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::SignalError;
use crate::logging::targets;

/// Counter for generating unique connection tags.
static TAG_COUNTER: AtomicU64 = AtomicU64::new(1);

/// A token identifying one signal-slot connection.
///
/// The token carries the slot index and the generation of the slot at the
/// time of connection, so a token that outlived its connection is detected
/// even after the slot was reused by a newer connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ConnectionId {
    index: u32,
    generation: u32,
}

impl ConnectionId {
    /// Returns the slot index this connection occupies.
    #[inline]
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

/// Tag identifying the owner of a group of connections.
///
/// An owner that connects to several signals tags all of its connections
/// with the same value and later removes them with
/// [`Signal::disconnect_by_tag`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct ConnectionTag(u64);

impl ConnectionTag {
    /// The tag of untagged connections.
    pub const NONE: Self = Self(0);

    /// Allocate a new process-unique tag.
    pub fn next() -> Self {
        Self(TAG_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the raw tag value.
    #[inline]
    pub fn value(&self) -> u64 {
        self.0
    }
}

type SlotFn<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Internal storage for one slot of the table.
struct SlotEntry<Args> {
    /// The connected closure, `None` when the slot is free.
    slot: Option<SlotFn<Args>>,
    /// Owner tag of the connection.
    tag: ConnectionTag,
    /// Bumped on every disconnect so stale tokens are rejected.
    generation: u32,
}

struct SlotTable<Args> {
    entries: Vec<SlotEntry<Args>>,
    /// Lowest index that may be free, `None` when every slot is in use.
    first_unused: Option<usize>,
}

impl<Args> SlotTable<Args> {
    fn new() -> Self {
        Self {
            entries: Vec::new(),
            first_unused: None,
        }
    }

    fn insert(&mut self, slot: SlotFn<Args>, tag: ConnectionTag) -> ConnectionId {
        if let Some(start) = self.first_unused {
            let free = self.entries[start..]
                .iter()
                .position(|entry| entry.slot.is_none())
                .map(|offset| start + offset);

            match free {
                Some(index) => {
                    let entry = &mut self.entries[index];
                    entry.slot = Some(slot);
                    entry.tag = tag;
                    self.first_unused = Some(index);
                    return ConnectionId {
                        index: index as u32,
                        generation: entry.generation,
                    };
                }
                // all slots are in use
                None => self.first_unused = None,
            }
        }

        self.entries.push(SlotEntry {
            slot: Some(slot),
            tag,
            generation: 0,
        });

        ConnectionId {
            index: (self.entries.len() - 1) as u32,
            generation: 0,
        }
    }

    fn release(&mut self, index: usize) {
        let entry = &mut self.entries[index];
        entry.slot = None;
        entry.tag = ConnectionTag::NONE;
        entry.generation = entry.generation.wrapping_add(1);

        if self.first_unused.is_none_or(|first| first > index) {
            self.first_unused = Some(index);
        }
    }

    fn is_live(&self, id: ConnectionId) -> bool {
        self.entries
            .get(id.index())
            .is_some_and(|entry| entry.slot.is_some() && entry.generation == id.generation)
    }

    fn live_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.slot.is_some()).count()
    }
}

/// A type-safe signal that can have multiple connected slots.
///
/// When a signal is emitted, all connected slots are invoked with a reference
/// to the provided arguments, in the order they were connected.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple for multiple arguments.
///
/// # Lifetime
///
/// A signal must not be dropped while slots are still connected to it. The
/// owner of a connection is responsible for disconnecting before teardown;
/// a violation is logged and trips a debug assertion.
pub struct Signal<Args> {
    table: Mutex<SlotTable<Args>>,
    /// Whether signal emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            table: Mutex::new(SlotTable::new()),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect an untagged slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.connect_tagged(slot, ConnectionTag::NONE)
    }

    /// Connect a slot tagged with its owner.
    ///
    /// Tagged connections can be removed in bulk with
    /// [`disconnect_by_tag`](Self::disconnect_by_tag).
    pub fn connect_tagged<F>(&self, slot: F, tag: ConnectionTag) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.table.lock().insert(Arc::new(slot), tag)
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Disconnecting twice, or with a token whose slot has since been reused,
    /// fails with [`SignalError::InvalidConnection`] and leaves the table
    /// untouched.
    pub fn disconnect(&self, id: ConnectionId) -> Result<(), SignalError> {
        let mut table = self.table.lock();
        if !table.is_live(id) {
            tracing::warn!(
                target: targets::SIGNAL,
                index = id.index(),
                "disconnect of unknown or stale connection"
            );
            return Err(SignalError::InvalidConnection);
        }

        table.release(id.index());
        Ok(())
    }

    /// Disconnect every slot connected with `tag`.
    ///
    /// Returns `true` if at least one connection was removed.
    pub fn disconnect_by_tag(&self, tag: ConnectionTag) -> bool {
        let mut table = self.table.lock();
        let matching: Vec<usize> = table
            .entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.slot.is_some() && entry.tag == tag)
            .map(|(index, _)| index)
            .collect();

        for &index in &matching {
            table.release(index);
        }

        !matching.is_empty()
    }

    /// Disconnect all slots from this signal.
    ///
    /// Slots are released in place, so tokens issued before the call stay
    /// stale after their slots are reused.
    pub fn disconnect_all(&self) {
        let mut table = self.table.lock();
        for index in 0..table.entries.len() {
            if table.entries[index].slot.is_some() {
                table.release(index);
            }
        }
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.table.lock().live_count()
    }

    /// Returns `true` if no slot is connected.
    pub fn is_empty(&self) -> bool {
        self.connection_count() == 0
    }

    /// Returns `true` if `id` still refers to a live connection.
    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.table.lock().is_live(id)
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected slots in registration order.
    ///
    /// The table lock is not held while a slot runs.
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        let snapshot: Vec<(ConnectionId, SlotFn<Args>)> = {
            let table = self.table.lock();
            table
                .entries
                .iter()
                .enumerate()
                .filter_map(|(index, entry)| {
                    entry.slot.as_ref().map(|slot| {
                        let id = ConnectionId {
                            index: index as u32,
                            generation: entry.generation,
                        };
                        (id, Arc::clone(slot))
                    })
                })
                .collect()
        };

        tracing::trace!(target: targets::SIGNAL, connection_count = snapshot.len(), "emitting signal");

        for (id, slot) in snapshot {
            // skip slots disconnected by an earlier slot of this emission
            if !self.table.lock().is_live(id) {
                continue;
            }
            slot(&args);
        }
    }
}

impl<Args> fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.table.lock();
        f.debug_struct("Signal")
            .field("connections", &table.live_count())
            .field("slots", &table.entries.len())
            .field("blocked", &self.blocked.load(Ordering::Relaxed))
            .finish()
    }
}

impl<Args> Drop for Signal<Args> {
    fn drop(&mut self) {
        let live = self.table.get_mut().live_count();
        if live > 0 {
            tracing::error!(
                target: targets::SIGNAL,
                live,
                "signal dropped with live connections"
            );
            debug_assert!(
                std::thread::panicking(),
                "signal dropped with {live} live connection(s)"
            );
        }
    }
}

// Signals are shared between threads behind `Arc`
static_assertions::assert_impl_all!(Signal<u32>: Send, Sync);
