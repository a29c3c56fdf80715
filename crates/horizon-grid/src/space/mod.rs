//! The schema registry.
//!
//! A [`Space`] owns an ordered list of [`ItemSchema`]s and listens to the
//! range, layout and view of every schema. Child notifications are
//! re-emitted on [`Space::changed`] with a coarse classification caches
//! act on:
//!
//! - [`ChangeReason::SPACE_ITEMS_STRUCTURE`]: schema membership or geometry
//!   may have changed; cached resolutions are stale.
//! - [`ChangeReason::SPACE_ITEMS_CONTENT`]: only appearance changed; cached
//!   resolutions stay valid and a repaint is enough.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use horizon_grid::{Color, ItemID, LayoutClient, RangeAll, Space, ViewColor};
//!
//! let space = Space::new();
//! let view = Arc::new(ViewColor::new(Color::WHITE));
//! space.add_schema(Arc::new(RangeAll::new()), view.clone(), Arc::new(LayoutClient::new()));
//!
//! assert_eq!(space.schema_count(), 1);
//! assert!(space.remove_schema(&(view as Arc<dyn horizon_grid::View>)));
//! ```

mod grid;
mod schema;

use std::fmt;
use std::sync::Arc;

use horizon_grid_core::logging::targets;
use horizon_grid_core::{ConnectionId, Memo, Property, Signal};
use parking_lot::RwLock;

use crate::change::{ChangeReason, ViewApplicationMask};
use crate::error::{GridError, GridResult};
use crate::layout::Layout;
use crate::range::Range;
use crate::view::View;

pub use grid::{GridGeometry, UniformGrid};
pub use schema::{ItemSchema, ViewComposite, ViewSchema, view_schema_for_item};

/// Connections a space holds on the parts of one schema.
#[derive(Debug, Clone, Copy)]
struct SchemaConnections {
    range: ConnectionId,
    layout: ConnectionId,
    view: ConnectionId,
}

struct SchemaEntry {
    schema: ItemSchema,
    connections: SchemaConnections,
}

/// Ordered registry of item schemas.
pub struct Space {
    schemas: RwLock<Vec<SchemaEntry>>,
    ordered: Memo<Arc<[ItemSchema]>>,
    view_application_mask: Property<ViewApplicationMask>,
    changed: Arc<Signal<ChangeReason>>,
}

impl Default for Space {
    fn default() -> Self {
        Self::new()
    }
}

impl Space {
    pub fn new() -> Self {
        Self {
            schemas: RwLock::new(Vec::new()),
            ordered: Memo::new(),
            view_application_mask: Property::new(ViewApplicationMask::NONE),
            changed: Arc::new(Signal::new()),
        }
    }

    /// Signal emitted when schemas or their parts change.
    pub fn changed(&self) -> &Signal<ChangeReason> {
        &self.changed
    }

    /// Number of registered schemas.
    pub fn schema_count(&self) -> usize {
        self.schemas.read().len()
    }

    /// Snapshot of the schemas in registration order.
    pub fn schemas(&self) -> Vec<ItemSchema> {
        self.schemas
            .read()
            .iter()
            .map(|entry| entry.schema.clone())
            .collect()
    }

    /// The schemas in draw order: non-final layouts first, final layouts
    /// last, registration order kept within both groups.
    ///
    /// The result is memoized until the next schema mutation; repeated calls
    /// return the same allocation.
    pub fn schemas_ordered(&self) -> Arc<[ItemSchema]> {
        self.ordered.get_or_compute(|| {
            let schemas = self.schemas.read();
            let (mut ordered, finals): (Vec<ItemSchema>, Vec<ItemSchema>) = schemas
                .iter()
                .map(|entry| entry.schema.clone())
                .partition(|schema| !schema.layout.is_final());
            ordered.extend(finals);

            tracing::trace!(target: targets::SPACE, schemas = ordered.len(), "ordered schemas rebuilt");
            ordered.into()
        })
    }

    /// Application mask every resolution against this space must pass in
    /// addition to the caller's own mask.
    pub fn view_application_mask(&self) -> ViewApplicationMask {
        self.view_application_mask.get()
    }

    pub fn set_view_application_mask(&self, mask: ViewApplicationMask) {
        if self.view_application_mask.set(mask) {
            self.emit_structure_changed(ChangeReason::SPACE_ITEMS_STRUCTURE);
        }
    }

    /// Append a schema; returns its index.
    pub fn add_schema(
        &self,
        range: Arc<dyn Range>,
        view: Arc<dyn View>,
        layout: Arc<dyn Layout>,
    ) -> usize {
        let index = {
            let mut schemas = self.schemas.write();
            schemas.push(self.connect_schema(ItemSchema::new(range, layout, view)));
            schemas.len() - 1
        };
        self.emit_structure_changed(ChangeReason::SPACE_ITEMS_STRUCTURE);
        index
    }

    /// Insert a schema before `index`; `index == schema_count()` appends.
    pub fn insert_schema(
        &self,
        index: usize,
        range: Arc<dyn Range>,
        view: Arc<dyn View>,
        layout: Arc<dyn Layout>,
    ) -> GridResult<usize> {
        {
            let mut schemas = self.schemas.write();
            if index > schemas.len() {
                return Err(GridError::SchemaIndexOutOfRange {
                    index,
                    len: schemas.len(),
                });
            }
            schemas.insert(index, self.connect_schema(ItemSchema::new(range, layout, view)));
        }
        self.emit_structure_changed(ChangeReason::SPACE_ITEMS_STRUCTURE);
        Ok(index)
    }

    /// Remove the first schema rendered by `view`.
    ///
    /// Returns `false` without emitting anything if no schema uses the view.
    pub fn remove_schema(&self, view: &Arc<dyn View>) -> bool {
        let removed = {
            let mut schemas = self.schemas.write();
            schemas
                .iter()
                .position(|entry| Arc::ptr_eq(&entry.schema.view, view))
                .map(|index| schemas.remove(index))
        };

        let Some(entry) = removed else {
            tracing::trace!(target: targets::SPACE, "remove_schema: view not registered");
            return false;
        };

        Self::release(entry);
        self.emit_structure_changed(ChangeReason::SPACE_ITEMS_STRUCTURE);
        true
    }

    /// Remove every schema.
    pub fn clear_schemas(&self) {
        let entries = std::mem::take(&mut *self.schemas.write());
        for entry in entries {
            Self::release(entry);
        }
        self.emit_structure_changed(ChangeReason::SPACE_ITEMS_STRUCTURE);
    }

    fn emit_structure_changed(&self, reason: ChangeReason) {
        self.ordered.invalidate();
        tracing::debug!(
            target: targets::SPACE,
            schemas = self.schema_count(),
            ?reason,
            "space structure changed"
        );
        self.changed.emit(reason);
    }

    fn connect_schema(&self, schema: ItemSchema) -> SchemaEntry {
        let changed = Arc::clone(&self.changed);
        let range = schema.range.changed().connect(move |reason| {
            changed.emit(*reason | ChangeReason::SPACE_ITEMS_STRUCTURE);
        });

        let changed = Arc::clone(&self.changed);
        let layout = schema.layout.changed().connect(move |reason| {
            changed.emit(*reason | ChangeReason::SPACE_ITEMS_STRUCTURE);
        });

        let changed = Arc::clone(&self.changed);
        let view = schema.view.changed().connect(move |reason| {
            let escalated = if reason.contains(ChangeReason::VIEW_SIZE) {
                ChangeReason::SPACE_ITEMS_STRUCTURE
            } else {
                ChangeReason::SPACE_ITEMS_CONTENT
            };
            changed.emit(*reason | escalated);
        });

        SchemaEntry {
            schema,
            connections: SchemaConnections {
                range,
                layout,
                view,
            },
        }
    }

    fn disconnect_schema(entry: &SchemaEntry) -> GridResult<()> {
        let SchemaConnections {
            range,
            layout,
            view,
        } = entry.connections;
        // all three are released before the first failure is reported
        let results = [
            entry.schema.range.changed().disconnect(range),
            entry.schema.layout.changed().disconnect(layout),
            entry.schema.view.changed().disconnect(view),
        ];
        results.into_iter().collect::<Result<(), _>>()?;
        Ok(())
    }

    fn release(entry: SchemaEntry) {
        if let Err(err) = Self::disconnect_schema(&entry) {
            tracing::warn!(target: targets::SPACE, %err, "schema was already disconnected");
        }
    }
}

impl Drop for Space {
    fn drop(&mut self) {
        for entry in self.schemas.get_mut().drain(..) {
            Self::release(entry);
        }
        self.ordered.invalidate();
    }
}

impl fmt::Debug for Space {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Space")
            .field("schemas", &self.schema_count())
            .field("ordered_valid", &self.ordered.is_valid())
            .field("view_application_mask", &self.view_application_mask.get())
            .finish()
    }
}
