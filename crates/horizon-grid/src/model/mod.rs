//! Models own cell values.
//!
//! Views pull values from a [`Model`] by [`ItemID`](crate::ItemID); the grid
//! core never looks at how values are stored. [`ModelCallback`] adapts plain
//! closures to the model interface.
//!
//! # Example
//!
//! ```
//! use horizon_grid::{ItemID, Model, ModelCallback};
//!
//! let model = ModelCallback::new(|item: ItemID| format!("R{}C{}", item.row, item.column));
//! assert_eq!(model.value(ItemID::new(1, 2)), "R1C2");
//!
//! // no setter configured: setting is a no-op
//! assert!(!model.set_value(ItemID::new(1, 2), "x".to_string()));
//! ```

mod callback;
mod traits;

pub use callback::{ModelCallback, ModelCallbackComparable};
pub use traits::{Model, ModelComparable};
