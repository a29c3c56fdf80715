//! Core primitives for Horizon Grid.
//!
//! This crate provides the building blocks the grid crate is assembled from:
//!
//! - **Signal/Slot System**: synchronous multicast with slot reuse and
//!   re-entrancy-safe emission
//! - **Property System**: change-tracking values and lazily derived state
//! - **Logging**: tracing targets and performance spans
//!
//! # Signal/Slot Example
//!
//! ```
//! use horizon_grid_core::Signal;
//!
//! let value_changed = Signal::<i32>::new();
//!
//! let conn_id = value_changed.connect(|value| {
//!     println!("Value changed to: {}", value);
//! });
//!
//! value_changed.emit(42);
//!
//! value_changed.disconnect(conn_id).unwrap();
//! ```

mod error;
pub mod logging;
pub mod property;
pub mod signal;

pub use error::SignalError;
pub use logging::PerfSpan;
pub use property::{Memo, Property};
pub use signal::{ConnectionId, ConnectionTag, Signal};
