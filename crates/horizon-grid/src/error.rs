//! Error types for the grid crate.

use horizon_grid_core::SignalError;
use thiserror::Error;

/// Errors that can occur while assembling a grid.
///
/// Logical absence (no schema covers a cell, no controller claims an event,
/// a model without a setter) is not an error and is reported through
/// `Option` or `bool` results instead.
#[derive(Error, Debug)]
pub enum GridError {
    /// A schema was inserted past the end of the schema list.
    #[error("schema index {index} out of range for {len} schema(s)")]
    SchemaIndexOutOfRange { index: usize, len: usize },

    /// The configuration could not be parsed.
    #[error("failed to parse grid configuration: {0}")]
    Config(#[from] toml::de::Error),

    /// The configuration parsed but holds unusable values.
    #[error("invalid grid configuration: {0}")]
    InvalidConfig(String),

    /// A signal connection was misused.
    #[error("signal error: {0}")]
    Signal(#[from] SignalError),
}

/// Result type for grid operations.
pub type GridResult<T> = Result<T, GridError>;
