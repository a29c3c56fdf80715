//! Error types for Horizon Grid core primitives.

use thiserror::Error;

/// Signal-specific errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SignalError {
    /// The connection ID is invalid or has already been disconnected.
    #[error("invalid or disconnected connection ID")]
    InvalidConnection,
}
