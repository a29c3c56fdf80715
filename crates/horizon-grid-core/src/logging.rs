//! Logging facilities for Horizon Grid.
//!
//! Horizon Grid uses the `tracing` crate for instrumentation. The library never
//! installs a subscriber; applications (and tests) opt in:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_grid::cache=trace")
//!     .init();
//! ```
//!
//! Every subsystem logs under one of the [`targets`] so output can be filtered
//! per subsystem.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "horizon_grid_core::signal";
    /// Schema registry target.
    pub const SPACE: &str = "horizon_grid::space";
    /// Cache layer target.
    pub const CACHE: &str = "horizon_grid::cache";
    /// Model target.
    pub const MODEL: &str = "horizon_grid::model";
    /// View and controller target.
    pub const VIEW: &str = "horizon_grid::view";
    /// Performance spans.
    pub const PERF: &str = "horizon_grid::perf";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// This is useful for tracking the duration of operations such as a full
/// paint pass over a cache.
#[derive(Debug)]
pub struct PerfSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl PerfSpan {
    /// Create a new performance span.
    ///
    /// The span will be active until the guard is dropped.
    pub fn new(name: &'static str) -> Self {
        let span = tracing::info_span!(target: "horizon_grid::perf", "perf", operation = name);
        Self {
            span: span.entered(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perf_span_without_subscriber() {
        let span = PerfSpan::new("test");
        drop(span);
    }

    #[test]
    fn test_perf_span_with_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter("horizon_grid::perf=info")
            .with_test_writer()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let _span = PerfSpan::new("draw");
            tracing::info!(target: targets::PERF, "inside span");
        });
    }
}
