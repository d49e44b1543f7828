//! Metrics collection abstraction for the dispatch loop.
//!
//! Backends implement [`MetricsBackend`] and are injected into the
//! dispatcher; no concrete exporter ships with this crate.
mod backend;
pub use backend::{MetricsBackend, MetricsHandle};

mod noop;
pub use noop::NoOpMetrics;

use std::sync::Arc;

/// Create a no-op metrics handle.
#[inline]
pub fn noop_metrics() -> MetricsHandle {
    Arc::new(NoOpMetrics)
}
