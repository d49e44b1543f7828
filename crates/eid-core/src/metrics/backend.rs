use std::sync::Arc;

/// Backend interface for dispatch metrics.
///
/// `model` is the capability label driving the dispatch run.
pub trait MetricsBackend: Send + Sync + 'static {
    /// Record one accepted submission carrying `items` items.
    fn record_submitted(&self, model: &str, items: usize);

    /// Record one dropped activity and why (`no-suitable-executor`,
    /// `transport`).
    fn record_dropped(&self, model: &str, reason: &str);

    /// Record one admission deferral (submission delayed by the memory
    /// gate).
    fn record_deferred(&self, model: &str);
}

/// Shared handle to a metrics backend.
pub type MetricsHandle = Arc<dyn MetricsBackend>;
