//! Memory-pressure admission gate.
//!
//! Submitting while the process is short on memory risks the external
//! resource manager killing it, losing tasks with no record of submission.
//! The gate therefore blocks the dispatch loop (it is not a queue): no
//! further activity is constructed until the check passes or shutdown is
//! signaled.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{trace, warn};

use crate::metrics::{MetricsHandle, noop_metrics};

/// Read-only view of available process memory.
///
/// The gate is the only component that queries it.
pub trait MemoryProbe: Send + Sync {
    /// Bytes of memory currently available to the process.
    fn available_bytes(&mut self) -> u64;
}

/// Probe backed by [`sysinfo`], refreshed on every read.
pub struct SysinfoProbe {
    sys: sysinfo::System,
}

impl SysinfoProbe {
    pub fn new() -> Self {
        Self {
            sys: sysinfo::System::new(),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryProbe for SysinfoProbe {
    fn available_bytes(&mut self) -> u64 {
        self.sys.refresh_memory();
        self.sys.available_memory()
    }
}

/// Outcome of one admission wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Memory headroom is sufficient; the submission may proceed.
    Granted,
    /// Shutdown was signaled while waiting; the batch must be discarded.
    Cancelled,
}

/// Blocking admission gate in front of every submission.
pub struct AdmissionGate {
    threshold_bytes: u64,
    backoff: Duration,
    probe: Box<dyn MemoryProbe>,
    metrics: MetricsHandle,
    label: &'static str,
}

impl AdmissionGate {
    /// Create a gate with an explicit probe.
    pub fn new(threshold_bytes: u64, backoff: Duration, probe: Box<dyn MemoryProbe>) -> Self {
        Self {
            threshold_bytes,
            backoff,
            probe,
            metrics: noop_metrics(),
            label: "dispatch",
        }
    }

    /// Create a gate reading real process memory.
    pub fn with_sysinfo(threshold_bytes: u64, backoff: Duration) -> Self {
        Self::new(threshold_bytes, backoff, Box::new(SysinfoProbe::new()))
    }

    /// Swap the memory probe.
    pub fn set_probe(&mut self, probe: Box<dyn MemoryProbe>) {
        self.probe = probe;
    }

    /// Attach a metrics backend and the capability label deferrals are
    /// recorded under.
    pub fn set_metrics(&mut self, metrics: MetricsHandle, label: &'static str) {
        self.metrics = metrics;
        self.label = label;
    }

    /// Wait until available memory reaches the threshold or shutdown is
    /// signaled. Re-checks every backoff interval.
    pub async fn admit(&mut self, cancel: &CancellationToken) -> Admission {
        loop {
            if cancel.is_cancelled() {
                return Admission::Cancelled;
            }

            let available = self.probe.available_bytes();
            if available >= self.threshold_bytes {
                trace!(available, threshold = self.threshold_bytes, "admission granted");
                return Admission::Granted;
            }

            warn!(
                available,
                threshold = self.threshold_bytes,
                backoff_ms = self.backoff.as_millis() as u64,
                "available memory below threshold; deferring submission"
            );
            self.metrics.record_deferred(self.label);

            tokio::select! {
                _ = cancel.cancelled() => return Admission::Cancelled,
                _ = tokio::time::sleep(self.backoff) => {}
            }
        }
    }
}
