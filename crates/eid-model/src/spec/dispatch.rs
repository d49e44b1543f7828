use serde::{Deserialize, Serialize};

use crate::error::{ModelError, ModelResult};
use crate::token::RunMode;

/// Declarative configuration for one dispatch run.
///
/// Constructed once at startup and passed by reference to every component
/// that needs it; nothing reads ambient global state.
///
/// Fields cover:
/// - run shape (`run_mode`, `batch_size`, `batch_count`)
/// - pacing (`submit_interval_ms`)
/// - memory-pressure admission (`memory_threshold_bytes`, `admission_backoff_ms`)
/// - transport retry (`submit_retries`, `retry_backoff_ms`)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DispatchConfig {
    /// Stop after `batch_count` submissions, or loop over the source forever.
    pub run_mode: RunMode,
    /// Items per activity. Must be at least 1.
    pub batch_size: usize,
    /// Number of batches a bounded source submits. Ignored when endless.
    pub batch_count: u64,
    /// Delay between consecutive submissions, in milliseconds.
    pub submit_interval_ms: u64,
    /// Minimum available process memory required before a submission may
    /// proceed, in bytes.
    pub memory_threshold_bytes: u64,
    /// How long the admission gate waits before re-checking memory, in
    /// milliseconds.
    pub admission_backoff_ms: u64,
    /// How many times a transport failure is retried before the batch is
    /// dropped.
    pub submit_retries: u32,
    /// Wait between transport retries, in milliseconds.
    pub retry_backoff_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            run_mode: RunMode::Bounded,
            batch_size: 1,
            batch_count: 1,
            submit_interval_ms: 100,
            memory_threshold_bytes: 50 * 1024 * 1024,
            admission_backoff_ms: 250,
            submit_retries: 3,
            retry_backoff_ms: 250,
        }
    }
}

impl DispatchConfig {
    /// Validate the configuration before any submission happens.
    ///
    /// Malformed values are fatal at startup.
    pub fn validate(&self) -> ModelResult<()> {
        if self.batch_size == 0 {
            return Err(ModelError::InvalidConfig(
                "batchSize must be at least 1".to_string(),
            ));
        }
        if self.run_mode == RunMode::Bounded && self.batch_count == 0 {
            return Err(ModelError::InvalidConfig(
                "batchCount must be at least 1 in bounded mode".to_string(),
            ));
        }
        if self.admission_backoff_ms == 0 {
            return Err(ModelError::InvalidConfig(
                "admissionBackoffMs must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
