//! Execution-engine boundary.
//!
//! The engine that actually runs activities is an external collaborator;
//! the dispatcher only depends on this submission seam. Implementations
//! decide placement from the activity's routing context.
mod channel;
pub use channel::ChannelEngine;

use async_trait::async_trait;
use thiserror::Error;

use crate::activity::ActivitySpec;

#[derive(Debug, Error)]
pub enum EngineError {
    /// No executor advertises the activity's routing context. Fatal for
    /// this activity; the run continues with the next batch.
    #[error("no suitable executor for context: {0}")]
    NoSuitableExecutor(String),

    /// Transport failure. The activity is handed back so the caller can
    /// retry the submission.
    #[error("submission transport failure: {0}")]
    Io(String, ActivitySpec),
}

/// Task submission primitive of the execution engine.
///
/// Submission is fire-and-forget: the engine runs accepted activities
/// concurrently and delivers results to the activity's destination on its
/// own schedule. The caller keeps no reference to an accepted activity.
#[async_trait]
pub trait ExecutionEngine: Send + Sync {
    /// Hand one activity to the engine.
    async fn submit(&self, activity: ActivitySpec) -> Result<(), EngineError>;
}
