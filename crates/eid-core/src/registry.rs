//! Model registry mapping a name token to a concrete capability.
//!
//! Registration is fixed at startup; an unregistered token is an explicit
//! error rather than a silent default, so a misconfigured model name fails
//! at the root cause instead of as a null dispatch far downstream.
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use eid_model::{ActivityAddr, ModelName, RoutingContext};

use crate::dispatcher::DispatchSummary;
use crate::engine::ExecutionEngine;
use crate::error::CoreError;

/// A named, swappable unit of inference dispatch logic.
///
/// Every registered model exposes the same contract: read its data source
/// and drive one dispatch run against the engine. Capabilities are
/// stateless from the dispatcher's point of view and constructed once per
/// run from the registry.
#[async_trait]
pub trait ModelCapability: Send + Sync {
    /// Capability name used in logs and diagnostics.
    fn name(&self) -> &'static str;

    /// Dispatch the dataset under `source` as activities addressed to
    /// `destination`, placed by `context`.
    async fn run(
        &self,
        engine: Arc<dyn ExecutionEngine>,
        destination: ActivityAddr,
        source: &Path,
        context: &RoutingContext,
    ) -> Result<DispatchSummary, CoreError>;
}

struct ModelEntry {
    name: ModelName,
    capability: Arc<dyn ModelCapability>,
}

/// Fixed mapping from model-name token to capability.
///
/// Entries are checked in registration order; the first entry matching the
/// token wins.
#[derive(Default)]
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Register a capability under a model-name token.
    pub fn register(&mut self, name: ModelName, capability: Arc<dyn ModelCapability>) {
        debug!(model = %name, capability = capability.name(), "registering model capability");
        self.entries.push(ModelEntry { name, capability });
    }

    /// Resolve a token to its capability.
    ///
    /// Fails with [`CoreError::UnknownModel`] when nothing is registered
    /// under the token.
    pub fn resolve(&self, name: ModelName) -> Result<Arc<dyn ModelCapability>, CoreError> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| Arc::clone(&e.capability))
            .ok_or_else(|| CoreError::UnknownModel(name.to_string()))
    }

    /// Returns `true` if a capability is registered under the token.
    pub fn contains(&self, name: ModelName) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }

    /// Number of registered capabilities.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
