use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use eid_core::dispatcher::{DispatchSummary, Dispatcher};
use eid_core::engine::ExecutionEngine;
use eid_core::error::CoreError;
use eid_core::registry::ModelCapability;
use eid_model::{ActivityAddr, DispatchConfig, RoutingContext};

use crate::dataset::DirSource;

/// YOLO capability: unlabeled raw image files read from a directory.
pub struct Yolo {
    config: DispatchConfig,
    cancel: CancellationToken,
}

impl Yolo {
    pub fn new(config: DispatchConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }
}

#[async_trait]
impl ModelCapability for Yolo {
    fn name(&self) -> &'static str {
        "yolo"
    }

    async fn run(
        &self,
        engine: Arc<dyn ExecutionEngine>,
        destination: ActivityAddr,
        source: &Path,
        context: &RoutingContext,
    ) -> Result<DispatchSummary, CoreError> {
        debug!(source = %source.display(), "scanning image directory");
        let mut reader = DirSource::new(source);
        let mut dispatcher = Dispatcher::new(
            self.name(),
            engine,
            &self.config,
            context.clone(),
            destination,
            self.cancel.clone(),
        )?;
        dispatcher.run(&mut reader).await
    }
}

/// Reduced YOLO variant for constrained executors. Same dataset layout as
/// [`Yolo`].
pub struct TinyYolo {
    config: DispatchConfig,
    cancel: CancellationToken,
}

impl TinyYolo {
    pub fn new(config: DispatchConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }
}

#[async_trait]
impl ModelCapability for TinyYolo {
    fn name(&self) -> &'static str {
        "tiny_yolo"
    }

    async fn run(
        &self,
        engine: Arc<dyn ExecutionEngine>,
        destination: ActivityAddr,
        source: &Path,
        context: &RoutingContext,
    ) -> Result<DispatchSummary, CoreError> {
        debug!(source = %source.display(), "scanning image directory");
        let mut reader = DirSource::new(source);
        let mut dispatcher = Dispatcher::new(
            self.name(),
            engine,
            &self.config,
            context.clone(),
            destination,
            self.cancel.clone(),
        )?;
        dispatcher.run(&mut reader).await
    }
}
