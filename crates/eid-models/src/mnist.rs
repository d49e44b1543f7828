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

use crate::dataset::IdxPairSource;

/// MNIST capability: labeled 28x28 grayscale digits from an IDX file
/// pair.
pub struct Mnist {
    config: DispatchConfig,
    cancel: CancellationToken,
}

impl Mnist {
    pub fn new(config: DispatchConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }
}

#[async_trait]
impl ModelCapability for Mnist {
    fn name(&self) -> &'static str {
        "mnist"
    }

    async fn run(
        &self,
        engine: Arc<dyn ExecutionEngine>,
        destination: ActivityAddr,
        source: &Path,
        context: &RoutingContext,
    ) -> Result<DispatchSummary, CoreError> {
        debug!(source = %source.display(), "reading mnist idx pair");
        let mut reader = IdxPairSource::new(source);
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

/// Convolutional MNIST variant. Same dataset layout as [`Mnist`]; the
/// serving backend distinguishes the two by capability name.
pub struct MnistCnn {
    config: DispatchConfig,
    cancel: CancellationToken,
}

impl MnistCnn {
    pub fn new(config: DispatchConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }
}

#[async_trait]
impl ModelCapability for MnistCnn {
    fn name(&self) -> &'static str {
        "mnist_cnn"
    }

    async fn run(
        &self,
        engine: Arc<dyn ExecutionEngine>,
        destination: ActivityAddr,
        source: &Path,
        context: &RoutingContext,
    ) -> Result<DispatchSummary, CoreError> {
        debug!(source = %source.display(), "reading mnist idx pair");
        let mut reader = IdxPairSource::new(source);
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

#[cfg(test)]
mod tests {
    use super::{Mnist, MnistCnn};
    use eid_core::registry::ModelCapability;
    use eid_model::DispatchConfig;
    use tokio_util::sync::CancellationToken;

    #[test]
    fn capability_names_differ() {
        let config = DispatchConfig::default();
        let cancel = CancellationToken::new();

        assert_eq!(Mnist::new(config.clone(), cancel.clone()).name(), "mnist");
        assert_eq!(MnistCnn::new(config, cancel).name(), "mnist_cnn");
    }
}
