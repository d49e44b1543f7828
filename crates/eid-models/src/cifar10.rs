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

use crate::dataset::CifarRecordSource;

/// CIFAR-10 capability: labeled 32x32 RGB records from a binary batch
/// file.
pub struct Cifar10 {
    config: DispatchConfig,
    cancel: CancellationToken,
}

impl Cifar10 {
    pub fn new(config: DispatchConfig, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }
}

#[async_trait]
impl ModelCapability for Cifar10 {
    fn name(&self) -> &'static str {
        "cifar10"
    }

    async fn run(
        &self,
        engine: Arc<dyn ExecutionEngine>,
        destination: ActivityAddr,
        source: &Path,
        context: &RoutingContext,
    ) -> Result<DispatchSummary, CoreError> {
        debug!(source = %source.display(), "reading cifar10 batch file");
        let mut reader = CifarRecordSource::new(source);
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
    use std::fs;
    use std::sync::Arc;

    use tokio_util::sync::CancellationToken;

    use super::Cifar10;
    use eid_core::engine::{ChannelEngine, ExecutionEngine};
    use eid_core::registry::ModelCapability;
    use eid_model::{ActivityAddr, DispatchConfig, RoutingContext, RunMode};

    #[tokio::test]
    async fn dispatches_one_activity_per_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut bytes = vec![1u8; 3073];
        bytes.extend(vec![2u8; 3073]);
        fs::write(dir.path().join("data_batch_1.bin"), bytes).unwrap();

        let (engine, mut rx) = ChannelEngine::new(8, ["target"]);
        let config = DispatchConfig {
            run_mode: RunMode::Bounded,
            batch_count: 2,
            submit_interval_ms: 0,
            memory_threshold_bytes: 0,
            ..Default::default()
        };
        let capability = Cifar10::new(config, CancellationToken::new());

        let summary = capability
            .run(
                Arc::new(engine) as Arc<dyn ExecutionEngine>,
                ActivityAddr::new(),
                dir.path(),
                &RoutingContext::default(),
            )
            .await
            .unwrap();

        assert_eq!(summary.submitted, 2);
        assert_eq!(summary.dropped, 0);

        let first = rx.recv().await.unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first.targets(), Some([1u8].as_slice()));
        assert_eq!(first.payloads()[0].len(), 3072);

        let second = rx.recv().await.unwrap();
        assert_eq!(second.targets(), Some([2u8].as_slice()));
    }
}
