use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

use crate::activity::ActivitySpec;
use crate::engine::{EngineError, ExecutionEngine};

/// In-process execution engine backed by a bounded mpsc channel.
///
/// The engine accepts a fixed set of routing-context tags, standing in for
/// a pool of executors with those capabilities. Activities with any other
/// tag are refused with [`EngineError::NoSuitableExecutor`]; a closed
/// receiver surfaces as a transport failure that hands the activity back.
pub struct ChannelEngine {
    accepts: Vec<String>,
    tx: mpsc::Sender<ActivitySpec>,
}

impl ChannelEngine {
    /// Create an engine accepting the given context tags.
    ///
    /// Returns the engine plus the receiving end the executor pool (or a
    /// test) drains.
    pub fn new<I, T>(capacity: usize, accepts: I) -> (Self, mpsc::Receiver<ActivitySpec>)
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        let (tx, rx) = mpsc::channel(capacity);
        let engine = Self {
            accepts: accepts.into_iter().map(Into::into).collect(),
            tx,
        };
        (engine, rx)
    }

    /// Returns `true` if at least one executor accepts the given tag.
    pub fn accepts_tag(&self, tag: &str) -> bool {
        self.accepts.iter().any(|t| t == tag)
    }
}

#[async_trait]
impl ExecutionEngine for ChannelEngine {
    async fn submit(&self, activity: ActivitySpec) -> Result<(), EngineError> {
        let tag = activity.context().tag();
        if !self.accepts_tag(tag) {
            return Err(EngineError::NoSuitableExecutor(tag.to_string()));
        }

        debug!(context = %activity.context(), items = activity.len(), "forwarding activity to executor channel");
        self.tx
            .send(activity)
            .await
            .map_err(|e| EngineError::Io("executor channel closed".to_string(), e.0))
    }
}
