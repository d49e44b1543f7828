//! The dispatch loop: read, batch, key, gate, submit.
//!
//! One dispatcher drives one data source as a single sequential loop.
//! Submission is fire-and-forget; the only blocking points are the
//! admission gate and the inter-submission delay. Batches go out in read
//! order, and a per-activity failure never halts the batches behind it.
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, trace, warn};

use eid_model::{ActivityAddr, DispatchConfig, Item, ItemKey, RoutingContext, RunMode};

use crate::activity::{ActivityFlags, ActivitySpec};
use crate::admission::{Admission, AdmissionGate, MemoryProbe};
use crate::batch::BatchBuilder;
use crate::engine::{EngineError, ExecutionEngine};
use crate::error::CoreError;
use crate::identity::batch_keys;
use crate::metrics::{MetricsHandle, noop_metrics};
use crate::source::ItemSource;

/// Lifecycle states of a dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Reading,
    Batching,
    Gating,
    Submitting,
    Draining,
    Terminated,
}

/// Counters reported after a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Activities accepted by the engine.
    pub submitted: u64,
    /// Activities dropped (no suitable executor, or transport failure
    /// after retries). Correlation for their items is permanently
    /// incomplete.
    pub dropped: u64,
}

impl fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} submitted, {} dropped", self.submitted, self.dropped)
    }
}

/// Sequential dispatch loop over one data source.
///
/// Owns the routing context and destination for the whole run; both are
/// immutable after construction.
pub struct Dispatcher {
    label: &'static str,
    engine: Arc<dyn ExecutionEngine>,
    config: DispatchConfig,
    context: RoutingContext,
    destination: ActivityAddr,
    cancel: CancellationToken,
    builder: BatchBuilder,
    gate: AdmissionGate,
    metrics: MetricsHandle,
}

impl Dispatcher {
    /// Build a dispatcher, validating the configuration up front.
    ///
    /// `label` names the driving capability in logs and metrics.
    pub fn new(
        label: &'static str,
        engine: Arc<dyn ExecutionEngine>,
        config: &DispatchConfig,
        context: RoutingContext,
        destination: ActivityAddr,
        cancel: CancellationToken,
    ) -> Result<Self, CoreError> {
        config.validate()?;
        let builder = BatchBuilder::new(config.batch_size)?;
        let gate = AdmissionGate::with_sysinfo(
            config.memory_threshold_bytes,
            Duration::from_millis(config.admission_backoff_ms),
        );
        Ok(Self {
            label,
            engine,
            config: config.clone(),
            context,
            destination,
            cancel,
            builder,
            gate,
            metrics: noop_metrics(),
        })
    }

    /// Replace the admission gate's memory probe.
    pub fn with_probe(mut self, probe: Box<dyn MemoryProbe>) -> Self {
        self.gate.set_probe(probe);
        self
    }

    /// Attach a metrics backend.
    pub fn with_metrics(mut self, metrics: MetricsHandle) -> Self {
        self.gate.set_metrics(Arc::clone(&metrics), self.label);
        self.metrics = metrics;
        self
    }

    /// Drive the source until it is exhausted, the bounded batch count is
    /// reached, or shutdown is signaled.
    ///
    /// Startup-class errors (configuration, invariants) and a source that
    /// keeps failing abort the run; per-activity failures are logged with
    /// their item keys, counted as drops and skipped.
    #[instrument(level = "debug", skip(self, source), fields(model = self.label))]
    pub async fn run(&mut self, source: &mut dyn ItemSource) -> Result<DispatchSummary, CoreError> {
        let mut state = DispatchState::Idle;
        let mut summary = DispatchSummary::default();
        let mut attempted: u64 = 0;

        info!(
            source = %source.describe(),
            context = %self.context,
            destination = %self.destination,
            mode = %self.config.run_mode,
            "dispatch run starting"
        );

        'run: loop {
            self.transition(&mut state, DispatchState::Reading);
            let items = self.read_items(source).await?;
            if items.is_empty() {
                info!("data source exhausted; ending run");
                break 'run;
            }

            self.transition(&mut state, DispatchState::Batching);
            let batches = self.builder.split(items);
            debug!(batches = batches.len(), "pass batched");

            for batch in batches {
                self.transition(&mut state, DispatchState::Gating);
                if self.gate.admit(&self.cancel).await == Admission::Cancelled {
                    // Ungated batches are discarded, never resubmitted.
                    self.transition(&mut state, DispatchState::Draining);
                    break 'run;
                }

                self.transition(&mut state, DispatchState::Submitting);
                let keys = batch_keys(batch.iter());
                let activity = ActivitySpec::assemble(
                    batch,
                    keys.clone(),
                    self.destination,
                    self.context.clone(),
                    ActivityFlags::source(),
                )?;
                attempted += 1;

                match self.submit_with_retry(activity).await {
                    Ok(()) => {
                        summary.submitted += 1;
                        self.metrics.record_submitted(self.label, keys.len());
                        debug!(keys = %render_keys(&keys), "activity submitted");
                    }
                    Err(EngineError::NoSuitableExecutor(tag)) => {
                        summary.dropped += 1;
                        self.metrics.record_dropped(self.label, "no-suitable-executor");
                        warn!(
                            context = %tag,
                            keys = %render_keys(&keys),
                            "no suitable executor; activity dropped"
                        );
                    }
                    Err(EngineError::Io(reason, _activity)) => {
                        summary.dropped += 1;
                        self.metrics.record_dropped(self.label, "transport");
                        error!(
                            reason = %reason,
                            keys = %render_keys(&keys),
                            "submission failed after retries; activity dropped"
                        );
                    }
                }

                self.transition(&mut state, DispatchState::Idle);
                if self.bounded_done(attempted) {
                    break 'run;
                }
                if !self.pause().await {
                    self.transition(&mut state, DispatchState::Draining);
                    break 'run;
                }
            }
        }

        self.transition(&mut state, DispatchState::Terminated);
        info!(%summary, "dispatch run finished");
        Ok(summary)
    }

    fn transition(&self, state: &mut DispatchState, next: DispatchState) {
        trace!(from = ?state, to = ?next, "dispatch state");
        *state = next;
    }

    fn bounded_done(&self, attempted: u64) -> bool {
        self.config.run_mode == RunMode::Bounded && attempted >= self.config.batch_count
    }

    /// Read one pass, retrying transient failures a bounded number of
    /// times before giving up on the run.
    async fn read_items(&self, source: &mut dyn ItemSource) -> Result<Vec<Item>, CoreError> {
        let mut attempt: u32 = 0;
        loop {
            match source.load() {
                Ok(items) => return Ok(items),
                Err(e) => {
                    attempt += 1;
                    if attempt > self.config.submit_retries {
                        error!(error = %e, "data source read failed; giving up");
                        return Err(CoreError::Io(e));
                    }
                    warn!(attempt, error = %e, "data source read failed; retrying");
                    tokio::time::sleep(Duration::from_millis(self.config.retry_backoff_ms)).await;
                }
            }
        }
    }

    /// Submit one activity, retrying transport failures. The engine hands
    /// the activity back on transport errors, so nothing is rebuilt.
    async fn submit_with_retry(&self, activity: ActivitySpec) -> Result<(), EngineError> {
        let mut activity = activity;
        let mut attempt: u32 = 0;
        loop {
            match self.engine.submit(activity).await {
                Ok(()) => return Ok(()),
                Err(EngineError::NoSuitableExecutor(tag)) => {
                    return Err(EngineError::NoSuitableExecutor(tag));
                }
                Err(EngineError::Io(reason, returned)) => {
                    attempt += 1;
                    if attempt > self.config.submit_retries {
                        return Err(EngineError::Io(reason, returned));
                    }
                    warn!(
                        attempt,
                        retries = self.config.submit_retries,
                        reason = %reason,
                        "submission transport failure; retrying"
                    );
                    tokio::time::sleep(Duration::from_millis(self.config.retry_backoff_ms)).await;
                    activity = returned;
                }
            }
        }
    }

    /// Inter-submission delay. Returns `false` when shutdown was signaled
    /// during the wait.
    async fn pause(&self) -> bool {
        if self.config.submit_interval_ms == 0 {
            return !self.cancel.is_cancelled();
        }
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(Duration::from_millis(self.config.submit_interval_ms)) => true,
        }
    }
}

fn render_keys(keys: &[ItemKey]) -> String {
    keys.iter()
        .map(|k| k.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::io;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use async_trait::async_trait;
    use tokio_util::sync::CancellationToken;

    use super::{DispatchSummary, Dispatcher};
    use crate::activity::ActivitySpec;
    use crate::admission::MemoryProbe;
    use crate::engine::{EngineError, ExecutionEngine};
    use crate::error::CoreError;
    use crate::identity::item_key;
    use crate::source::{ItemSource, VecSource};
    use eid_model::{ActivityAddr, DispatchConfig, Item, ItemKey, RoutingContext, RunMode};

    #[derive(Clone, Copy)]
    enum Script {
        Accept,
        RefuseContext,
        FailTransport,
    }

    /// Engine replaying a scripted response per submission; accepts once
    /// the script is exhausted. Accepted activities are recorded in order.
    #[derive(Default)]
    struct ScriptedEngine {
        script: Mutex<VecDeque<Script>>,
        accepted: Mutex<Vec<ActivitySpec>>,
    }

    impl ScriptedEngine {
        fn scripted(script: impl IntoIterator<Item = Script>) -> Arc<Self> {
            Arc::new(Self {
                script: Mutex::new(script.into_iter().collect()),
                accepted: Mutex::new(Vec::new()),
            })
        }

        fn accepted_keys(&self) -> Vec<Vec<ItemKey>> {
            self.accepted
                .lock()
                .unwrap()
                .iter()
                .map(|a| a.keys().to_vec())
                .collect()
        }
    }

    #[async_trait]
    impl ExecutionEngine for ScriptedEngine {
        async fn submit(&self, activity: ActivitySpec) -> Result<(), EngineError> {
            let action = self
                .script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Script::Accept);
            match action {
                Script::Accept => {
                    self.accepted.lock().unwrap().push(activity);
                    Ok(())
                }
                Script::RefuseContext => Err(EngineError::NoSuitableExecutor(
                    activity.context().tag().to_string(),
                )),
                Script::FailTransport => {
                    Err(EngineError::Io("transport down".to_string(), activity))
                }
            }
        }
    }

    /// Probe reporting a constant amount of available memory.
    struct FixedProbe(u64);

    impl MemoryProbe for FixedProbe {
        fn available_bytes(&mut self) -> u64 {
            self.0
        }
    }

    /// Source producing one fresh single-item pass per load, forever.
    struct EndlessSource {
        loads: u8,
    }

    impl ItemSource for EndlessSource {
        fn describe(&self) -> String {
            "endless test source".to_string()
        }

        fn load(&mut self) -> io::Result<Vec<Item>> {
            self.loads = self.loads.wrapping_add(1);
            Ok(vec![Item::new(vec![self.loads])])
        }
    }

    /// Source failing a scripted number of reads before succeeding.
    struct FlakySource {
        failures: u32,
        items: Option<Vec<Item>>,
    }

    impl ItemSource for FlakySource {
        fn describe(&self) -> String {
            "flaky test source".to_string()
        }

        fn load(&mut self) -> io::Result<Vec<Item>> {
            if self.failures > 0 {
                self.failures -= 1;
                return Err(io::Error::new(io::ErrorKind::Other, "read failed"));
            }
            Ok(self.items.take().unwrap_or_default())
        }
    }

    fn config(batch_count: u64) -> DispatchConfig {
        DispatchConfig {
            batch_count,
            submit_interval_ms: 1,
            memory_threshold_bytes: 100,
            admission_backoff_ms: 1,
            retry_backoff_ms: 1,
            ..Default::default()
        }
    }

    fn dispatcher(
        engine: Arc<ScriptedEngine>,
        cfg: &DispatchConfig,
        cancel: CancellationToken,
    ) -> Dispatcher {
        Dispatcher::new(
            "test",
            engine as Arc<dyn ExecutionEngine>,
            cfg,
            RoutingContext::default(),
            ActivityAddr::new(),
            cancel,
        )
        .unwrap()
        .with_probe(Box::new(FixedProbe(u64::MAX)))
    }

    fn abc() -> Vec<Item> {
        vec![
            Item::new(vec![b'a']),
            Item::new(vec![b'b']),
            Item::new(vec![b'c']),
        ]
    }

    #[tokio::test]
    async fn bounded_run_submits_every_batch_in_order() {
        let engine = ScriptedEngine::scripted([]);
        let mut source = VecSource::single(abc());
        let mut dispatcher = dispatcher(Arc::clone(&engine), &config(3), CancellationToken::new());

        let summary = dispatcher.run(&mut source).await.unwrap();

        assert_eq!(summary, DispatchSummary { submitted: 3, dropped: 0 });
        let expected: Vec<Vec<ItemKey>> = abc().iter().map(|i| vec![item_key(i)]).collect();
        assert_eq!(engine.accepted_keys(), expected);
    }

    #[tokio::test]
    async fn refused_task_is_dropped_and_run_continues() {
        let engine =
            ScriptedEngine::scripted([Script::Accept, Script::RefuseContext, Script::Accept]);
        let mut source = VecSource::single(abc());
        let mut dispatcher = dispatcher(Arc::clone(&engine), &config(3), CancellationToken::new());

        let summary = dispatcher.run(&mut source).await.unwrap();

        assert_eq!(summary, DispatchSummary { submitted: 2, dropped: 1 });
        let items = abc();
        let expected = vec![vec![item_key(&items[0])], vec![item_key(&items[2])]];
        assert_eq!(engine.accepted_keys(), expected);
    }

    #[tokio::test]
    async fn transport_failure_is_retried_until_accepted() {
        let engine = ScriptedEngine::scripted([Script::FailTransport, Script::FailTransport]);
        let mut source = VecSource::single(vec![Item::new(vec![1])]);
        let mut dispatcher = dispatcher(Arc::clone(&engine), &config(1), CancellationToken::new());

        let summary = dispatcher.run(&mut source).await.unwrap();

        assert_eq!(summary, DispatchSummary { submitted: 1, dropped: 0 });
        assert_eq!(engine.accepted_keys().len(), 1);
    }

    #[tokio::test]
    async fn transport_failure_exhausting_retries_drops_the_batch() {
        let engine = ScriptedEngine::scripted([
            Script::FailTransport,
            Script::FailTransport,
            Script::FailTransport,
            Script::FailTransport,
        ]);
        let mut cfg = config(1);
        cfg.submit_retries = 3;
        let mut source = VecSource::single(vec![Item::new(vec![1])]);
        let mut dispatcher = dispatcher(Arc::clone(&engine), &cfg, CancellationToken::new());

        let summary = dispatcher.run(&mut source).await.unwrap();

        assert_eq!(summary, DispatchSummary { submitted: 0, dropped: 1 });
        assert!(engine.accepted_keys().is_empty());
    }

    #[tokio::test]
    async fn bounded_run_stops_at_batch_count() {
        let engine = ScriptedEngine::scripted([]);
        let mut source = VecSource::single(abc());
        let mut dispatcher = dispatcher(Arc::clone(&engine), &config(2), CancellationToken::new());

        let summary = dispatcher.run(&mut source).await.unwrap();

        assert_eq!(summary.submitted, 2);
    }

    #[tokio::test]
    async fn empty_source_terminates_even_in_endless_mode() {
        let engine = ScriptedEngine::scripted([]);
        let mut cfg = config(1);
        cfg.run_mode = RunMode::Endless;
        let mut source = VecSource::single(Vec::new());
        let mut dispatcher = dispatcher(Arc::clone(&engine), &cfg, CancellationToken::new());

        let summary = dispatcher.run(&mut source).await.unwrap();

        assert_eq!(summary, DispatchSummary::default());
    }

    #[tokio::test]
    async fn pre_cancelled_run_submits_nothing() {
        let engine = ScriptedEngine::scripted([]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let mut source = VecSource::single(abc());
        let mut dispatcher = dispatcher(Arc::clone(&engine), &config(3), cancel);

        let summary = dispatcher.run(&mut source).await.unwrap();

        assert_eq!(summary, DispatchSummary::default());
        assert!(engine.accepted_keys().is_empty());
    }

    #[tokio::test]
    async fn endless_run_drains_on_cancellation() {
        let engine = ScriptedEngine::scripted([]);
        let cancel = CancellationToken::new();
        let mut cfg = config(1);
        cfg.run_mode = RunMode::Endless;
        cfg.submit_interval_ms = 5;
        let mut source = EndlessSource { loads: 0 };
        let mut dispatcher = dispatcher(Arc::clone(&engine), &cfg, cancel.clone());

        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            canceller.cancel();
        });

        let summary = dispatcher.run(&mut source).await.unwrap();

        // Everything that passed the gate was submitted, nothing dropped,
        // and the loop terminated instead of running forever.
        assert_eq!(summary.dropped, 0);
        assert!(summary.submitted >= 1);
        assert_eq!(engine.accepted_keys().len() as u64, summary.submitted);
    }

    #[tokio::test]
    async fn flaky_source_read_is_retried() {
        let engine = ScriptedEngine::scripted([]);
        let mut source = FlakySource {
            failures: 2,
            items: Some(vec![Item::new(vec![1])]),
        };
        let mut dispatcher = dispatcher(Arc::clone(&engine), &config(1), CancellationToken::new());

        let summary = dispatcher.run(&mut source).await.unwrap();

        assert_eq!(summary.submitted, 1);
    }

    #[tokio::test]
    async fn persistent_source_failure_is_fatal() {
        let engine = ScriptedEngine::scripted([]);
        let mut source = FlakySource {
            failures: 10,
            items: None,
        };
        let mut dispatcher = dispatcher(Arc::clone(&engine), &config(1), CancellationToken::new());

        let err = dispatcher.run(&mut source).await.unwrap_err();
        assert!(matches!(err, CoreError::Io(_)));
    }

    #[test]
    fn zero_batch_size_is_rejected_at_construction() {
        let engine = ScriptedEngine::scripted([]);
        let cfg = DispatchConfig {
            batch_size: 0,
            ..Default::default()
        };

        let res = Dispatcher::new(
            "test",
            engine as Arc<dyn ExecutionEngine>,
            &cfg,
            RoutingContext::default(),
            ActivityAddr::new(),
            CancellationToken::new(),
        );
        assert!(matches!(res, Err(CoreError::InvalidConfig(_))));
    }

    #[test]
    fn summary_display_is_operator_friendly() {
        let summary = DispatchSummary { submitted: 3, dropped: 1 };
        assert_eq!(summary.to_string(), "3 submitted, 1 dropped");
    }
}
