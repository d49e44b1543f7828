use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use eid_core::engine::{ChannelEngine, ExecutionEngine};
use eid_core::registry::ModelRegistry;
use eid_model::{ActivityAddr, NodeRole};
use eid_models::register_builtin;
use eid_observe::init_logger;

mod config;
use config::AgentConfig;

#[tokio::main(flavor = "multi_thread")]
async fn main() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .context("usage: eid-agentd <config.json>")?;
    let cfg = AgentConfig::load(Path::new(&path))?;

    // 1) logger
    init_logger(&cfg.logger)?;
    info!(role = %cfg.role, model = %cfg.model, context = %cfg.context, "agent starting");

    if cfg.role != NodeRole::Source {
        bail!(
            "this binary hosts the SOURCE role only (recognized roles: {})",
            role_tokens()
        );
    }

    // 2) shutdown signal
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received; draining");
                cancel.cancel();
            }
        });
    }

    // 3) registry with every built-in capability
    let mut registry = ModelRegistry::new();
    register_builtin(&mut registry, &cfg.dispatch, &cancel);
    let capability = registry.resolve(cfg.model)?;

    // 4) in-process engine + collector standing in for the target node
    let (engine, mut rx) = ChannelEngine::new(64, [cfg.context.tag().to_string()]);
    let destination = ActivityAddr::new();
    let collector = tokio::spawn(async move {
        let mut received = 0u64;
        while let Some(activity) = rx.recv().await {
            for key in activity.keys() {
                info!(%key, destination = %activity.destination(), "prediction input received");
            }
            received += activity.keys().len() as u64;
        }
        received
    });

    // 5) dispatch
    let summary = capability
        .run(
            Arc::new(engine) as Arc<dyn ExecutionEngine>,
            destination,
            &cfg.source,
            &cfg.context,
        )
        .await?;
    info!(%summary, "dispatch complete; draining collector");

    // The engine is dropped with the run, closing the channel; give the
    // collector a bounded window to finish.
    match tokio::time::timeout(Duration::from_secs(cfg.shutdown_timeout_secs), collector).await {
        Ok(Ok(received)) => info!(received, "agent exiting"),
        Ok(Err(e)) => warn!(error = %e, "collector task failed"),
        Err(_) => warn!(
            timeout_secs = cfg.shutdown_timeout_secs,
            "collector did not drain in time"
        ),
    }

    Ok(())
}

fn role_tokens() -> String {
    NodeRole::all()
        .iter()
        .map(|r| r.token())
        .collect::<Vec<_>>()
        .join(" ")
}
