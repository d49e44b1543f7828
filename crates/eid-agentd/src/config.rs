use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use eid_model::{DispatchConfig, ModelName, NodeRole, RoutingContext};
use eid_observe::LoggerConfig;

/// Full agent configuration.
///
/// Loaded once at startup from a JSON file and passed by reference to the
/// components that need it; nothing reads ambient global state afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfig {
    /// Role this node plays in the deployment.
    pub role: NodeRole,
    /// Model whose dataset this node dispatches.
    pub model: ModelName,
    /// Dataset directory.
    pub source: PathBuf,
    /// Routing context tag used for executor selection.
    #[serde(default)]
    pub context: RoutingContext,
    /// Seconds allowed for a graceful drain once shutdown is signaled.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_secs: u64,
    #[serde(default)]
    pub logger: LoggerConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

fn default_shutdown_timeout() -> u64 {
    60
}

impl AgentConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let cfg: AgentConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        cfg.dispatch.validate()?;
        Ok(cfg)
    }
}
