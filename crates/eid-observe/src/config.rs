use std::io::IsTerminal;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::format::LoggerFormat;
use crate::level::LoggerLevel;

/// Logger configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    /// Output format.
    pub format: LoggerFormat,
    /// Level filter expression (e.g. "info", "eid_core=debug,info").
    pub level: LoggerLevel,
    /// Whether log lines carry module/target names.
    pub with_targets: bool,
    /// Whether to use colored output on a terminal.
    pub use_color: bool,
    /// Log file destination. `None` logs to stdout.
    pub output: Option<PathBuf>,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            format: LoggerFormat::default(),
            level: LoggerLevel::default(),
            with_targets: true,
            use_color: true,
            output: None,
        }
    }
}

impl LoggerConfig {
    /// Whether colored output should actually be used.
    ///
    /// Requires color to be enabled, stdout to be a terminal, and no file
    /// destination to be configured. Evaluated at logger initialization so
    /// terminal detection is accurate.
    pub fn should_use_color(&self) -> bool {
        self.use_color && self.output.is_none() && std::io::stdout().is_terminal()
    }
}
