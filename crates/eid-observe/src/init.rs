use std::path::Path;

use tracing::Subscriber;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggerConfig;
use crate::error::{LoggerError, LoggerResult};
use crate::timer::LoggerUtc;

/// Text logger, to stdout or the configured file.
pub(crate) fn logger_text(cfg: &LoggerConfig) -> LoggerResult<()> {
    let filter = cfg.level.to_env_filter();
    match file_appender(cfg)? {
        Some(appender) => {
            let layer = fmt::layer()
                .with_ansi(false)
                .with_target(cfg.with_targets)
                .with_timer(LoggerUtc)
                .with_writer(appender);
            init_subscriber(tracing_subscriber::registry().with(filter).with(layer))
        }
        None => {
            let layer = fmt::layer()
                .with_ansi(cfg.should_use_color())
                .with_target(cfg.with_targets)
                .with_timer(LoggerUtc);
            init_subscriber(tracing_subscriber::registry().with(filter).with(layer))
        }
    }
}

/// JSON (structured) logger, to stdout or the configured file.
pub(crate) fn logger_json(cfg: &LoggerConfig) -> LoggerResult<()> {
    let filter = cfg.level.to_env_filter();
    match file_appender(cfg)? {
        Some(appender) => {
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(cfg.with_targets)
                .with_timer(LoggerUtc)
                .with_writer(appender);
            init_subscriber(tracing_subscriber::registry().with(filter).with(layer))
        }
        None => {
            let layer = fmt::layer()
                .json()
                .with_ansi(false)
                .with_target(cfg.with_targets)
                .with_timer(LoggerUtc);
            init_subscriber(tracing_subscriber::registry().with(filter).with(layer))
        }
    }
}

/// journald logger (Linux only). The file destination does not apply.
#[cfg(target_os = "linux")]
pub(crate) fn logger_journald(cfg: &LoggerConfig) -> LoggerResult<()> {
    let filter = cfg.level.to_env_filter();
    let journald =
        tracing_journald::layer().map_err(|e| LoggerError::JournaldInitFailed(e.to_string()))?;

    init_subscriber(tracing_subscriber::registry().with(filter).with(journald))
}

#[cfg(not(target_os = "linux"))]
pub(crate) fn logger_journald(_cfg: &LoggerConfig) -> LoggerResult<()> {
    Err(LoggerError::JournaldNotSupported)
}

/// Build the file appender for the configured output path, if any.
fn file_appender(cfg: &LoggerConfig) -> LoggerResult<Option<RollingFileAppender>> {
    let Some(path) = cfg.output.as_ref() else {
        return Ok(None);
    };
    let file = path
        .file_name()
        .ok_or_else(|| LoggerError::InvalidOutput(path.display().to_string()))?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Ok(Some(tracing_appender::rolling::never(dir, file)))
}

/// Installs the subscriber as the global default.
fn init_subscriber<S>(subscriber: S) -> LoggerResult<()>
where
    S: Subscriber + Send + Sync + 'static,
{
    subscriber
        .try_init()
        .map_err(|_| LoggerError::AlreadyInitialized)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::file_appender;
    use crate::config::LoggerConfig;
    use crate::error::LoggerError;

    #[test]
    fn no_output_means_no_appender() {
        let cfg = LoggerConfig::default();
        assert!(file_appender(&cfg).unwrap().is_none());
    }

    #[test]
    fn nested_path_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = LoggerConfig {
            output: Some(dir.path().join("run.log")),
            ..Default::default()
        };
        assert!(file_appender(&cfg).unwrap().is_some());
    }

    #[test]
    fn directory_path_is_rejected() {
        let cfg = LoggerConfig {
            output: Some(PathBuf::from("/")),
            ..Default::default()
        };
        let err = file_appender(&cfg).unwrap_err();
        assert!(matches!(err, LoggerError::InvalidOutput(_)));
    }
}
