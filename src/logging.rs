//! Process-wide logging setup.
//!
//! Every process writes a fresh `session_<YYYYmmdd_HHMMSS>.log` file under the log
//! directory.  The relay server also logs to stderr; the interactive chat keeps the
//! terminal for the conversation and logs to the file only.
//!
//! The filter comes from the `THINKRELAY_LOG` environment variable (same syntax as
//! `RUST_LOG`) when set, else from configuration.

use std::fs;
use std::path::PathBuf;

use time::OffsetDateTime;
use time::macros::format_description;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Error, Result};

/// Environment variable holding a log filter directive.
pub const LOG_ENV: &str = "THINKRELAY_LOG";

/// Directory used when none is configured.
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Filter used when none is configured.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Where and how much to log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Directory receiving the session log file.
    pub dir: PathBuf,
    /// Filter directive used when `THINKRELAY_LOG` is unset.
    pub level: String,
    /// Whether to also log to stderr.
    pub stderr: bool,
}

impl LoggingConfig {
    /// Defaults: `logs/`, `info`, stderr enabled.
    pub fn new() -> Self {
        Self {
            dir: PathBuf::from(DEFAULT_LOG_DIR),
            level: DEFAULT_LOG_LEVEL.to_string(),
            stderr: true,
        }
    }

    /// Overrides the log directory when `dir` is set.
    pub fn with_dir(mut self, dir: Option<PathBuf>) -> Self {
        if let Some(dir) = dir {
            self.dir = dir;
        }
        self
    }

    /// Overrides the filter when `level` is set.
    pub fn with_level(mut self, level: Option<String>) -> Self {
        if let Some(level) = level {
            self.level = level;
        }
        self
    }

    /// Enables or disables stderr output.
    pub fn with_stderr(mut self, stderr: bool) -> Self {
        self.stderr = stderr;
        self
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Name of the log file for a session starting at `started`.
pub fn session_log_name(started: OffsetDateTime) -> Result<String> {
    let stamp = started
        .format(format_description!(
            "[year][month][day]_[hour][minute][second]"
        ))
        .map_err(|err| Error::configuration(format!("failed to format log timestamp: {err}")))?;
    Ok(format!("session_{stamp}.log"))
}

/// Installs the global subscriber.
///
/// Returns the path of the session log and the guard that flushes it; keep the guard
/// alive for the life of the process.
pub fn init_logging(config: &LoggingConfig) -> Result<(PathBuf, WorkerGuard)> {
    fs::create_dir_all(&config.dir).map_err(|err| {
        Error::io(
            format!("failed to create log directory {}", config.dir.display()),
            err,
        )
    })?;
    let file_name = session_log_name(OffsetDateTime::now_utc())?;
    let path = config.dir.join(&file_name);

    let appender = tracing_appender::rolling::never(&config.dir, &file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|err| Error::configuration(format!("invalid log filter: {err}")))?;

    let file_layer = fmt::layer().with_writer(writer).with_ansi(false);
    let stderr_layer = config
        .stderr
        .then(|| fmt::layer().compact().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(|err| Error::configuration(format!("logging already initialized: {err}")))?;

    Ok((path, guard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn log_name_uses_compact_timestamp() {
        let name = session_log_name(datetime!(2025-03-04 05:06:07 UTC)).unwrap();
        assert_eq!(name, "session_20250304_050607.log");
    }

    #[test]
    fn builder_overrides_only_when_set() {
        let config = LoggingConfig::new()
            .with_dir(None)
            .with_level(Some("thinkrelay=debug".to_string()))
            .with_stderr(false);
        assert_eq!(config.dir, PathBuf::from(DEFAULT_LOG_DIR));
        assert_eq!(config.level, "thinkrelay=debug");
        assert!(!config.stderr);
    }
}
