//! # Logging Setup
//!
//! Installs the global `tracing` subscriber for the node binaries.
//!
//! `RUST_LOG` takes precedence; otherwise the `[logging] level` from the
//! config applies. When `file_dir` is set, output is also written to a daily
//! rolling file.

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;

/// Log file name prefix inside `file_dir`
pub const LOG_FILE_PREFIX: &str = "rc-link.log";

/// Initialize logging
///
/// The returned guard must be kept alive for the lifetime of the program,
/// otherwise buffered file output is lost.
///
/// # Errors
///
/// Returns error if the configured level is not a valid filter directive or
/// a global subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => filter_for_level(&config.level)?,
    };

    let (file_layer, guard) = match config.file_dir.as_deref() {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

/// Filter for a configured level such as `info` or `rc_link=debug,warn`
pub fn filter_for_level(level: &str) -> Result<EnvFilter> {
    EnvFilter::try_new(level).with_context(|| format!("Invalid log level {:?}", level))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_for_plain_level() {
        assert!(filter_for_level("info").is_ok());
        assert!(filter_for_level("debug").is_ok());
    }

    #[test]
    fn test_filter_for_directives() {
        assert!(filter_for_level("rc_link=trace,warn").is_ok());
    }

    #[test]
    fn test_filter_for_invalid_level() {
        assert!(filter_for_level("rc_link=notalevel").is_err());
    }
}
