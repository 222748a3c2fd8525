//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the tracing subscriber from `[log]`
//! - Fan out to console and/or a rotating log file
//! - Honour `RUST_LOG` over the configured level
//!
//! # Design Decisions
//! - Uses tracing crate for structured logging
//! - File output goes through a non-blocking writer; the returned guard
//!   must live until shutdown so buffered lines are flushed
//! - Rotation is time-based and old files are pruned by count

use std::path::Path;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogConfig, LogRotation};

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("invalid log file path {0:?}")]
    FilePath(String),

    #[error("failed to open log file: {0}")]
    File(#[from] InitError),

    #[error("failed to install subscriber: {0}")]
    Install(#[from] tracing_subscriber::util::TryInitError),
}

/// Install the global subscriber.
///
/// Returns the file writer guard when a log file is configured.
pub fn init_logging(config: &LogConfig) -> Result<Option<WorkerGuard>, LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console = config.console.then(fmt::layer);

    let (file, guard) = match config.filepath.as_deref() {
        Some(path) => {
            let appender = file_appender(Path::new(path), config)?;
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()?;

    Ok(guard)
}

fn file_appender(path: &Path, config: &LogConfig) -> Result<RollingFileAppender, LoggingError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| LoggingError::FilePath(path.display().to_string()))?;
    let directory = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut builder = RollingFileAppender::builder()
        .rotation(rotation(config.rotation))
        .filename_prefix(name);
    if config.max_files > 0 {
        builder = builder.max_log_files(config.max_files);
    }
    Ok(builder.build(directory)?)
}

fn rotation(rotation: LogRotation) -> Rotation {
    match rotation {
        LogRotation::Minutely => Rotation::MINUTELY,
        LogRotation::Hourly => Rotation::HOURLY,
        LogRotation::Daily => Rotation::DAILY,
        LogRotation::Never => Rotation::NEVER,
    }
}
