//! Diagnostic logging via `tracing-subscriber`: stderr plus an appended
//! plain-text log file.

use std::path::Path;

use anyhow::{Context, Result};
use bootstrap_common::types::TIMESTAMP_FORMAT;
use clap::ValueEnum;
use tracing::Subscriber;
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

/// Default log file, relative to the working directory.
pub const DEFAULT_LOG_FILE: &str = "agent_bootstrap.log";

/// Accepted `--log-level` values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    #[default]
    #[value(name = "DEBUG")]
    Debug,
    #[value(name = "INFO")]
    Info,
    #[value(name = "WARN")]
    Warn,
    #[value(name = "ERROR")]
    Error,
    /// Same as `ERROR`.
    #[value(name = "CRITICAL")]
    Critical,
}

impl LogLevel {
    #[must_use]
    pub fn filter(self) -> LevelFilter {
        match self {
            Self::Debug => LevelFilter::DEBUG,
            Self::Info => LevelFilter::INFO,
            Self::Warn => LevelFilter::WARN,
            Self::Error | Self::Critical => LevelFilter::ERROR,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `level` when set.
///
/// An unwritable `log_file` is reported once on stderr and logging
/// continues without it.
pub fn init(level: LogLevel, log_file: &Path) {
    let filter = EnvFilter::builder()
        .with_default_directive(level.filter().into())
        .from_env_lossy();
    let (file, file_error) = match open_log_file(log_file) {
        Ok(appender) => (Some(file_layer(appender)), None),
        Err(err) => (None, Some(err)),
    };
    let stderr = fmt::layer()
        .with_timer(timer())
        .with_target(false)
        .with_writer(std::io::stderr);
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr)
        .with(file)
        .try_init();
    if let Some(err) = file_error {
        tracing::warn!("Not writing log file: {err:#}");
    }
}

fn timer() -> ChronoUtc {
    ChronoUtc::new(TIMESTAMP_FORMAT.to_string())
}

/// Appender writing straight to `path`, never rotated.
fn open_log_file(path: &Path) -> Result<RollingFileAppender> {
    let name = path
        .file_name()
        .with_context(|| format!("{} has no file name", path.display()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(name.to_string_lossy())
        .build(dir)
        .with_context(|| format!("opening {}", path.display()))
}

fn file_layer<S>(appender: RollingFileAppender) -> impl Layer<S>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fmt::layer()
        .with_timer(timer())
        .with_target(false)
        .with_ansi(false)
        .with_writer(appender)
}
