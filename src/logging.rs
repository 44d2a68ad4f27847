//! `tracing` subscriber setup. Logs go to stderr so `--out -` can stream
//! the annotated table on stdout.

use std::io;

use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Overrides the verbosity flags when set, e.g. `WOUND_RATIO_LOG=debug`.
pub const LOG_ENV: &str = "WOUND_RATIO_LOG";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogConfig {
    pub level: LevelFilter,
    pub format: LogFormat,
}

impl LogConfig {
    /// `-q` silences everything but errors; each `-v` steps info -> debug -> trace.
    pub fn from_flags(verbose: u8, quiet: bool, format: LogFormat) -> Self {
        let level = if quiet {
            LevelFilter::ERROR
        } else {
            match verbose {
                0 => LevelFilter::INFO,
                1 => LevelFilter::DEBUG,
                _ => LevelFilter::TRACE,
            }
        };
        Self { level, format }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: LevelFilter::INFO,
            format: LogFormat::default(),
        }
    }
}

pub fn build_env_filter(level: LevelFilter) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

pub fn init_logging(config: &LogConfig) -> Result<(), TryInitError> {
    let filter = build_env_filter(config.level);
    let registry = tracing_subscriber::registry().with(filter);
    match config.format {
        LogFormat::Pretty => registry
            .with(
                fmt::layer()
                    .pretty()
                    .with_writer(io::stderr)
                    .with_target(false)
                    .without_time(),
            )
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(io::stderr).with_target(false))
            .try_init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .try_init(),
    }
}
