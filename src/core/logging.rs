//! Structured logging
//!
//! Installs the global tracing subscriber: an env filter, a JSON or text
//! formatter, and a non-blocking writer to stdout or a daily rolling file.

use crate::core::config::LoggingConfig;
use anyhow::{Context, Result};
use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Keeps the background log writer alive; drop it only at shutdown.
pub struct Logger {
    _guard: WorkerGuard,
}

impl Logger {
    /// Initialize the logging system based on configuration
    pub fn init(config: &LoggingConfig) -> Result<Self> {
        let level = parse_log_level(&config.level)?;

        // RUST_LOG, when set, takes precedence over the configured level
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(level.as_str()));

        let (writer, guard) = match config.output.as_str() {
            "stdout" => tracing_appender::non_blocking(std::io::stdout()),
            "file" => {
                let log_file = config
                    .log_file
                    .as_ref()
                    .context("log_file must be specified when output is 'file'")?;
                let directory = log_file
                    .parent()
                    .filter(|p| !p.as_os_str().is_empty())
                    .unwrap_or_else(|| std::path::Path::new("."));
                let file_name = log_file
                    .file_name()
                    .context("log_file must have a file name")?;

                std::fs::create_dir_all(directory).with_context(|| {
                    format!("Failed to create log directory {}", directory.display())
                })?;

                tracing_appender::non_blocking(tracing_appender::rolling::daily(
                    directory, file_name,
                ))
            }
            other => anyhow::bail!("Invalid output configuration: {}", other),
        };

        let fmt_layer = match config.format.as_str() {
            "json" => fmt::layer()
                .json()
                .with_writer(writer)
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_target(true)
                .boxed(),
            "text" => fmt::layer()
                .with_writer(writer)
                .with_ansi(config.output == "stdout")
                .with_target(true)
                .boxed(),
            other => anyhow::bail!("Invalid format configuration: {}", other),
        };

        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .try_init()
            .context("Failed to initialize tracing subscriber")?;

        tracing::info!(
            level = %config.level,
            format = %config.format,
            output = %config.output,
            "Logging system initialized"
        );

        Ok(Logger { _guard: guard })
    }
}

/// Parse log level string to tracing Level
fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!("Invalid log level: {}", level),
    }
}
