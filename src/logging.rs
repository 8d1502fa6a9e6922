//! Structured logging setup.
//!
//! Provides JSON-formatted and human-readable logging with optional file
//! output. A `RUST_LOG` environment filter, when present, overrides the
//! configured level.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration, assembled from CLI flags.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default log level when `RUST_LOG` is not set.
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    pub json_format: bool,

    /// Also append logs to this file.
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
            file_path: None,
        }
    }
}

/// Initializes the global tracing subscriber.
///
/// # Errors
///
/// Fails when the level filter does not parse or the log file cannot be
/// opened.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let env_filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    let registry = tracing_subscriber::registry().with(env_filter);

    if config.json_format {
        let stdout_layer = fmt::layer().json().with_current_span(true);

        if let Some(file_path) = &config.file_path {
            let file = OpenOptions::new().create(true).append(true).open(file_path)?;
            let file_layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(Arc::new(file));
            registry.with(stdout_layer).with(file_layer).init();
        } else {
            registry.with(stdout_layer).init();
        }
    } else {
        let stdout_layer = fmt::layer().with_target(true).with_level(true);

        if let Some(file_path) = &config.file_path {
            let file = OpenOptions::new().create(true).append(true).open(file_path)?;
            let file_layer = fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_writer(Arc::new(file));
            registry.with(stdout_layer).with(file_layer).init();
        } else {
            registry.with(stdout_layer).init();
        }
    }

    Ok(())
}
