//! Logging setup
//!
//! Structured logging via the `tracing` crate. The filter comes from the
//! `PKGMIRROR_LOG` environment variable when set, otherwise from the
//! configured level; output goes to stderr so the mirror summary on stdout
//! stays clean.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text
    #[serde(default = "default_format")]
    pub format: String,

    /// Enable colored output (text format only)
    #[serde(default = "default_true")]
    pub color: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_format(),
            color: default_true(),
        }
    }
}

/// Initialize the logging system.
///
/// `PKGMIRROR_LOG` overrides the configured level when set.
pub fn init_logging(config: &LoggingConfig) -> Result<(), SyncError> {
    let filter = EnvFilter::try_from_env("PKGMIRROR_LOG")
        .unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let base = Registry::default().with(filter);

    match config.format.as_str() {
        "json" => base
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| SyncError::Config(format!("Failed to init logging: {}", e))),
        "text" => base
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_ansi(config.color)
                    .with_writer(std::io::stderr),
            )
            .try_init()
            .map_err(|e| SyncError::Config(format!("Failed to init logging: {}", e))),
        other => Err(SyncError::Config(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            other
        ))),
    }
}
