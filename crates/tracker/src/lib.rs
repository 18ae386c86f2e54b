//! Attention Tracker
//!
//! Runs landmark frames through feature extraction, classification,
//! smoothing and session aggregation, persisting thresholds and span logs.

pub mod cli;
pub mod driver;
pub mod replay;
pub mod settings;
mod tracker;

pub use cli::Cli;
pub use settings::Settings;
pub use tracker::AttentionTracker;

use attention::{AttentionError, CalibrationError};
use storage::StorageError;
use thiserror::Error;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Tracker error types
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] AttentionError),

    #[error("Calibration failed: {0}")]
    Calibration(#[from] CalibrationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Replay line {line}: {source}")]
    Replay {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging already initialized: {0}")]
    Logging(String),
}

/// Build the log filter. Directives (`RUST_LOG` syntax) win over `level`.
pub fn log_filter(level: Level, directives: Option<&str>) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .parse_lossy(directives.unwrap_or_default())
}

/// Initialize logging; `RUST_LOG` overrides the given level
pub fn init_logging(level: Level) -> Result<(), TrackerError> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(log_filter(level, directives.as_deref()))
        .with_target(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| TrackerError::Logging(e.to_string()))
}
