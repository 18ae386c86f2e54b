//! Storage Layer
//!
//! Persists the threshold config as a JSON object and appends span and
//! session records to newline-delimited JSON logs. In-memory stores with
//! the same traits back the tests and the replay demo.

mod files;
mod repository;

pub use files::{JsonConfigStore, NdjsonLogStore, CONFIG_FILE, SESSION_LOG_FILE, SPAN_LOG_FILE};
pub use repository::{MemoryConfigStore, MemoryLogStore};

use attention::ThresholdConfig;
use session::{SessionSummary, SpanRecord};
use thiserror::Error;

/// Storage errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Lock error: {0}")]
    Lock(String),
}

/// Source and sink of the persisted threshold config
pub trait ConfigStore: Send + Sync {
    /// Load the stored config, or defaults when none has been saved
    fn load(&self) -> Result<ThresholdConfig, StorageError>;

    fn save(&self, config: &ThresholdConfig) -> Result<(), StorageError>;
}

/// Append-only sink for span and session records
pub trait LogStore: Send + Sync {
    fn append_span(&self, record: &SpanRecord) -> Result<(), StorageError>;

    fn append_session(&self, summary: &SessionSummary) -> Result<(), StorageError>;
}
