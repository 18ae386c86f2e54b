//! In-memory stores

use crate::{ConfigStore, LogStore, StorageError};
use attention::ThresholdConfig;
use session::{SessionSummary, SpanRecord};
use std::collections::VecDeque;
use std::sync::Mutex;
use tracing::debug;

/// Config store held in memory
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    config: Mutex<Option<ThresholdConfig>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a saved config
    pub fn with_config(config: ThresholdConfig) -> Self {
        Self {
            config: Mutex::new(Some(config)),
        }
    }

    /// Whether a config has been saved
    pub fn has_saved(&self) -> bool {
        self.config.lock().map(|c| c.is_some()).unwrap_or(false)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<ThresholdConfig, StorageError> {
        let config = self
            .config
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        Ok(config.clone().unwrap_or_default())
    }

    fn save(&self, config: &ThresholdConfig) -> Result<(), StorageError> {
        let mut stored = self
            .config
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;
        *stored = Some(config.clone());
        Ok(())
    }
}

/// Log store held in memory with bounded retention
#[derive(Debug)]
pub struct MemoryLogStore {
    spans: Mutex<VecDeque<SpanRecord>>,
    sessions: Mutex<Vec<SessionSummary>>,
    max_span_records: usize,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::with_retention(10_000)
    }

    /// Keep at most `max_span_records` span records, dropping the oldest
    pub fn with_retention(max_span_records: usize) -> Self {
        Self {
            spans: Mutex::new(VecDeque::new()),
            sessions: Mutex::new(Vec::new()),
            max_span_records: max_span_records.max(1),
        }
    }

    /// Span records, oldest first
    pub fn spans(&self) -> Vec<SpanRecord> {
        self.spans
            .lock()
            .map(|s| s.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn sessions(&self) -> Vec<SessionSummary> {
        self.sessions.lock().map(|s| s.clone()).unwrap_or_default()
    }

    pub fn span_count(&self) -> usize {
        self.spans.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Clear all data (for testing)
    pub fn clear(&self) {
        if let Ok(mut spans) = self.spans.lock() {
            spans.clear();
        }
        if let Ok(mut sessions) = self.sessions.lock() {
            sessions.clear();
        }
    }
}

impl Default for MemoryLogStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LogStore for MemoryLogStore {
    fn append_span(&self, record: &SpanRecord) -> Result<(), StorageError> {
        let mut spans = self
            .spans
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?;

        // Enforce retention
        while spans.len() >= self.max_span_records {
            spans.pop_front();
        }
        spans.push_back(record.clone());
        debug!(total = spans.len(), "Stored span record");
        Ok(())
    }

    fn append_session(&self, summary: &SessionSummary) -> Result<(), StorageError> {
        self.sessions
            .lock()
            .map_err(|e| StorageError::Lock(e.to_string()))?
            .push(summary.clone());
        Ok(())
    }
}
