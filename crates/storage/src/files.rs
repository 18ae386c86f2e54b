//! File-backed stores

use crate::{ConfigStore, LogStore, StorageError};
use attention::ThresholdConfig;
use serde::de::DeserializeOwned;
use serde::Serialize;
use session::{SessionSummary, SpanRecord};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Threshold config file name
pub const CONFIG_FILE: &str = "attention_config.json";

/// Span log file name (one JSON object per line)
pub const SPAN_LOG_FILE: &str = "attention_log.json";

/// Session summary log file name (one JSON object per line)
pub const SESSION_LOG_FILE: &str = "attention_sessions.json";

/// Threshold config persisted as a pretty-printed JSON object
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at [`CONFIG_FILE`] inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self::new(dir.as_ref().join(CONFIG_FILE))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConfigStore for JsonConfigStore {
    /// A missing file yields defaults. So does a corrupt or invalid one,
    /// with a warning, so a bad file never blocks startup.
    fn load(&self) -> Result<ThresholdConfig, StorageError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No saved config; using defaults");
                return Ok(ThresholdConfig::default());
            }
            Err(e) => return Err(e.into()),
        };

        let config: ThresholdConfig = match serde_json::from_str(&text) {
            Ok(config) => config,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Unreadable config; using defaults");
                return Ok(ThresholdConfig::default());
            }
        };

        if let Err(e) = config.validate() {
            warn!(path = %self.path.display(), error = %e, "Invalid config; using defaults");
            return Ok(ThresholdConfig::default());
        }

        info!(path = %self.path.display(), calibrated = config.calibrated, "Loaded config");
        Ok(config)
    }

    fn save(&self, config: &ThresholdConfig) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string_pretty(config)?;
        fs::write(&self.path, json)?;
        info!(path = %self.path.display(), "Saved config");
        Ok(())
    }
}

/// Span and session records appended as newline-delimited JSON
#[derive(Debug, Clone)]
pub struct NdjsonLogStore {
    span_path: PathBuf,
    session_path: PathBuf,
}

impl NdjsonLogStore {
    pub fn new(span_path: impl Into<PathBuf>, session_path: impl Into<PathBuf>) -> Self {
        Self {
            span_path: span_path.into(),
            session_path: session_path.into(),
        }
    }

    /// Store at [`SPAN_LOG_FILE`] and [`SESSION_LOG_FILE`] inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(dir.join(SPAN_LOG_FILE), dir.join(SESSION_LOG_FILE))
    }

    pub fn span_path(&self) -> &Path {
        &self.span_path
    }

    pub fn session_path(&self) -> &Path {
        &self.session_path
    }

    /// All span records on file, oldest first
    pub fn read_spans(&self) -> Result<Vec<SpanRecord>, StorageError> {
        read_lines(&self.span_path)
    }

    /// All session summaries on file, oldest first
    pub fn read_sessions(&self) -> Result<Vec<SessionSummary>, StorageError> {
        read_lines(&self.session_path)
    }
}

impl LogStore for NdjsonLogStore {
    fn append_span(&self, record: &SpanRecord) -> Result<(), StorageError> {
        append_line(&self.span_path, record)
    }

    fn append_session(&self, summary: &SessionSummary) -> Result<(), StorageError> {
        append_line(&self.session_path, summary)?;
        info!(path = %self.session_path.display(), "Session summary written");
        Ok(())
    }
}

fn append_line<T: Serialize>(path: &Path, value: &T) -> Result<(), StorageError> {
    let line = serde_json::to_string(value)?;
    let mut file = OpenOptions::new().create(true).append(true).open(path)?;
    writeln!(file, "{line}")?;
    Ok(())
}

/// Parse one record per line; blank and malformed lines are skipped
fn read_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, StorageError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut records = Vec::new();
    for (number, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str(&line) {
            Ok(record) => records.push(record),
            Err(e) => warn!(
                path = %path.display(),
                line = number + 1,
                error = %e,
                "Skipping malformed record"
            ),
        }
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use attention::CameraPlacement;
    use session::Sample;
    use tempfile::TempDir;

    fn summary() -> SessionSummary {
        SessionSummary {
            session_start: "2024-01-01T10:00:00.000000".into(),
            session_end: "2024-01-01T10:00:18.000000".into(),
            duration_sec: 18.0,
            attentive_sec: 15.0,
            distracted_sec: 3.0,
            focus_pct: 83.33,
            distraction_count: 1,
            spans_sec: vec![10.0],
            avg_span_sec: 10.0,
            max_span_sec: 10.0,
            samples: vec![Sample {
                t: 10.0,
                focus_pct_so_far: 100.0,
                attentive_sec: 10.0,
                distracted_sec: 0.0,
            }],
            events_count: 1,
        }
    }

    #[test]
    fn test_config_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = JsonConfigStore::in_dir(dir.path());
        assert_eq!(store.load().unwrap(), ThresholdConfig::default());
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = TempDir::new().unwrap();
        let store = JsonConfigStore::in_dir(dir.path());
        let config = ThresholdConfig {
            camera_placement: CameraPlacement::Below,
            eye_ar_thresh: 0.19,
            head_turn_frac: 0.3,
            calibrated: true,
            ..Default::default()
        };

        store.save(&config).unwrap();
        assert_eq!(store.load().unwrap(), config);

        let text = fs::read_to_string(store.path()).unwrap();
        assert!(text.contains("\n  \"camera_placement\": \"below\""));
    }

    #[test]
    fn test_config_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let store = JsonConfigStore::in_dir(dir.path());
        fs::write(
            store.path(),
            r#"{"eye_ar_thresh": 0.22, "frames_attentive_to_switch": 4}"#,
        )
        .unwrap();

        let config = store.load().unwrap();
        assert_eq!(config.eye_ar_thresh, 0.22);
        assert_eq!(config.history_len, ThresholdConfig::default().history_len);
    }

    #[test]
    fn test_config_save_keeps_unknown_keys() {
        let dir = TempDir::new().unwrap();
        let store = JsonConfigStore::in_dir(dir.path());
        fs::write(
            store.path(),
            r#"{"frames_attentive_to_switch": 4, "no_face_push_every_n": 15}"#,
        )
        .unwrap();

        let mut config = store.load().unwrap();
        config.eye_ar_thresh = 0.21;
        config.calibrated = true;
        store.save(&config).unwrap();

        let saved: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(saved["frames_attentive_to_switch"], 4);
        assert_eq!(saved["no_face_push_every_n"], 15);
        assert_eq!(saved["eye_ar_thresh"], 0.21);
        assert_eq!(saved["calibrated"], true);
    }

    #[test]
    fn test_config_corrupt_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let store = JsonConfigStore::in_dir(dir.path());
        fs::write(store.path(), "{not json").unwrap();
        assert_eq!(store.load().unwrap(), ThresholdConfig::default());

        fs::write(store.path(), r#"{"eye_ar_thresh": -1.0}"#).unwrap();
        assert_eq!(store.load().unwrap(), ThresholdConfig::default());
    }

    #[test]
    fn test_span_log_appends_lines() {
        let dir = TempDir::new().unwrap();
        let store = NdjsonLogStore::in_dir(dir.path());

        store.append_span(&SpanRecord::new(1_700_000_010.0, 10.004)).unwrap();
        store.append_span(&SpanRecord::new(1_700_000_200.0, 150.0)).unwrap();

        let text = fs::read_to_string(store.span_path()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("\"attention_span_seconds\":10.0"));
        assert!(lines[1].ends_with("\"duration_human_readable\":\"2m 30s\"}"));

        let spans = store.read_spans().unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[1].attention_span_seconds, 150.0);
    }

    #[test]
    fn test_session_log_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = NdjsonLogStore::in_dir(dir.path());
        store.append_session(&summary()).unwrap();

        let sessions = store.read_sessions().unwrap();
        assert_eq!(sessions.len(), 1);
        assert_eq!(sessions[0].focus_pct, 83.3);
        assert_eq!(sessions[0].samples.len(), 1);
    }

    #[test]
    fn test_read_skips_malformed_lines() {
        let dir = TempDir::new().unwrap();
        let store = NdjsonLogStore::in_dir(dir.path());
        store.append_span(&SpanRecord::new(1_700_000_010.0, 5.0)).unwrap();
        fs::OpenOptions::new()
            .append(true)
            .open(store.span_path())
            .unwrap()
            .write_all(b"garbage\n\n")
            .unwrap();
        store.append_span(&SpanRecord::new(1_700_000_020.0, 7.0)).unwrap();

        assert_eq!(store.read_spans().unwrap().len(), 2);
    }

    #[test]
    fn test_read_missing_log_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = NdjsonLogStore::in_dir(dir.path());
        assert!(store.read_sessions().unwrap().is_empty());
    }

    #[test]
    fn test_append_to_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let store = NdjsonLogStore::in_dir(dir.path().join("missing"));
        let err = store.append_span(&SpanRecord::new(0.0, 2.0)).unwrap_err();
        assert!(matches!(err, StorageError::Io(_)));
    }
}
