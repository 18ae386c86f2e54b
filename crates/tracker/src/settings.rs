//! Driver settings

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Settings file looked up in the working directory when none is given
pub const DEFAULT_SETTINGS_FILE: &str = "attention-tracker";

/// Environment variable prefix, e.g. `ATTENTION_DATA_DIR`
pub const ENV_PREFIX: &str = "ATTENTION";

/// Replay driver settings.
///
/// Layered from built-in defaults, then the settings file, then
/// `ATTENTION_*` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Directory holding the config and log files
    pub data_dir: PathBuf,

    /// Landmark stream to replay; the synthetic demo runs when unset
    #[serde(default)]
    pub input: Option<PathBuf>,

    /// Delay between replayed frames (0 = as fast as possible)
    pub frame_interval_ms: u64,

    /// How often live statistics are reported
    pub stats_interval_secs: u64,

    /// Calibrate on the first frames of the stream
    pub calibrate: bool,

    /// Frame rate of the synthetic demo
    pub demo_fps: f64,

    pub verbose: bool,
}

impl Settings {
    /// Load settings, reading `path` if given or the default settings file if present
    pub fn load(path: Option<&Path>) -> Result<Self, config::ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_SETTINGS_FILE).required(false),
        };

        Config::builder()
            .set_default("data_dir", ".")?
            .set_default("frame_interval_ms", 0_i64)?
            .set_default("stats_interval_secs", 1_i64)?
            .set_default("calibrate", false)?
            .set_default("demo_fps", 10.0)?
            .set_default("verbose", false)?
            .add_source(file)
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?
            .try_deserialize()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("."),
            input: None,
            frame_interval_ms: 0,
            stats_interval_secs: 1,
            calibrate: false,
            demo_fps: 10.0,
            verbose: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tracker.toml");
        fs::write(
            &path,
            "data_dir = \"/var/lib/attention\"\nframe_interval_ms = 33\ncalibrate = true\n",
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.data_dir, PathBuf::from("/var/lib/attention"));
        assert_eq!(settings.frame_interval_ms, 33);
        assert!(settings.calibrate);
        assert_eq!(settings.stats_interval_secs, 1);
        assert_eq!(settings.input, None);
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(Settings::load(Some(&dir.path().join("absent.toml"))).is_err());
    }
}
