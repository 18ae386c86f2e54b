//! Command-line argument definitions.

use crate::settings::Settings;
use clap::Parser;
use std::path::PathBuf;

/// Replays a face-landmark stream through the attention tracker.
///
/// Without `--input`, a synthetic session is generated.
#[derive(Debug, Parser)]
#[command(name = "attention-tracker", version, about, long_about = None)]
pub struct Cli {
    /// Enable debug output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Path to settings file.
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Newline-delimited landmark frames to replay.
    #[arg(short, long)]
    pub input: Option<PathBuf>,

    /// Directory for the config and log files.
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Calibrate thresholds on the first five seconds of the stream.
    #[arg(long)]
    pub calibrate: bool,

    /// Delay between frames in milliseconds.
    #[arg(long)]
    pub frame_interval_ms: Option<u64>,
}

impl Cli {
    /// Apply explicit arguments on top of loaded settings
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(input) = &self.input {
            settings.input = Some(input.clone());
        }
        if let Some(dir) = &self.data_dir {
            settings.data_dir = dir.clone();
        }
        if let Some(ms) = self.frame_interval_ms {
            settings.frame_interval_ms = ms;
        }
        settings.calibrate |= self.calibrate;
        settings.verbose |= self.verbose;
    }
}
