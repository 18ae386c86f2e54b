//! Attention State Inference
//!
//! Turns per-frame facial features into a stable attentive/distracted state:
//! - Rule-based classification against a threshold set
//! - Majority-vote temporal smoothing
//! - Threshold calibration from an attentive sample burst

pub mod analysis;
pub mod calibration;
pub mod classifier;
pub mod config;
pub mod smoother;
pub mod state;

pub use analysis::FrameAnalysis;
pub use calibration::{
    CalibrationError, CalibrationOutcome, CalibrationProgress, CalibrationReport, Calibrator,
    DegenerateThreshold,
};
pub use classifier::{classify, no_face};
pub use config::{CameraPlacement, ThresholdConfig};
pub use smoother::TemporalSmoother;
pub use state::{AttentionState, RawDecision, Reason, Reasons};

use thiserror::Error;

/// Attention engine error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AttentionError {
    #[error("Invalid threshold {field}: {value}")]
    InvalidThreshold { field: &'static str, value: f64 },

    #[error("Invalid history length: {0}")]
    InvalidHistory(usize),

    #[error("Unknown reason tag: {0}")]
    UnknownReason(String),
}
