//! Threshold configuration

use crate::AttentionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Where the camera sits relative to the screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraPlacement {
    #[default]
    Center,
    Above,
    Below,
}

/// Classification thresholds and smoothing options.
///
/// Field names and defaults match `attention_config.json`. Keys missing
/// from a loaded file take their default; unknown keys land in `extra` and
/// are written back on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    pub camera_placement: CameraPlacement,

    /// EAR below this counts as eyes closed
    pub eye_ar_thresh: f64,

    /// EAR below this counts as a blink
    pub ear_blink_thresh: f64,

    /// Maximum |nose offset| from frame center before the head counts as turned
    pub head_turn_frac: f64,

    /// Nose y above this (lower in frame) counts as looking down
    pub head_down_nose_y: f64,

    /// Nose y below this (higher in frame) counts as looking up
    pub head_up_nose_y: f64,

    /// MAR above this counts as mouth open
    pub mar_yawn_thresh: f64,

    /// Allowed nose travel past the inner eye corners
    pub yaw_margin: f64,

    /// Smoothing window length (frames)
    pub history_len: usize,

    /// EAR rolling-mean length (frames)
    pub ear_smooth_len: usize,

    /// Treat an open mouth as a distraction rather than informational
    pub yawn_is_distraction: bool,

    pub debug_overlay: bool,

    /// Set once thresholds come from calibration
    pub calibrated: bool,

    /// Keys this engine does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            camera_placement: CameraPlacement::Center,
            eye_ar_thresh: 0.20,
            ear_blink_thresh: 0.18,
            head_turn_frac: 0.28,
            head_down_nose_y: 0.58,
            head_up_nose_y: 0.35,
            mar_yawn_thresh: 0.35,
            yaw_margin: 0.08,
            history_len: 9,
            ear_smooth_len: 3,
            yawn_is_distraction: false,
            debug_overlay: false,
            calibrated: false,
            extra: Map::new(),
        }
    }
}

impl ThresholdConfig {
    /// Reject values no classifier could use (non-finite, negative, empty windows)
    pub fn validate(&self) -> Result<(), AttentionError> {
        let fields = [
            ("eye_ar_thresh", self.eye_ar_thresh),
            ("ear_blink_thresh", self.ear_blink_thresh),
            ("head_turn_frac", self.head_turn_frac),
            ("head_down_nose_y", self.head_down_nose_y),
            ("head_up_nose_y", self.head_up_nose_y),
            ("mar_yawn_thresh", self.mar_yawn_thresh),
            ("yaw_margin", self.yaw_margin),
        ];
        for (field, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(AttentionError::InvalidThreshold { field, value });
            }
        }

        if self.head_up_nose_y >= self.head_down_nose_y {
            return Err(AttentionError::InvalidThreshold {
                field: "head_up_nose_y",
                value: self.head_up_nose_y,
            });
        }

        if self.history_len == 0 {
            return Err(AttentionError::InvalidHistory(self.history_len));
        }
        if self.ear_smooth_len == 0 {
            return Err(AttentionError::InvalidHistory(self.ear_smooth_len));
        }

        Ok(())
    }
}
