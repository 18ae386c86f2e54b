//! Threshold calibration from an attentive sample burst
//!
//! While the user looks at the screen, features are collected for a fixed
//! window. Each threshold is then placed at mean ± k·σ of its feature,
//! widened so that every collected sample stays on the attentive side.
//! A threshold landing outside its sane range keeps its previous value.

use crate::config::ThresholdConfig;
use feature_engine::{FeatureSet, StatisticalFeatures};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Length of the calibration window (seconds)
pub const CALIBRATION_WINDOW_SECS: f64 = 5.0;

/// Minimum valid samples for a usable calibration
pub const MIN_CALIBRATION_SAMPLES: usize = 10;

/// Calibration failures. Thresholds are unchanged in every case.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    #[error("Insufficient calibration samples: collected {collected}, need {required}")]
    InsufficientSamples { collected: usize, required: usize },

    #[error("Calibration cancelled")]
    Cancelled,

    #[error("Calibration is not running")]
    NotRunning,
}

/// A computed threshold outside its sane range; the previous value was kept
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Degenerate {field} threshold {computed:.4}, keeping {kept:.4}")]
pub struct DegenerateThreshold {
    pub field: &'static str,
    pub computed: f64,
    pub kept: f64,
}

/// Result of a successful calibration
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationReport {
    pub config: ThresholdConfig,
    pub samples: usize,
    pub fallbacks: Vec<DegenerateThreshold>,
}

/// How a calibration run ended
#[derive(Debug, Clone, PartialEq)]
pub enum CalibrationOutcome {
    Completed(CalibrationReport),
    Failed(CalibrationError),
}

/// Where a running calibration stands after a frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CalibrationProgress {
    Idle,
    Collecting { elapsed: f64, samples: usize },
    /// Window elapsed; call [`Calibrator::finish`]
    Ready,
}

/// Collects attentive features over a fixed window
#[derive(Debug, Clone)]
pub struct Calibrator {
    window_secs: f64,
    min_samples: usize,
    started_at: Option<f64>,
    samples: Vec<FeatureSet>,
}

impl Calibrator {
    pub fn new() -> Self {
        Self::with_window(CALIBRATION_WINDOW_SECS, MIN_CALIBRATION_SAMPLES)
    }

    pub fn with_window(window_secs: f64, min_samples: usize) -> Self {
        Self {
            window_secs,
            min_samples,
            started_at: None,
            samples: Vec::new(),
        }
    }

    /// Begin collecting; restarts any run in progress
    pub fn start(&mut self, now: f64) {
        info!(window_secs = self.window_secs, "Calibration started");
        self.started_at = Some(now);
        self.samples.clear();
    }

    pub fn is_active(&self) -> bool {
        self.started_at.is_some()
    }

    /// Add one frame's features. Non-finite samples are dropped.
    pub fn push(&mut self, features: FeatureSet) -> CalibrationProgress {
        if self.started_at.is_none() {
            return CalibrationProgress::Idle;
        }
        if features.is_finite() {
            self.samples.push(features);
        }
        self.progress(features.timestamp)
    }

    /// Progress at time `now`, also usable on frames without a face
    pub fn progress(&self, now: f64) -> CalibrationProgress {
        match self.started_at {
            None => CalibrationProgress::Idle,
            Some(start) if now - start >= self.window_secs => CalibrationProgress::Ready,
            Some(start) => CalibrationProgress::Collecting {
                elapsed: (now - start).max(0.0),
                samples: self.samples.len(),
            },
        }
    }

    /// Stop a running calibration without touching thresholds.
    /// Returns whether a run was in progress.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.started_at.take().is_some();
        self.samples.clear();
        if was_active {
            info!("Calibration cancelled");
        }
        was_active
    }

    /// End the run and derive thresholds from the collected samples
    pub fn finish(
        &mut self,
        current: &ThresholdConfig,
    ) -> Result<CalibrationReport, CalibrationError> {
        if self.started_at.take().is_none() {
            return Err(CalibrationError::NotRunning);
        }
        let samples = std::mem::take(&mut self.samples);

        if samples.len() < self.min_samples {
            warn!(
                collected = samples.len(),
                required = self.min_samples,
                "Calibration failed: not enough samples"
            );
            return Err(CalibrationError::InsufficientSamples {
                collected: samples.len(),
                required: self.min_samples,
            });
        }

        let (config, fallbacks) = derive_thresholds(&samples, current);
        for fallback in &fallbacks {
            warn!("{}", fallback);
        }
        info!(
            samples = samples.len(),
            eye_ar_thresh = config.eye_ar_thresh,
            head_turn_frac = config.head_turn_frac,
            head_down_nose_y = config.head_down_nose_y,
            "Calibration complete"
        );

        Ok(CalibrationReport {
            config,
            samples: samples.len(),
            fallbacks,
        })
    }
}

impl Default for Calibrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Sane range per threshold (inclusive)
struct Bounds {
    field: &'static str,
    min: f64,
    max: f64,
}

const EYE_AR_BOUNDS: Bounds = Bounds {
    field: "eye_ar_thresh",
    min: 0.05,
    max: 0.40,
};
const BLINK_BOUNDS: Bounds = Bounds {
    field: "ear_blink_thresh",
    min: 0.03,
    max: 0.40,
};
const HEAD_TURN_BOUNDS: Bounds = Bounds {
    field: "head_turn_frac",
    min: 0.01,
    max: 0.50,
};
const HEAD_DOWN_BOUNDS: Bounds = Bounds {
    field: "head_down_nose_y",
    min: 0.20,
    max: 1.00,
};
const HEAD_UP_BOUNDS: Bounds = Bounds {
    field: "head_up_nose_y",
    min: 0.00,
    max: 0.80,
};
const MAR_BOUNDS: Bounds = Bounds {
    field: "mar_yawn_thresh",
    min: 0.05,
    max: 2.00,
};
const YAW_BOUNDS: Bounds = Bounds {
    field: "yaw_margin",
    min: 0.01,
    max: 0.30,
};

impl Bounds {
    fn apply(&self, computed: f64, previous: f64, fallbacks: &mut Vec<DegenerateThreshold>) -> f64 {
        if computed.is_finite() && (self.min..=self.max).contains(&computed) {
            computed
        } else {
            fallbacks.push(DegenerateThreshold {
                field: self.field,
                computed,
                kept: previous,
            });
            previous
        }
    }
}

/// Derive a threshold set under which every sample classifies as attentive.
///
/// Lower bounds use `min(mean - k·σ, envelope)` and upper bounds
/// `max(mean + k·σ, envelope)`, where the envelope sits just beyond the
/// most extreme sample.
pub fn derive_thresholds(
    samples: &[FeatureSet],
    current: &ThresholdConfig,
) -> (ThresholdConfig, Vec<DegenerateThreshold>) {
    let ear = StatisticalFeatures::compute(&StatisticalFeatures::extract_ear(samples));
    let mar = StatisticalFeatures::compute(&StatisticalFeatures::extract_mar(samples));
    let offset =
        StatisticalFeatures::compute(&StatisticalFeatures::extract_abs_nose_offset(samples));
    let nose_y = StatisticalFeatures::compute(&StatisticalFeatures::extract_nose_y(samples));
    let yaw = StatisticalFeatures::compute(&StatisticalFeatures::extract_yaw_excursion(samples));

    debug!(
        ear_mean = ear.mean,
        ear_std = ear.std_dev,
        nose_y_mean = nose_y.mean,
        nose_y_std = nose_y.std_dev,
        "Calibration statistics"
    );

    let mut fallbacks = Vec::new();
    let mut config = current.clone();

    config.eye_ar_thresh = EYE_AR_BOUNDS.apply(
        (ear.mean - 2.0 * ear.std_dev).min(ear.min * 0.9),
        current.eye_ar_thresh,
        &mut fallbacks,
    );
    config.ear_blink_thresh = BLINK_BOUNDS.apply(
        (ear.mean - 3.0 * ear.std_dev).min(ear.min * 0.85),
        current.ear_blink_thresh,
        &mut fallbacks,
    );
    config.head_turn_frac = HEAD_TURN_BOUNDS.apply(
        (offset.mean + 2.0 * offset.std_dev).max(offset.max * 1.2 + 0.01),
        current.head_turn_frac,
        &mut fallbacks,
    );
    config.head_down_nose_y = HEAD_DOWN_BOUNDS.apply(
        (nose_y.mean + 2.0 * nose_y.std_dev).max(nose_y.max + 0.05),
        current.head_down_nose_y,
        &mut fallbacks,
    );
    config.head_up_nose_y = HEAD_UP_BOUNDS.apply(
        (nose_y.mean - 2.0 * nose_y.std_dev).min(nose_y.min - 0.05),
        current.head_up_nose_y,
        &mut fallbacks,
    );
    config.mar_yawn_thresh = MAR_BOUNDS.apply(
        (mar.mean + 3.0 * mar.std_dev).max(mar.max + 0.05),
        current.mar_yawn_thresh,
        &mut fallbacks,
    );
    config.yaw_margin = YAW_BOUNDS.apply(
        (yaw.mean + 2.0 * yaw.std_dev).max(yaw.max + 0.02),
        current.yaw_margin,
        &mut fallbacks,
    );

    // A single-field fallback can leave the vertical band inverted
    if config.head_up_nose_y >= config.head_down_nose_y {
        fallbacks.push(DegenerateThreshold {
            field: "head_up_nose_y",
            computed: config.head_up_nose_y,
            kept: current.head_up_nose_y,
        });
        config.head_up_nose_y = current.head_up_nose_y;
        config.head_down_nose_y = current.head_down_nose_y;
    }

    config.calibrated = true;
    (config, fallbacks)
}
