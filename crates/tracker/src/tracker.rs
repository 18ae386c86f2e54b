//! Per-frame attention tracker

use crate::TrackerError;
use attention::{
    classify, no_face, AttentionState, CalibrationError, CalibrationOutcome, CalibrationProgress,
    Calibrator, FrameAnalysis, TemporalSmoother, ThresholdConfig,
};
use feature_engine::{FeatureExtractor, FeatureSet, LandmarkFrame};
use metrics::counter;
use session::{Insights, LiveStats, Sample, SessionAggregator, SessionSummary};
use storage::{ConfigStore, LogStore};
use tracing::{debug, info, warn};

/// Owns the threshold config and every per-session component.
///
/// Drive it with one [`process_frame`](Self::process_frame) call per
/// captured frame. Storage failures are logged and never interrupt
/// inference.
pub struct AttentionTracker {
    config: ThresholdConfig,
    extractor: FeatureExtractor,
    smoother: TemporalSmoother,
    calibrator: Calibrator,
    session: SessionAggregator,
    config_store: Box<dyn ConfigStore>,
    log_store: Box<dyn LogStore>,
    features: Option<FeatureSet>,
    last_analysis: FrameAnalysis,
    calibration_outcome: Option<CalibrationOutcome>,
}

impl AttentionTracker {
    /// Create a tracker using the stored config, falling back to defaults
    pub fn new(config_store: Box<dyn ConfigStore>, log_store: Box<dyn LogStore>) -> Self {
        let config = config_store.load().unwrap_or_else(|e| {
            warn!(error = %e, "Could not load config; using defaults");
            ThresholdConfig::default()
        });
        Self::build(config, config_store, log_store)
    }

    /// Create a tracker with an explicit config, ignoring the stored one
    pub fn with_config(
        config: ThresholdConfig,
        config_store: Box<dyn ConfigStore>,
        log_store: Box<dyn LogStore>,
    ) -> Result<Self, TrackerError> {
        config.validate()?;
        Ok(Self::build(config, config_store, log_store))
    }

    fn build(
        config: ThresholdConfig,
        config_store: Box<dyn ConfigStore>,
        log_store: Box<dyn LogStore>,
    ) -> Self {
        info!(
            placement = ?config.camera_placement,
            calibrated = config.calibrated,
            history_len = config.history_len,
            "Attention tracker ready"
        );
        Self {
            extractor: FeatureExtractor::new(config.ear_smooth_len),
            smoother: TemporalSmoother::from_config(&config),
            calibrator: Calibrator::new(),
            session: SessionAggregator::default(),
            config_store,
            log_store,
            features: None,
            last_analysis: FrameAnalysis::default(),
            calibration_outcome: None,
            config,
        }
    }

    /// Process one frame; `None` means no face was found
    pub fn process_frame(&mut self, frame: Option<&LandmarkFrame>, now: f64) -> FrameAnalysis {
        counter!("attention_frames_total").increment(1);

        let features = frame.and_then(|frame| match self.extractor.extract(frame) {
            Ok(features) if features.is_finite() => Some(features),
            Ok(_) => {
                debug!("Non-finite features; treating frame as no face");
                None
            }
            Err(e) => {
                debug!(error = %e, "Treating frame as no face");
                None
            }
        });

        let decision = match &features {
            Some(features) => classify(features, &self.config),
            None => {
                counter!("attention_no_face_frames_total").increment(1);
                no_face()
            }
        };

        let previous = self.smoother.state();
        let state = self.smoother.push(&decision);
        let state_changed = state != previous;
        if state_changed {
            counter!("attention_state_flips_total").increment(1);
            info!(
                from = %previous,
                to = %state,
                reasons = %decision.reasons,
                "Attention state changed"
            );
        }

        if self.calibrator.is_active() {
            if let Some(features) = features {
                self.calibrator.push(features);
            }
            if self.calibrator.progress(now) == CalibrationProgress::Ready {
                self.complete_calibration();
            }
        }

        if let Some(record) = self.session.tick(state, now) {
            counter!("attention_spans_logged_total").increment(1);
            if let Err(e) = self.log_store.append_span(&record) {
                warn!(error = %e, "Failed to write span record");
            }
        }

        if features.is_some() {
            self.features = features;
        }
        self.last_analysis = FrameAnalysis {
            face_detected: features.is_some(),
            features,
            decision,
            state,
            state_changed,
            window: self.smoother.snapshot(),
        };
        self.last_analysis.clone()
    }

    /// Open a session starting from the current smoothed state
    pub fn start(&mut self, now: f64) {
        self.session.start(self.smoother.state(), now);
    }

    /// Close the session and write its summary
    pub fn stop(&mut self, now: f64) -> Option<SessionSummary> {
        let summary = self.session.stop(now)?;
        if let Err(e) = self.log_store.append_session(&summary) {
            warn!(error = %e, "Failed to write session summary");
        }
        Some(summary)
    }

    /// Drop all session statistics and smoothing history
    pub fn reset(&mut self) {
        self.session.reset();
        self.smoother.reset();
        self.extractor.reset();
        self.features = None;
        self.last_analysis = FrameAnalysis::default();
    }

    /// Begin collecting calibration samples; restarts a run in progress
    pub fn start_calibration(&mut self, now: f64) {
        self.calibration_outcome = None;
        self.calibrator.start(now);
    }

    /// Abort a running calibration; thresholds stay as they are
    pub fn cancel_calibration(&mut self) -> bool {
        let cancelled = self.calibrator.cancel();
        if cancelled {
            self.calibration_outcome =
                Some(CalibrationOutcome::Failed(CalibrationError::Cancelled));
        }
        cancelled
    }

    pub fn calibration_progress(&self, now: f64) -> CalibrationProgress {
        self.calibrator.progress(now)
    }

    /// How the most recent calibration run ended, if one has
    pub fn calibration_outcome(&self) -> Option<&CalibrationOutcome> {
        self.calibration_outcome.as_ref()
    }

    fn complete_calibration(&mut self) {
        let outcome = match self.calibrator.finish(&self.config) {
            Ok(report) => {
                self.apply_config(report.config.clone());
                if let Err(e) = self.config_store.save(&self.config) {
                    warn!(error = %e, "Failed to save calibrated config");
                }
                CalibrationOutcome::Completed(report)
            }
            Err(e) => CalibrationOutcome::Failed(e),
        };
        self.calibration_outcome = Some(outcome);
    }

    /// Replace the active thresholds
    pub fn set_config(&mut self, config: ThresholdConfig) -> Result<(), TrackerError> {
        config.validate()?;
        self.apply_config(config);
        Ok(())
    }

    /// Persist the active thresholds
    pub fn save_config(&self) -> Result<(), TrackerError> {
        self.config_store.save(&self.config)?;
        Ok(())
    }

    fn apply_config(&mut self, config: ThresholdConfig) {
        if config.ear_smooth_len != self.config.ear_smooth_len {
            self.extractor.set_smoothing(config.ear_smooth_len);
        }
        self.smoother.resize(config.history_len);
        self.config = config;
    }

    pub fn config(&self) -> &ThresholdConfig {
        &self.config
    }

    /// Whether the smoothed state is attentive
    pub fn current_stable_state(&self) -> bool {
        self.smoother.state().is_attentive()
    }

    pub fn state(&self) -> AttentionState {
        self.smoother.state()
    }

    /// Features of the last frame with a face; kept through no-face frames
    /// until `reset`
    pub fn current_features(&self) -> Option<FeatureSet> {
        self.features
    }

    pub fn last_analysis(&self) -> &FrameAnalysis {
        &self.last_analysis
    }

    pub fn is_running(&self) -> bool {
        self.session.is_running()
    }

    pub fn live_stats(&self) -> LiveStats {
        self.session.live_stats()
    }

    pub fn insights(&self) -> Insights {
        self.session.insights()
    }

    pub fn samples(&self) -> &[Sample] {
        self.session.samples()
    }

    /// History length of the smoothing window
    pub fn smoothing_len(&self) -> usize {
        self.smoother.len()
    }
}
