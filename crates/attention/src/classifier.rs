//! Rule-based per-frame classification

use crate::config::{CameraPlacement, ThresholdConfig};
use crate::state::{RawDecision, Reason, Reasons};
use feature_engine::FeatureSet;

/// Classify one frame's features against the threshold set.
///
/// Every rule is independent; any hard reason makes the frame distracted.
/// An open mouth is recorded but only counts when
/// `yawn_is_distraction` is enabled. Non-finite features are treated as a
/// missing face.
pub fn classify(features: &FeatureSet, config: &ThresholdConfig) -> RawDecision {
    if !features.is_finite() {
        return no_face();
    }

    let mut reasons = Reasons::empty();

    if features.ear < config.eye_ar_thresh {
        reasons.insert(Reason::EyesClosed);
    }
    if features.ear < config.ear_blink_thresh {
        reasons.insert(Reason::Blink);
    }

    if features.nose_offset_frac.abs() > config.head_turn_frac
        || features.yaw_excursion > config.yaw_margin
    {
        reasons.insert(Reason::TurnedAway);
    }

    if config.camera_placement != CameraPlacement::Above
        && features.nose_y_frac > config.head_down_nose_y
    {
        reasons.insert(Reason::LookingDown);
    }
    if config.camera_placement == CameraPlacement::Below
        && features.nose_y_frac < config.head_up_nose_y
    {
        reasons.insert(Reason::LookingUp);
    }

    if features.mar > config.mar_yawn_thresh {
        reasons.insert(Reason::MouthOpen);
    }

    let distracting = if config.yawn_is_distraction {
        reasons
    } else {
        reasons.without(Reason::MouthOpen)
    };

    RawDecision {
        is_attentive: distracting.is_empty(),
        reasons,
    }
}

/// Decision for a frame where no face was detected
pub fn no_face() -> RawDecision {
    RawDecision::distracted([Reason::NoFace].into_iter().collect())
}
