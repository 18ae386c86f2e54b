//! Per-frame analysis results

use crate::state::{AttentionState, RawDecision};
use feature_engine::FeatureSet;
use ring_buffer::WindowSnapshot;
use serde::{Deserialize, Serialize};

/// Complete result of pushing one frame through the pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FrameAnalysis {
    /// Whether usable landmarks were present
    pub face_detected: bool,

    /// Extracted features (if a face was present)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<FeatureSet>,

    /// Unsmoothed decision for this frame
    pub decision: RawDecision,

    /// Smoothed state after this frame
    pub state: AttentionState,

    /// Whether this frame flipped the smoothed state
    pub state_changed: bool,

    /// Smoothing window occupancy
    pub window: WindowSnapshot,
}

impl FrameAnalysis {
    /// Debug overlay lines, as drawn over the preview image
    pub fn overlay_lines(&self) -> Vec<String> {
        let mut lines = vec![self.state.to_string()];
        if let Some(f) = &self.features {
            lines.push(format!("EAR:{:.2} MAR:{:.2}", f.ear, f.mar));
            lines.push(format!(
                "nose:({:.2},{:.2}) raw:{}",
                f.nose_offset_frac + 0.5,
                f.nose_y_frac,
                self.decision.is_attentive
            ));
        } else {
            lines.push("no face".to_string());
        }
        if !self.decision.reasons.is_empty() {
            lines.push(format!("reasons: {}", self.decision.reasons));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::no_face;

    #[test]
    fn test_overlay_with_face() {
        let analysis = FrameAnalysis {
            face_detected: true,
            features: Some(FeatureSet {
                ear: 0.3,
                mar: 0.1,
                nose_offset_frac: 0.0,
                nose_y_frac: 0.45,
                ..Default::default()
            }),
            decision: RawDecision::attentive(),
            ..Default::default()
        };
        assert_eq!(
            analysis.overlay_lines(),
            vec!["ATTENTIVE", "EAR:0.30 MAR:0.10", "nose:(0.50,0.45) raw:true"]
        );
    }

    #[test]
    fn test_overlay_without_face() {
        let analysis = FrameAnalysis {
            decision: no_face(),
            state: AttentionState::Distracted,
            ..Default::default()
        };
        let lines = analysis.overlay_lines();
        assert_eq!(lines[0], "DISTRACTED");
        assert_eq!(lines[1], "no face");
        assert_eq!(lines[2], "reasons: no_face");
    }
}
