//! Per-frame geometric features

use crate::landmarks::{indices, LandmarkFrame, Point3, FACE_MESH_POINTS};
use crate::FeatureError;
use ring_buffer::RollingMean;
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Mouth widths below this are treated as a collapsed mouth (MAR = 0)
const MIN_MOUTH_WIDTH: f64 = 1e-5;

/// Scalar features for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Eye aspect ratio, mean of both eyes (low = closed)
    pub ear: f64,
    /// Mouth aspect ratio (high = open)
    pub mar: f64,
    /// Signed horizontal nose-tip offset from frame center
    pub nose_offset_frac: f64,
    /// Normalized vertical nose-tip position (0 = top of frame)
    pub nose_y_frac: f64,
    /// Horizontal distance of the nose tip beyond the inner eye corners
    pub yaw_excursion: f64,
    /// Frame timestamp (seconds)
    pub timestamp: f64,
}

impl FeatureSet {
    /// True when every feature value is a finite number
    pub fn is_finite(&self) -> bool {
        self.ear.is_finite()
            && self.mar.is_finite()
            && self.nose_offset_frac.is_finite()
            && self.nose_y_frac.is_finite()
            && self.yaw_excursion.is_finite()
    }
}

/// Feature extractor with EAR smoothing across frames
pub struct FeatureExtractor {
    ear_window: RollingMean,
}

impl FeatureExtractor {
    /// Create an extractor averaging EAR over the last `ear_smooth_len` frames
    pub fn new(ear_smooth_len: usize) -> Self {
        Self {
            ear_window: RollingMean::new(ear_smooth_len),
        }
    }

    /// Extract features, replacing the raw EAR with its rolling mean
    pub fn extract(&mut self, frame: &LandmarkFrame) -> Result<FeatureSet, FeatureError> {
        let mut features = Self::measure(frame)?;
        let raw_ear = features.ear;
        features.ear = self.ear_window.push(raw_ear);
        trace!(raw_ear, ear = features.ear, mar = features.mar, "Features extracted");
        Ok(features)
    }

    /// Unsmoothed features for a single frame
    pub fn measure(frame: &LandmarkFrame) -> Result<FeatureSet, FeatureError> {
        let left = eye_aspect_ratio(frame, &indices::LEFT_EYE)?;
        let right = eye_aspect_ratio(frame, &indices::RIGHT_EYE)?;
        let mar = mouth_aspect_ratio(frame)?;

        let nose = frame.point(indices::NOSE_TIP)?;
        let left_inner = frame.point(indices::LEFT_EYE_INNER)?;
        let right_inner = frame.point(indices::RIGHT_EYE_INNER)?;
        let yaw_excursion = (left_inner.x - nose.x)
            .max(nose.x - right_inner.x)
            .max(0.0);

        Ok(FeatureSet {
            ear: (left + right) / 2.0,
            mar,
            nose_offset_frac: nose.x - 0.5,
            nose_y_frac: nose.y,
            yaw_excursion,
            timestamp: frame.timestamp,
        })
    }

    /// Change the EAR smoothing length; history is discarded
    pub fn set_smoothing(&mut self, ear_smooth_len: usize) {
        self.ear_window = RollingMean::new(ear_smooth_len);
    }

    pub fn reset(&mut self) {
        self.ear_window.clear();
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new(3)
    }
}

/// EAR = (|p1-p5| + |p2-p4|) / (2 |p0-p3|)
fn eye_aspect_ratio(frame: &LandmarkFrame, eye: &[usize; 6]) -> Result<f64, FeatureError> {
    let mut pts = [Point3::default(); 6];
    for (slot, &index) in pts.iter_mut().zip(eye) {
        *slot = frame.point(index)?;
    }

    let a = pts[1].distance_2d(&pts[5]);
    let b = pts[2].distance_2d(&pts[4]);
    let c = pts[0].distance_2d(&pts[3]);
    if c <= f64::EPSILON {
        return Ok(0.0);
    }
    Ok((a + b) / (2.0 * c))
}

fn mouth_aspect_ratio(frame: &LandmarkFrame) -> Result<f64, FeatureError> {
    let upper = frame.point(indices::UPPER_LIP)?;
    let lower = frame.point(indices::LOWER_LIP)?;
    let left = frame.point(indices::MOUTH_LEFT)?;
    let right = frame.point(indices::MOUTH_RIGHT)?;

    let opening = (lower.y - upper.y).abs();
    let width = (right.x - left.x).abs();
    if width < MIN_MOUTH_WIDTH {
        return Ok(0.0);
    }
    Ok(opening / width)
}

/// Synthetic face geometry for tests and demo replays.
///
/// Builds a full face-mesh frame whose measured features equal the given
/// values (up to float rounding).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceGeometry {
    pub ear: f64,
    pub mar: f64,
    /// Midpoint between the inner eye corners
    pub face_x: f64,
    /// Nose tip displacement from `face_x`
    pub nose_dx: f64,
    pub nose_y: f64,
}

impl Default for FaceGeometry {
    fn default() -> Self {
        Self {
            ear: 0.30,
            mar: 0.05,
            face_x: 0.5,
            nose_dx: 0.0,
            nose_y: 0.45,
        }
    }
}

impl FaceGeometry {
    const EYE_WIDTH: f64 = 0.04;
    const INNER_HALF_GAP: f64 = 0.03;
    const MOUTH_HALF_WIDTH: f64 = 0.02;

    pub fn to_frame(&self, timestamp: f64) -> LandmarkFrame {
        let nose_x = self.face_x + self.nose_dx;
        let mut points = vec![Point3::new(self.face_x, self.nose_y, 0.0); FACE_MESH_POINTS];

        let eye_y = self.nose_y - 0.08;
        let half_open = self.ear * Self::EYE_WIDTH / 2.0;

        // Left eye runs inner (p0) to outer (p3) towards +x
        let inner = self.face_x + Self::INNER_HALF_GAP;
        Self::place_eye(
            &mut points,
            &indices::LEFT_EYE,
            inner,
            inner + Self::EYE_WIDTH,
            eye_y,
            half_open,
        );
        // Right eye runs outer (p0) to inner (p3) towards +x
        let inner = self.face_x - Self::INNER_HALF_GAP;
        Self::place_eye(
            &mut points,
            &indices::RIGHT_EYE,
            inner - Self::EYE_WIDTH,
            inner,
            eye_y,
            half_open,
        );

        let mouth_y = self.nose_y + 0.08;
        points[indices::UPPER_LIP] = Point3::new(nose_x, mouth_y, 0.0);
        points[indices::LOWER_LIP] =
            Point3::new(nose_x, mouth_y + self.mar * 2.0 * Self::MOUTH_HALF_WIDTH, 0.0);
        points[indices::MOUTH_LEFT] = Point3::new(nose_x - Self::MOUTH_HALF_WIDTH, mouth_y, 0.0);
        points[indices::MOUTH_RIGHT] = Point3::new(nose_x + Self::MOUTH_HALF_WIDTH, mouth_y, 0.0);

        points[indices::NOSE_TIP] = Point3::new(nose_x, self.nose_y, 0.0);

        LandmarkFrame::new(timestamp, points)
    }

    fn place_eye(
        points: &mut [Point3],
        eye: &[usize; 6],
        x0: f64,
        x3: f64,
        y: f64,
        half_open: f64,
    ) {
        let third = (x3 - x0) / 3.0;
        points[eye[0]] = Point3::new(x0, y, 0.0);
        points[eye[3]] = Point3::new(x3, y, 0.0);
        // Lid pairs (p1, p5) and (p2, p4) share an x coordinate
        points[eye[1]] = Point3::new(x0 + third, y - half_open, 0.0);
        points[eye[5]] = Point3::new(x0 + third, y + half_open, 0.0);
        points[eye[2]] = Point3::new(x0 + 2.0 * third, y - half_open, 0.0);
        points[eye[4]] = Point3::new(x0 + 2.0 * third, y + half_open, 0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_measure_synthetic_face() {
        let geometry = FaceGeometry {
            ear: 0.27,
            mar: 0.4,
            face_x: 0.6,
            nose_dx: 0.0,
            nose_y: 0.5,
        };
        let features = FeatureExtractor::measure(&geometry.to_frame(12.5)).unwrap();

        assert!(close(features.ear, 0.27));
        assert!(close(features.mar, 0.4));
        assert!(close(features.nose_offset_frac, 0.1));
        assert!(close(features.nose_y_frac, 0.5));
        assert!(close(features.yaw_excursion, 0.03));
        assert_eq!(features.timestamp, 12.5);
    }

    #[test]
    fn test_nose_beyond_eye_corner() {
        let geometry = FaceGeometry {
            nose_dx: -0.12,
            ..Default::default()
        };
        let features = FeatureExtractor::measure(&geometry.to_frame(0.0)).unwrap();
        // Inner corners at +-0.03, nose at -0.12: 0.15 past the left inner corner
        assert!(close(features.yaw_excursion, 0.15));
        assert!(close(features.nose_offset_frac, -0.12));
    }

    #[test]
    fn test_missing_landmarks_fail_closed() {
        let frame = LandmarkFrame::new(0.0, vec![Point3::default(); 100]);
        let err = FeatureExtractor::measure(&frame).unwrap_err();
        assert!(matches!(err, FeatureError::MissingLandmarks { available: 100, .. }));

        let mut extractor = FeatureExtractor::new(3);
        assert!(extractor.extract(&frame).is_err());
    }

    #[test]
    fn test_degenerate_geometry_yields_zero() {
        // Every point collapsed onto one location
        let frame = LandmarkFrame::new(0.0, vec![Point3::new(0.5, 0.5, 0.0); FACE_MESH_POINTS]);
        let features = FeatureExtractor::measure(&frame).unwrap();
        assert_eq!(features.ear, 0.0);
        assert_eq!(features.mar, 0.0);
    }

    #[test]
    fn test_ear_smoothing() {
        let mut extractor = FeatureExtractor::new(3);
        let open = FaceGeometry::default();
        let closed = FaceGeometry { ear: 0.0, ..open };

        extractor.extract(&open.to_frame(0.0)).unwrap();
        extractor.extract(&open.to_frame(0.1)).unwrap();
        let features = extractor.extract(&closed.to_frame(0.2)).unwrap();
        // One closed frame among three is averaged out
        assert!(close(features.ear, 0.2));

        extractor.reset();
        let features = extractor.extract(&closed.to_frame(0.3)).unwrap();
        assert!(close(features.ear, 0.0));
    }

    proptest! {
        #[test]
        fn prop_ratios_non_negative(
            ear in 0.0f64..0.6,
            mar in 0.0f64..1.5,
            face_x in 0.1f64..0.9,
            nose_dx in -0.2f64..0.2,
            nose_y in 0.1f64..0.9,
        ) {
            let geometry = FaceGeometry {
                ear,
                mar,
                face_x,
                nose_dx,
                nose_y,
            };
            let features = FeatureExtractor::measure(&geometry.to_frame(0.0)).unwrap();
            prop_assert!(features.ear >= 0.0);
            prop_assert!(features.mar >= 0.0);
            prop_assert!(features.yaw_excursion >= 0.0);
            prop_assert!((features.ear - ear).abs() < 1e-9);
        }
    }
}
