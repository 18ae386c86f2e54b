//! Landmark frame types

use crate::FeatureError;
use serde::{Deserialize, Serialize};

/// Points produced per face by the face-mesh landmarker (with irises)
pub const FACE_MESH_POINTS: usize = 478;

/// Face-mesh landmark indices used by feature extraction
pub mod indices {
    /// Left eye: outer-ish corner, two upper lid points, opposite corner, two lower lid points
    pub const LEFT_EYE: [usize; 6] = [362, 385, 387, 263, 373, 380];
    /// Right eye, same ordering as [`LEFT_EYE`]
    pub const RIGHT_EYE: [usize; 6] = [33, 160, 158, 133, 153, 144];

    pub const UPPER_LIP: usize = 13;
    pub const LOWER_LIP: usize = 14;
    pub const MOUTH_LEFT: usize = 81;
    pub const MOUTH_RIGHT: usize = 82;

    pub const NOSE_TIP: usize = 1;

    /// Inner eye corners bounding the nose horizontally
    pub const LEFT_EYE_INNER: usize = 362;
    pub const RIGHT_EYE_INNER: usize = 133;
}

/// Normalized landmark coordinate (x, y in 0..1 of the frame, z relative depth)
///
/// Serialized as a compact `[x, y, z]` array.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Planar distance in the image plane
    pub fn distance_2d(&self, other: &Point3) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

impl From<[f64; 3]> for Point3 {
    fn from([x, y, z]: [f64; 3]) -> Self {
        Self { x, y, z }
    }
}

impl From<Point3> for [f64; 3] {
    fn from(p: Point3) -> Self {
        [p.x, p.y, p.z]
    }
}

/// One camera frame's landmarks for the primary face
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LandmarkFrame {
    /// Capture timestamp (seconds)
    pub timestamp: f64,
    /// Landmark points, index-addressable
    pub points: Vec<Point3>,
}

impl LandmarkFrame {
    pub fn new(timestamp: f64, points: Vec<Point3>) -> Self {
        Self { timestamp, points }
    }

    /// Look up a landmark, failing if the index is out of range
    pub fn point(&self, index: usize) -> Result<Point3, FeatureError> {
        self.points
            .get(index)
            .copied()
            .ok_or(FeatureError::MissingLandmarks {
                index,
                available: self.points.len(),
            })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_point() {
        let frame = LandmarkFrame::new(0.0, vec![Point3::default(); 10]);
        assert!(frame.point(9).is_ok());
        assert_eq!(
            frame.point(10),
            Err(FeatureError::MissingLandmarks {
                index: 10,
                available: 10
            })
        );
    }

    #[test]
    fn test_point_array_format() {
        let frame: LandmarkFrame =
            serde_json::from_str(r#"{"timestamp": 1.5, "points": [[0.1, 0.2, 0.0]]}"#).unwrap();
        assert_eq!(frame.points[0], Point3::new(0.1, 0.2, 0.0));

        let json = serde_json::to_string(&frame).unwrap();
        assert!(json.contains("[0.1,0.2,0.0]"));
    }

    #[test]
    fn test_distance_ignores_depth() {
        let a = Point3::new(0.0, 0.0, 5.0);
        let b = Point3::new(0.3, 0.4, -5.0);
        assert!((a.distance_2d(&b) - 0.5).abs() < 1e-12);
    }
}
