//! Feature Engineering Engine
//!
//! Turns one frame of facial landmarks into the scalar features used for
//! attention classification, and provides the summary statistics used by
//! calibration.

mod features;
mod landmarks;
mod statistics;

pub use features::{FaceGeometry, FeatureExtractor, FeatureSet};
pub use landmarks::{indices, LandmarkFrame, Point3, FACE_MESH_POINTS};
pub use statistics::StatisticalFeatures;

use thiserror::Error;

/// Feature extraction errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// A landmark index required by a feature is absent from the frame
    #[error("Landmark {index} missing (frame has {available} points)")]
    MissingLandmarks { index: usize, available: usize },
}
