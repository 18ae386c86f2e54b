//! Statistical Features Computation

use crate::features::FeatureSet;

/// Summary statistics for a signal
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatisticalFeatures {
    /// Number of samples
    pub count: usize,
    /// Mean value
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
}

impl StatisticalFeatures {
    /// Compute summary statistics from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;

        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Self {
            count: values.len(),
            mean,
            std_dev: variance.sqrt(),
            min,
            max,
        }
    }

    /// Extract EAR values from feature samples
    pub fn extract_ear(samples: &[FeatureSet]) -> Vec<f64> {
        samples.iter().map(|f| f.ear).collect()
    }

    /// Extract MAR values from feature samples
    pub fn extract_mar(samples: &[FeatureSet]) -> Vec<f64> {
        samples.iter().map(|f| f.mar).collect()
    }

    /// Extract unsigned nose offsets from feature samples
    pub fn extract_abs_nose_offset(samples: &[FeatureSet]) -> Vec<f64> {
        samples.iter().map(|f| f.nose_offset_frac.abs()).collect()
    }

    /// Extract nose vertical positions from feature samples
    pub fn extract_nose_y(samples: &[FeatureSet]) -> Vec<f64> {
        samples.iter().map(|f| f.nose_y_frac).collect()
    }

    /// Extract yaw excursions from feature samples
    pub fn extract_yaw_excursion(samples: &[FeatureSet]) -> Vec<f64> {
        samples.iter().map(|f| f.yaw_excursion).collect()
    }
}
