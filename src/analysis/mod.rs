// Analysis module - per-window feature extraction and feedback
//
// Pipeline: Window → FeatureExtractor → (threshold Feedback | Classifier)
//
// The trainer consumes the feature vectors of every disjoint window; the
// inference service analyzes one randomly sampled window per request.

pub mod features;
pub mod feedback;

use serde::Serialize;

use crate::error::DataError;
use crate::recording::Window;
use features::{FeatureExtractor, FeatureVector};
use feedback::Feedback;

/// Features and threshold feedback for one analyzed window
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WindowAnalysis {
    /// Offset of the window in the recording
    pub start: usize,
    pub features: FeatureVector,
    pub feedback: Feedback,
}

impl WindowAnalysis {
    /// Extract features from `window` and apply the threshold table
    pub fn analyze(extractor: &FeatureExtractor, window: &Window<'_>) -> Result<Self, DataError> {
        let features = extractor.extract(window.amplitudes)?;
        Ok(Self {
            start: window.start,
            features,
            feedback: Feedback::from_amplitude(features.mean_amplitude),
        })
    }

    /// Mean amplitude rounded to two decimals for display
    pub fn rounded_amplitude(&self) -> f64 {
        round_to(self.features.mean_amplitude, 2)
    }
}

/// Round to `decimals` places, ties to even
///
/// Rounds the exact binary value, so `2.675` (stored just below the tie)
/// becomes `2.67` and the true tie `45.125` becomes `45.12`.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    if decimals < 0 {
        let factor = 10f64.powi(-decimals);
        return (value / factor).round_ties_even() * factor;
    }
    format!("{:.*}", decimals as usize, value)
        .parse()
        .unwrap_or(value)
}
