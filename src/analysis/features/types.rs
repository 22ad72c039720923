// Types module - Data structures for EEG window features
//
// This module defines the feature vector produced for every window and
// consumed by both the threshold feedback policy and the classifier.

use serde::{Deserialize, Serialize};

/// Number of scalar features per window
pub const FEATURE_COUNT: usize = 3;

/// Features extracted from one EEG window
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Arithmetic mean of the window amplitudes
    pub mean_amplitude: f64,

    /// Sample standard deviation (N - 1 divisor)
    pub std_amplitude: f64,

    /// Frequency in Hz of the Welch PSD bin with maximum power
    ///
    /// Always one of the discrete bins `k * sample_rate / segment_len`.
    pub dominant_frequency: f64,
}

impl FeatureVector {
    /// Features in classifier input order
    pub fn to_array(&self) -> [f64; FEATURE_COUNT] {
        [
            self.mean_amplitude,
            self.std_amplitude,
            self.dominant_frequency,
        ]
    }
}
