// FeatureExtractor - window feature extraction for EEG classification
//
// This module turns a window of raw EEG amplitudes into the three scalars
// used by both the threshold feedback policy and the trained classifier.
//
// Module organization:
// - types: Data structures (FeatureVector)
// - temporal: Time-domain statistics (mean, sample standard deviation)
// - welch: Averaged-periodogram power spectral density
// - mod.rs: Coordinator (FeatureExtractor)
//
// Features extracted:
// 1. Mean amplitude
// 2. Sample standard deviation of the amplitude
// 3. Dominant frequency: centre of the Welch PSD bin with maximum power
//
// References:
// - Welch, P. (1967). The use of fast Fourier transform for the estimation
//   of power spectra

mod temporal;
mod types;
mod welch;

pub use types::{FeatureVector, FEATURE_COUNT};
pub use welch::{PowerSpectrum, WelchEstimator, DEFAULT_SEGMENT_LEN};

use crate::error::DataError;

/// FeatureExtractor coordinates the feature extraction pipeline
///
/// Holds a pre-planned Welch estimator so repeated windows reuse the FFT
/// plan. Shared read-only between requests.
pub struct FeatureExtractor {
    welch: WelchEstimator,
    sample_rate: f64,
}

impl FeatureExtractor {
    /// Create a new FeatureExtractor
    ///
    /// # Arguments
    /// * `sample_rate` - Recording sample rate in Hz (128 for the demo data)
    /// * `window_size` - Samples per window; also the Welch segment length
    pub fn new(sample_rate: f64, window_size: usize) -> Self {
        Self {
            welch: WelchEstimator::new(sample_rate, window_size.min(DEFAULT_SEGMENT_LEN)),
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Frequencies `dominant_frequency` can take for full windows
    pub fn frequency_bins(&self) -> Vec<f64> {
        self.welch.frequencies()
    }

    /// Extract all features from an amplitude window
    ///
    /// # Returns
    /// * `Ok(FeatureVector)` - mean, sample std and dominant frequency
    /// * `Err(DataError::EmptyWindow)` - if `window` holds no samples
    pub fn extract(&self, window: &[f64]) -> Result<FeatureVector, DataError> {
        let mean_amplitude = temporal::mean(window).ok_or(DataError::EmptyWindow)?;
        let std_amplitude = temporal::sample_std(window).ok_or(DataError::EmptyWindow)?;
        let dominant_frequency = self
            .welch
            .estimate(window)
            .and_then(|spectrum| spectrum.peak_frequency())
            .ok_or(DataError::EmptyWindow)?;

        Ok(FeatureVector {
            mean_amplitude,
            std_amplitude,
            dominant_frequency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    const SAMPLE_RATE: f64 = 128.0;
    const WINDOW: usize = 256;

    /// Generate a sine wave riding on a DC baseline
    fn generate_sine_wave(baseline: f64, frequency: f64, amplitude: f64) -> Vec<f64> {
        (0..WINDOW)
            .map(|i| {
                let t = i as f64 / SAMPLE_RATE;
                baseline + amplitude * (2.0 * std::f64::consts::PI * frequency * t).sin()
            })
            .collect()
    }

    fn generate_noise(seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..WINDOW).map(|_| rng.gen_range(0.0..100.0)).collect()
    }

    #[test]
    fn test_constant_window() {
        let extractor = FeatureExtractor::new(SAMPLE_RATE, WINDOW);
        let features = extractor.extract(&[70.0; WINDOW]).unwrap();

        assert_eq!(features.mean_amplitude, 70.0);
        assert_eq!(features.std_amplitude, 0.0);
        assert_eq!(features.dominant_frequency, 0.0);
    }

    #[test]
    fn test_sine_features() {
        let extractor = FeatureExtractor::new(SAMPLE_RATE, WINDOW);
        let features = extractor
            .extract(&generate_sine_wave(50.0, 10.0, 4.0))
            .unwrap();

        assert!((features.mean_amplitude - 50.0).abs() < 1e-9);
        // sample std of a full-cycle sine with peak A is A / sqrt(2) * sqrt(N / (N - 1))
        let expected_std = 4.0 / 2f64.sqrt() * (256.0f64 / 255.0).sqrt();
        assert!((features.std_amplitude - expected_std).abs() < 1e-9);
        assert_eq!(features.dominant_frequency, 10.0);
    }

    #[test]
    fn test_changing_one_sample_shifts_mean_by_delta_over_n() {
        let extractor = FeatureExtractor::new(SAMPLE_RATE, WINDOW);
        let mut window = generate_noise(7);
        let before = extractor.extract(&window).unwrap();

        let delta = 51.2;
        window[100] += delta;
        let after = extractor.extract(&window).unwrap();

        let shift = after.mean_amplitude - before.mean_amplitude;
        assert!((shift - delta / WINDOW as f64).abs() < 1e-9, "shift {}", shift);
        assert_ne!(after.std_amplitude, before.std_amplitude);
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let extractor = FeatureExtractor::new(SAMPLE_RATE, WINDOW);
        let window = generate_noise(11);
        assert_eq!(
            extractor.extract(&window).unwrap(),
            extractor.extract(&window).unwrap()
        );
    }

    #[test]
    fn test_dominant_frequency_is_always_a_bin() {
        let extractor = FeatureExtractor::new(SAMPLE_RATE, WINDOW);
        let bins = extractor.frequency_bins();
        assert_eq!(bins.len(), 129);

        for seed in 0..25 {
            let features = extractor.extract(&generate_noise(seed)).unwrap();
            assert!(
                bins.contains(&features.dominant_frequency),
                "{} Hz is not a PSD bin",
                features.dominant_frequency
            );
        }
    }

    #[test]
    fn test_empty_window_is_an_error() {
        let extractor = FeatureExtractor::new(SAMPLE_RATE, WINDOW);
        assert_eq!(extractor.extract(&[]), Err(DataError::EmptyWindow));
    }

    #[test]
    fn test_feature_order() {
        let features = FeatureVector {
            mean_amplitude: 1.0,
            std_amplitude: 2.0,
            dominant_frequency: 3.0,
        };
        assert_eq!(features.to_array(), [1.0, 2.0, 3.0]);
    }
}
