// Welch module - Averaged-periodogram power spectral density
//
// The window is split into half-overlapping segments. Each segment has its
// mean removed, is tapered with a periodic Hann window and transformed with a
// forward FFT; the one-sided density periodograms are then averaged.
//
// Scaling follows the usual density convention: |X[k]|^2 / (fs * sum(w^2)),
// with every bin except DC (and Nyquist for even segment lengths) doubled to
// fold in the negative frequencies.

use rustfft::{num_complex::Complex, Fft, FftPlanner};
use std::sync::Arc;

/// Default segment length in samples
pub const DEFAULT_SEGMENT_LEN: usize = 256;

/// One-sided power spectral density estimate
#[derive(Debug, Clone, PartialEq)]
pub struct PowerSpectrum {
    /// Bin centre frequencies in Hz (`k * fs / segment_len`)
    pub frequencies: Vec<f64>,
    /// Power density per bin
    pub power: Vec<f64>,
}

impl PowerSpectrum {
    /// Frequency of the strongest bin; the lowest bin wins ties
    pub fn peak_frequency(&self) -> Option<f64> {
        let mut best: Option<(usize, f64)> = None;
        for (i, &p) in self.power.iter().enumerate() {
            if best.map_or(true, |(_, best_p)| p > best_p) {
                best = Some((i, p));
            }
        }
        best.map(|(i, _)| self.frequencies[i])
    }
}

/// Welch PSD estimator with a pre-planned FFT
pub struct WelchEstimator {
    sample_rate: f64,
    segment_len: usize,
    overlap: usize,
    /// Periodic Hann window (pre-computed)
    window: Vec<f64>,
    /// 1 / (fs * sum(w^2))
    density_scale: f64,
    fft: Arc<dyn Fft<f64>>,
}

impl WelchEstimator {
    /// Create an estimator for `segment_len`-sample segments at `sample_rate` Hz
    ///
    /// Segments overlap by half their length.
    pub fn new(sample_rate: f64, segment_len: usize) -> Self {
        let segment_len = segment_len.max(1);
        let window: Vec<f64> = (0..segment_len)
            .map(|i| {
                0.5 - 0.5 * ((2.0 * std::f64::consts::PI * i as f64) / segment_len as f64).cos()
            })
            .collect();
        let window_power: f64 = window.iter().map(|w| w * w).sum();
        let density_scale = if window_power > 0.0 {
            1.0 / (sample_rate * window_power)
        } else {
            0.0
        };

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(segment_len);

        Self {
            sample_rate,
            segment_len,
            overlap: segment_len / 2,
            window,
            density_scale,
            fft,
        }
    }

    pub fn segment_len(&self) -> usize {
        self.segment_len
    }

    /// Number of one-sided bins (`segment_len / 2 + 1`)
    pub fn bin_count(&self) -> usize {
        self.segment_len / 2 + 1
    }

    /// Bin centre frequencies in Hz
    pub fn frequencies(&self) -> Vec<f64> {
        let resolution = self.sample_rate / self.segment_len as f64;
        (0..self.bin_count()).map(|k| k as f64 * resolution).collect()
    }

    /// Estimate the PSD of `samples`
    ///
    /// Inputs shorter than one segment are estimated with a single segment
    /// spanning the whole input. Returns `None` for an empty input.
    pub fn estimate(&self, samples: &[f64]) -> Option<PowerSpectrum> {
        if samples.is_empty() {
            return None;
        }
        if samples.len() < self.segment_len {
            return WelchEstimator::new(self.sample_rate, samples.len()).estimate(samples);
        }

        let step = self.segment_len - self.overlap;
        let segments = (samples.len() - self.overlap) / step;
        let bins = self.bin_count();
        let mut power = vec![0.0f64; bins];
        let mut buffer: Vec<Complex<f64>> = Vec::with_capacity(self.segment_len);

        for segment in 0..segments {
            let start = segment * step;
            let chunk = &samples[start..start + self.segment_len];
            let chunk_mean = chunk.iter().sum::<f64>() / chunk.len() as f64;

            buffer.clear();
            buffer.extend(
                chunk
                    .iter()
                    .zip(&self.window)
                    .map(|(&x, &w)| Complex::new((x - chunk_mean) * w, 0.0)),
            );
            self.fft.process(&mut buffer);

            for (k, slot) in power.iter_mut().enumerate() {
                *slot += buffer[k].norm_sqr();
            }
        }

        let nyquist_bin = if self.segment_len % 2 == 0 {
            Some(self.segment_len / 2)
        } else {
            None
        };
        let scale = self.density_scale / segments as f64;
        for (k, slot) in power.iter_mut().enumerate() {
            *slot *= scale;
            if k != 0 && Some(k) != nyquist_bin {
                *slot *= 2.0;
            }
        }

        Some(PowerSpectrum {
            frequencies: self.frequencies(),
            power,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(sample_rate: f64, frequency: f64, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * std::f64::consts::PI * frequency * i as f64 / sample_rate).sin())
            .collect()
    }

    #[test]
    fn test_bin_layout() {
        let welch = WelchEstimator::new(128.0, 256);
        let freqs = welch.frequencies();
        assert_eq!(freqs.len(), 129);
        assert_eq!(freqs[0], 0.0);
        assert_eq!(freqs[1], 0.5);
        assert_eq!(freqs[128], 64.0);
    }

    #[test]
    fn test_peak_at_sine_frequency() {
        let welch = WelchEstimator::new(128.0, 256);
        for freq in [3.0, 6.0, 10.0, 20.5] {
            let spectrum = welch.estimate(&sine(128.0, freq, 256)).unwrap();
            assert_eq!(spectrum.peak_frequency(), Some(freq), "sine at {} Hz", freq);
        }
    }

    #[test]
    fn test_multiple_segments_are_averaged() {
        let welch = WelchEstimator::new(128.0, 64);
        let spectrum = welch.estimate(&sine(128.0, 16.0, 256)).unwrap();
        assert_eq!(spectrum.power.len(), 33);
        assert_eq!(spectrum.peak_frequency(), Some(16.0));
    }

    #[test]
    fn test_constant_signal_peaks_at_dc() {
        let welch = WelchEstimator::new(128.0, 256);
        let spectrum = welch.estimate(&[70.0; 256]).unwrap();
        assert!(spectrum.power.iter().all(|&p| p.abs() < 1e-9));
        assert_eq!(spectrum.peak_frequency(), Some(0.0));
    }

    #[test]
    fn test_short_input_uses_single_segment() {
        let welch = WelchEstimator::new(128.0, 256);
        let spectrum = welch.estimate(&sine(128.0, 16.0, 64)).unwrap();
        assert_eq!(spectrum.frequencies.len(), 33);
        assert_eq!(spectrum.frequencies[1], 2.0);
        assert_eq!(spectrum.peak_frequency(), Some(16.0));
    }

    #[test]
    fn test_empty_input() {
        let welch = WelchEstimator::new(128.0, 256);
        assert!(welch.estimate(&[]).is_none());
    }

    #[test]
    fn test_density_matches_parseval() {
        let welch = WelchEstimator::new(128.0, 256);
        let signal = sine(128.0, 10.0, 256);
        let spectrum = welch.estimate(&signal).unwrap();
        let resolution = 0.5;
        let integrated: f64 = spectrum.power.iter().sum::<f64>() * resolution;
        // integrated density equals the variance of a bin-centred unit sine
        assert!((integrated - 0.5).abs() < 0.05, "integrated {}", integrated);
    }
}
