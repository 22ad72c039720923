// Temporal module - Time-domain window statistics
//
// Mean and sample standard deviation of the raw amplitudes.

/// Arithmetic mean; `None` for an empty window
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    Some(samples.iter().sum::<f64>() / samples.len() as f64)
}

/// Sample standard deviation with Bessel's correction
///
/// Returns NaN for a single sample, `None` for an empty window.
pub fn sample_std(samples: &[f64]) -> Option<f64> {
    let mean = mean(samples)?;
    if samples.len() < 2 {
        return Some(f64::NAN);
    }
    let sum_sq: f64 = samples.iter().map(|x| (x - mean) * (x - mean)).sum();
    Some((sum_sq / (samples.len() - 1) as f64).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let samples = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&samples), Some(5.0));
        // population std is 2.0, sample std is sqrt(32 / 7)
        let std = sample_std(&samples).unwrap();
        assert!((std - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(mean(&[]), None);
        assert_eq!(sample_std(&[]), None);
        assert!(sample_std(&[3.0]).unwrap().is_nan());
    }

    #[test]
    fn test_constant_signal_has_zero_std() {
        assert_eq!(sample_std(&[70.0; 256]), Some(0.0));
    }
}
