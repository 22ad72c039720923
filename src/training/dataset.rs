// Dataset - labeled feature rows built from a recording's disjoint windows

use crate::analysis::features::{FeatureExtractor, FeatureVector};
use crate::error::DataError;
use crate::recording::{Recording, LABEL_COLUMN};

/// One feature row per full window, in recording order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub features: Vec<FeatureVector>,
    /// Majority label of each window
    pub labels: Vec<String>,
}

impl Dataset {
    /// Extract features and majority labels from every full window
    ///
    /// # Errors
    /// * `DataError::MissingColumn` - the recording has no label column
    /// * `DataError::MissingLabel` - a window has only empty label cells
    pub fn from_recording(
        recording: &Recording,
        extractor: &FeatureExtractor,
        window_size: usize,
    ) -> Result<Self, DataError> {
        if !recording.has_labels() {
            return Err(DataError::MissingColumn {
                column: LABEL_COLUMN,
            });
        }

        let mut dataset = Self::default();
        for window in recording.windows(window_size) {
            let label = window
                .majority_label()
                .ok_or(DataError::MissingLabel {
                    window: window.index,
                })?;
            dataset.features.push(extractor.extract(window.amplitudes)?);
            dataset.labels.push(label.to_string());
        }

        log::debug!(
            "[Dataset] {} windows of {} samples from {} samples",
            dataset.len(),
            window_size,
            recording.len()
        );
        Ok(dataset)
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recording::synthetic::{self, SyntheticSpec, DEFAULT_PROFILES};

    #[test]
    fn test_one_row_per_full_window() {
        let spec = SyntheticSpec {
            windows_per_label: 2,
            ..SyntheticSpec::default()
        };
        let recording = synthetic::generate(&spec, &DEFAULT_PROFILES);
        let extractor = FeatureExtractor::new(128.0, 256);

        let dataset = Dataset::from_recording(&recording, &extractor, 256).unwrap();
        assert_eq!(dataset.len(), 6);
        assert_eq!(
            dataset.labels,
            ["Relaxed", "Engaged", "Seizure", "Relaxed", "Engaged", "Seizure"]
        );
        assert!(dataset.features[2].mean_amplitude > dataset.features[0].mean_amplitude);
    }

    #[test]
    fn test_trailing_partial_window_is_dropped() {
        let labels = vec![Some("Relaxed".to_string()); 600];
        let recording = Recording::from_labeled(vec![20.0; 600], labels);
        let extractor = FeatureExtractor::new(128.0, 256);

        let dataset = Dataset::from_recording(&recording, &extractor, 256).unwrap();
        assert_eq!(dataset.len(), 2);
    }

    #[test]
    fn test_unlabeled_recording_is_rejected() {
        let recording = Recording::from_amplitudes(vec![20.0; 512]);
        let extractor = FeatureExtractor::new(128.0, 256);
        assert_eq!(
            Dataset::from_recording(&recording, &extractor, 256),
            Err(DataError::MissingColumn {
                column: LABEL_COLUMN
            })
        );
    }

    #[test]
    fn test_window_without_votes_is_rejected() {
        let mut labels = vec![Some("Relaxed".to_string()); 256];
        labels.extend(vec![None; 256]);
        let recording = Recording::from_labeled(vec![20.0; 512], labels);
        let extractor = FeatureExtractor::new(128.0, 256);
        assert_eq!(
            Dataset::from_recording(&recording, &extractor, 256),
            Err(DataError::MissingLabel { window: 1 })
        );
    }
}
