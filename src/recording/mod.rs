//! EEG recordings and fixed-length windows.
//!
//! A [`Recording`] is the flat amplitude stream read from a CSV file (an
//! `Amplitude` column plus an optional `Label` column). Training and serving
//! both work on [`Window`]s, contiguous slices of exactly `window_size`
//! samples; trailing partial windows are never produced.

pub mod sampler;
pub mod synthetic;

pub use sampler::WindowSampler;

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::DataError;

/// Header of the amplitude column
pub const AMPLITUDE_COLUMN: &str = "Amplitude";

/// Header of the optional categorical label column
pub const LABEL_COLUMN: &str = "Label";

/// Immutable amplitude stream with optional per-sample labels
#[derive(Debug, Clone, PartialEq)]
pub struct Recording {
    amplitudes: Vec<f64>,
    /// `None` when the source had no label column; empty cells are `None`.
    labels: Option<Vec<Option<String>>>,
}

impl Recording {
    /// Build an unlabeled recording from raw samples
    pub fn from_amplitudes(amplitudes: Vec<f64>) -> Self {
        Self {
            amplitudes,
            labels: None,
        }
    }

    /// Build a labeled recording
    ///
    /// # Panics
    ///
    /// Panics if `labels` and `amplitudes` differ in length.
    pub fn from_labeled(amplitudes: Vec<f64>, labels: Vec<Option<String>>) -> Self {
        assert_eq!(
            amplitudes.len(),
            labels.len(),
            "one label slot per amplitude sample"
        );
        Self {
            amplitudes,
            labels: Some(labels),
        }
    }

    /// Load a recording from a CSV file on disk
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DataError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|err| DataError::FileUnreadable {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        let recording = Self::from_reader(file)?;
        log::info!(
            "[Recording] Loaded {} samples from {:?} (labeled: {})",
            recording.len(),
            path,
            recording.has_labels()
        );
        Ok(recording)
    }

    /// Parse a recording from any CSV source with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DataError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader.headers()?.clone();
        let amplitude_idx = headers
            .iter()
            .position(|h| h == AMPLITUDE_COLUMN)
            .ok_or(DataError::MissingColumn {
                column: AMPLITUDE_COLUMN,
            })?;
        let label_idx = headers.iter().position(|h| h == LABEL_COLUMN);

        let mut amplitudes = Vec::new();
        let mut labels = label_idx.map(|_| Vec::new());

        for (row, record) in csv_reader.records().enumerate() {
            let record = record?;
            let raw = record.get(amplitude_idx).unwrap_or_default();
            let amplitude = raw
                .parse::<f64>()
                .map_err(|_| DataError::InvalidAmplitude {
                    row: row + 1,
                    value: raw.to_string(),
                })?;
            amplitudes.push(amplitude);

            if let (Some(idx), Some(labels)) = (label_idx, labels.as_mut()) {
                let label = record
                    .get(idx)
                    .filter(|cell| !cell.is_empty())
                    .map(str::to_string);
                labels.push(label);
            }
        }

        Ok(Self { amplitudes, labels })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.amplitudes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.amplitudes.is_empty()
    }

    /// Whether the source carried a label column
    pub fn has_labels(&self) -> bool {
        self.labels.is_some()
    }

    pub fn amplitudes(&self) -> &[f64] {
        &self.amplitudes
    }

    /// Number of full windows of `window_size` samples (`floor(len / size)`)
    pub fn window_count(&self, window_size: usize) -> usize {
        if window_size == 0 {
            return 0;
        }
        self.amplitudes.len() / window_size
    }

    /// Iterate over disjoint consecutive full windows
    ///
    /// The trailing partial window, if any, is skipped.
    pub fn windows(&self, window_size: usize) -> impl Iterator<Item = Window<'_>> + '_ {
        (0..self.window_count(window_size)).map(move |index| {
            let start = index * window_size;
            self.slice(index, start, window_size)
        })
    }

    /// Window of `window_size` samples starting at `start`
    pub fn window_at(&self, start: usize, window_size: usize) -> Result<Window<'_>, DataError> {
        match start.checked_add(window_size) {
            Some(end) if window_size > 0 && end <= self.amplitudes.len() => {
                Ok(self.slice(start / window_size, start, window_size))
            }
            _ => Err(DataError::RecordingTooShort {
                required: start.saturating_add(window_size).max(window_size),
                available: self.amplitudes.len(),
            }),
        }
    }

    fn slice(&self, index: usize, start: usize, window_size: usize) -> Window<'_> {
        let end = start + window_size;
        Window {
            index,
            start,
            amplitudes: &self.amplitudes[start..end],
            labels: self.labels.as_ref().map(|labels| &labels[start..end]),
        }
    }
}

/// Contiguous full-length slice of a [`Recording`]
#[derive(Debug, Clone, Copy)]
pub struct Window<'a> {
    /// Position among the disjoint windows of the recording
    pub index: usize,
    /// Offset of the first sample in the recording
    pub start: usize,
    pub amplitudes: &'a [f64],
    labels: Option<&'a [Option<String>]>,
}

impl<'a> Window<'a> {
    /// Most frequent label in the window
    ///
    /// Empty cells do not vote. Ties go to the lexicographically smallest
    /// label. Returns `None` when nothing voted.
    pub fn majority_label(&self) -> Option<&'a str> {
        let labels = self.labels?;
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for label in labels.iter().flatten() {
            *counts.entry(label.as_str()).or_insert(0) += 1;
        }

        let mut best: Option<(&str, usize)> = None;
        for (label, count) in counts {
            match best {
                Some((_, best_count)) if count <= best_count => {}
                _ => best = Some((label, count)),
            }
        }
        best.map(|(label, _)| label)
    }
}
