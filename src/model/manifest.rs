// Manifest - everything besides the weights needed to reuse a classifier
//
// The manifest is written next to the safetensors weights as JSON. It pins
// the label order and the feature normalization of the training run so a
// retrain on a different dataset version cannot silently relabel classes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::analysis::features::{FeatureVector, FEATURE_COUNT};
use crate::error::ModelError;

/// Bumped whenever the manifest layout changes
pub const MANIFEST_VERSION: u32 = 1;

/// Manifest location for a given weights path (`<weights_path>.json`)
///
/// The suffix is appended to the full file name, never swapped for the
/// existing extension.
pub fn manifest_path(weights_path: &Path) -> PathBuf {
    let mut path = weights_path.as_os_str().to_owned();
    path.push(".json");
    PathBuf::from(path)
}

/// Label ↔ class index mapping, alphabetical by construction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMapping {
    labels: Vec<String>,
}

impl LabelMapping {
    /// Build the mapping from every label observed in a run
    pub fn from_labels<'a, I>(labels: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut labels: Vec<String> = labels.into_iter().map(str::to_string).collect();
        labels.sort();
        labels.dedup();
        Self { labels }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.binary_search_by(|l| l.as_str().cmp(label)).ok()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    fn is_sorted_unique(&self) -> bool {
        self.labels.windows(2).all(|pair| pair[0] < pair[1])
    }
}

impl fmt::Display for LabelMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, label) in self.labels.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "'{}': {}", label, i)?;
        }
        write!(f, "}}")
    }
}

/// Per-column z-score statistics of the training matrix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeatureNormalizer {
    pub mean: [f64; FEATURE_COUNT],
    /// Population standard deviation; a degenerate column stores 1.0
    pub std: [f64; FEATURE_COUNT],
}

impl FeatureNormalizer {
    /// Fit column means and population standard deviations
    pub fn fit(rows: &[[f64; FEATURE_COUNT]]) -> Self {
        let mut mean = [0.0; FEATURE_COUNT];
        let mut std = [1.0; FEATURE_COUNT];
        if rows.is_empty() {
            return Self { mean, std };
        }

        let n = rows.len() as f64;
        for col in 0..FEATURE_COUNT {
            let col_mean = rows.iter().map(|row| row[col]).sum::<f64>() / n;
            let variance = rows
                .iter()
                .map(|row| (row[col] - col_mean).powi(2))
                .sum::<f64>()
                / n;
            let col_std = variance.sqrt();

            mean[col] = col_mean;
            std[col] = if col_std.is_finite() && col_std > 0.0 {
                col_std
            } else {
                1.0
            };
        }
        Self { mean, std }
    }

    /// Z-score a feature vector into network input order
    pub fn transform(&self, features: &FeatureVector) -> [f32; FEATURE_COUNT] {
        self.transform_row(&features.to_array())
    }

    pub fn transform_row(&self, row: &[f64; FEATURE_COUNT]) -> [f32; FEATURE_COUNT] {
        let mut out = [0.0f32; FEATURE_COUNT];
        for col in 0..FEATURE_COUNT {
            out[col] = ((row[col] - self.mean[col]) / self.std[col]) as f32;
        }
        out
    }
}

/// Classifier metadata persisted alongside the weights
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelManifest {
    pub version: u32,
    pub labels: LabelMapping,
    pub normalizer: FeatureNormalizer,
    pub hidden_layers: [usize; 2],
    pub window_size: usize,
    pub sample_rate: f64,
}

impl ModelManifest {
    /// Reject manifests that cannot describe a usable network
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.version != MANIFEST_VERSION {
            return Err(ModelError::InvalidManifest {
                reason: format!(
                    "unsupported version {} (expected {})",
                    self.version, MANIFEST_VERSION
                ),
            });
        }
        if self.labels.is_empty() {
            return Err(ModelError::InvalidManifest {
                reason: "no labels".to_string(),
            });
        }
        if !self.labels.is_sorted_unique() {
            return Err(ModelError::InvalidManifest {
                reason: "labels must be sorted and unique".to_string(),
            });
        }
        if self.hidden_layers.iter().any(|&width| width == 0) {
            return Err(ModelError::InvalidManifest {
                reason: "hidden layers must be non-empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<(), ModelError> {
        let json = serde_json::to_string_pretty(self).map_err(|err| {
            ModelError::InvalidManifest {
                reason: err.to_string(),
            }
        })?;
        fs::write(path, json).map_err(|err| ModelError::ArtifactIo {
            path: path.display().to_string(),
            reason: err.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, ModelError> {
        let contents = fs::read_to_string(path).map_err(|err| ModelError::ArtifactIo {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        let manifest: Self =
            serde_json::from_str(&contents).map_err(|err| ModelError::InvalidManifest {
                reason: err.to_string(),
            })?;
        manifest.validate()?;
        Ok(manifest)
    }
}
