// Classifier - feed-forward network over window features
//
// Three dense layers (3 → 64 → 32 → n_labels) with ReLU between them and a
// softmax over the output logits at inference time. Weights live in a candle
// `VarMap` and are persisted as safetensors; everything else needed to reuse
// the network is in the JSON manifest next to them.

pub mod manifest;

pub use manifest::{
    manifest_path, FeatureNormalizer, LabelMapping, ModelManifest, MANIFEST_VERSION,
};

use candle_core::{DType, Device, Module, Tensor, D};
use candle_nn::{Linear, VarBuilder, VarMap};
use serde::Serialize;
use std::path::Path;

use crate::analysis::features::{FeatureVector, FEATURE_COUNT};
use crate::error::ModelError;

/// Dense network shared by training and inference
pub struct EegNet {
    hidden1: Linear,
    hidden2: Linear,
    output: Linear,
}

impl EegNet {
    pub fn new(
        vb: VarBuilder,
        hidden_layers: [usize; 2],
        num_classes: usize,
    ) -> candle_core::Result<Self> {
        let hidden1 = candle_nn::linear(FEATURE_COUNT, hidden_layers[0], vb.pp("hidden1"))?;
        let hidden2 = candle_nn::linear(hidden_layers[0], hidden_layers[1], vb.pp("hidden2"))?;
        let output = candle_nn::linear(hidden_layers[1], num_classes, vb.pp("output"))?;
        Ok(Self {
            hidden1,
            hidden2,
            output,
        })
    }
}

impl Module for EegNet {
    /// Raw logits for a `(batch, FEATURE_COUNT)` input
    fn forward(&self, xs: &Tensor) -> candle_core::Result<Tensor> {
        let xs = self.hidden1.forward(xs)?.relu()?;
        let xs = self.hidden2.forward(&xs)?.relu()?;
        self.output.forward(&xs)
    }
}

/// Probability assigned to one label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelProbability {
    pub label: String,
    pub probability: f32,
}

/// Classifier output for one window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub label: String,
    pub confidence: f32,
    /// One entry per label, in manifest order
    pub probabilities: Vec<LabelProbability>,
}

/// Trained (or freshly initialized) classifier plus its manifest
pub struct EegClassifier {
    var_map: VarMap,
    net: EegNet,
    manifest: ModelManifest,
    device: Device,
}

impl EegClassifier {
    /// Initialize a network with random weights for `manifest`
    pub fn new(manifest: ModelManifest) -> Result<Self, ModelError> {
        manifest.validate()?;

        let device = Device::Cpu;
        let var_map = VarMap::new();
        let vb = VarBuilder::from_varmap(&var_map, DType::F32, &device);
        let net = EegNet::new(vb, manifest.hidden_layers, manifest.labels.len())?;

        Ok(Self {
            var_map,
            net,
            manifest,
            device,
        })
    }

    /// Load weights from `weights_path` and the manifest next to it
    pub fn load<P: AsRef<Path>>(weights_path: P) -> Result<Self, ModelError> {
        let weights_path = weights_path.as_ref();
        let manifest = ModelManifest::load(&manifest_path(weights_path))?;
        let mut classifier = Self::new(manifest)?;
        classifier
            .var_map
            .load(weights_path)
            .map_err(|err| ModelError::ArtifactIo {
                path: weights_path.display().to_string(),
                reason: err.to_string(),
            })?;

        log::info!(
            "[Classifier] Loaded {:?} (labels: {})",
            weights_path,
            classifier.manifest.labels
        );
        Ok(classifier)
    }

    /// Write weights to `weights_path` and the manifest next to it
    pub fn save<P: AsRef<Path>>(&self, weights_path: P) -> Result<(), ModelError> {
        let weights_path = weights_path.as_ref();
        if let Some(parent) = weights_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| ModelError::ArtifactIo {
                path: parent.display().to_string(),
                reason: err.to_string(),
            })?;
        }

        self.var_map
            .save(weights_path)
            .map_err(|err| ModelError::ArtifactIo {
                path: weights_path.display().to_string(),
                reason: err.to_string(),
            })?;
        self.manifest.save(&manifest_path(weights_path))?;

        log::info!("[Classifier] Model saved as {:?}", weights_path);
        Ok(())
    }

    pub fn manifest(&self) -> &ModelManifest {
        &self.manifest
    }

    pub fn labels(&self) -> &LabelMapping {
        &self.manifest.labels
    }

    pub(crate) fn net(&self) -> &EegNet {
        &self.net
    }

    pub(crate) fn var_map(&self) -> &VarMap {
        &self.var_map
    }

    pub(crate) fn device(&self) -> &Device {
        &self.device
    }

    /// Stack already-normalized rows into a `(rows, FEATURE_COUNT)` tensor
    pub(crate) fn input_tensor(&self, rows: &[[f32; FEATURE_COUNT]]) -> Result<Tensor, ModelError> {
        let flat: Vec<f32> = rows.iter().flatten().copied().collect();
        Ok(Tensor::from_vec(flat, (rows.len(), FEATURE_COUNT), &self.device)?)
    }

    /// Classify one window's features
    pub fn predict(&self, features: &FeatureVector) -> Result<Prediction, ModelError> {
        let input = self.manifest.normalizer.transform(features);
        let probabilities = self.probabilities(&[input])?;
        let row = probabilities
            .into_iter()
            .next()
            .ok_or(ModelError::DimensionMismatch {
                expected: 1,
                actual: 0,
            })?;

        if row.len() != self.manifest.labels.len() {
            return Err(ModelError::DimensionMismatch {
                expected: self.manifest.labels.len(),
                actual: row.len(),
            });
        }

        let mut best = 0;
        for (i, &p) in row.iter().enumerate() {
            if p > row[best] {
                best = i;
            }
        }

        let probabilities: Vec<LabelProbability> = self
            .manifest
            .labels
            .labels()
            .iter()
            .zip(&row)
            .map(|(label, &probability)| LabelProbability {
                label: label.clone(),
                probability,
            })
            .collect();

        Ok(Prediction {
            label: probabilities[best].label.clone(),
            confidence: row[best],
            probabilities,
        })
    }

    /// Softmax class probabilities for normalized rows
    pub fn probabilities(
        &self,
        rows: &[[f32; FEATURE_COUNT]],
    ) -> Result<Vec<Vec<f32>>, ModelError> {
        let xs = self.input_tensor(rows)?;
        let logits = self.net.forward(&xs)?;
        let probs = candle_nn::ops::softmax(&logits, D::Minus1)?;
        Ok(probs.to_vec2::<f32>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manifest(labels: &[&str]) -> ModelManifest {
        ModelManifest {
            version: MANIFEST_VERSION,
            labels: LabelMapping::from_labels(labels.iter().copied()),
            normalizer: FeatureNormalizer {
                mean: [50.0, 5.0, 8.0],
                std: [20.0, 2.0, 4.0],
            },
            hidden_layers: [8, 4],
            window_size: 256,
            sample_rate: 128.0,
        }
    }

    fn features(mean: f64) -> FeatureVector {
        FeatureVector {
            mean_amplitude: mean,
            std_amplitude: 3.0,
            dominant_frequency: 6.0,
        }
    }

    #[test]
    fn test_forward_shape() {
        let classifier = EegClassifier::new(manifest(&["Engaged", "Relaxed", "Seizure"])).unwrap();
        let xs = classifier
            .input_tensor(&[[0.0, 0.0, 0.0], [1.0, -1.0, 0.5]])
            .unwrap();
        let logits = classifier.net().forward(&xs).unwrap();
        assert_eq!(logits.dims(), &[2, 3]);
    }

    #[test]
    fn test_prediction_is_a_distribution() {
        let classifier = EegClassifier::new(manifest(&["Relaxed", "Seizure"])).unwrap();
        let prediction = classifier.predict(&features(70.0)).unwrap();

        assert_eq!(prediction.probabilities.len(), 2);
        assert_eq!(prediction.probabilities[0].label, "Relaxed");
        assert_eq!(prediction.probabilities[1].label, "Seizure");

        let total: f32 = prediction.probabilities.iter().map(|p| p.probability).sum();
        assert!((total - 1.0).abs() < 1e-5, "total {}", total);

        let max = prediction
            .probabilities
            .iter()
            .map(|p| p.probability)
            .fold(f32::MIN, f32::max);
        assert_eq!(prediction.confidence, max);
        assert!(prediction
            .probabilities
            .iter()
            .any(|p| p.label == prediction.label));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("eeg_multiclass_model.safetensors");

        let classifier = EegClassifier::new(manifest(&["Engaged", "Relaxed", "Seizure"])).unwrap();
        classifier.save(&path).unwrap();
        assert!(path.exists());
        assert!(manifest_path(&path).exists());

        let restored = EegClassifier::load(&path).unwrap();
        assert_eq!(restored.manifest(), classifier.manifest());

        for mean in [10.0, 45.0, 90.0] {
            let before = classifier.predict(&features(mean)).unwrap();
            let after = restored.predict(&features(mean)).unwrap();
            assert_eq!(before.label, after.label);
            for (a, b) in before.probabilities.iter().zip(&after.probabilities) {
                assert!((a.probability - b.probability).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_save_and_load_with_json_weights_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");

        let classifier = EegClassifier::new(manifest(&["Relaxed", "Seizure"])).unwrap();
        classifier.save(&path).unwrap();
        assert!(path.exists());
        assert!(dir.path().join("model.json.json").exists());

        let restored = EegClassifier::load(&path).unwrap();
        let before = classifier.predict(&features(70.0)).unwrap();
        let after = restored.predict(&features(70.0)).unwrap();
        assert_eq!(before.label, after.label);
        assert!((before.confidence - after.confidence).abs() < 1e-6);
    }

    #[test]
    fn test_load_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let result = EegClassifier::load(dir.path().join("missing.safetensors"));
        assert!(matches!(result, Err(ModelError::ArtifactIo { .. })));
    }

    #[test]
    fn test_load_missing_weights_with_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.safetensors");
        manifest(&["a", "b"]).save(&manifest_path(&path)).unwrap();

        let result = EegClassifier::load(&path);
        assert!(matches!(result, Err(ModelError::ArtifactIo { .. })));
    }

    #[test]
    fn test_new_rejects_empty_labels() {
        assert!(matches!(
            EegClassifier::new(manifest(&[])),
            Err(ModelError::InvalidManifest { .. })
        ));
    }
}
