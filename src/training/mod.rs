// Training module - offline fit of the window classifier
//
// The trainer runs once over a labeled recording:
// 1. Cut disjoint windows, extract features, take each window's majority label
// 2. Map labels to class indices alphabetically
// 3. Z-score the feature columns
// 4. Hold out the trailing fraction of windows for validation
// 5. Fit the dense network with Adam on sparse categorical cross-entropy
// 6. Persist weights and manifest

pub mod dataset;

pub use dataset::Dataset;

use candle_core::{DType, Module, Tensor, D};
use candle_nn::{AdamW, Optimizer, ParamsAdamW};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::path::Path;

use crate::analysis::features::{FeatureExtractor, FEATURE_COUNT};
use crate::config::{FeatureConfig, TrainingConfig};
use crate::error::ModelError;
use crate::model::{
    EegClassifier, FeatureNormalizer, LabelMapping, ModelManifest, MANIFEST_VERSION,
};
use crate::recording::Recording;

/// Loss and accuracy after one epoch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EpochMetrics {
    pub epoch: usize,
    pub loss: f32,
    pub accuracy: f32,
    /// `None` when no windows were held out
    pub val_loss: Option<f32>,
    pub val_accuracy: Option<f32>,
}

/// Summary of one training run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainingReport {
    pub windows: usize,
    pub training_windows: usize,
    pub validation_windows: usize,
    pub labels: Vec<String>,
    pub epochs: Vec<EpochMetrics>,
}

impl TrainingReport {
    pub fn final_epoch(&self) -> Option<&EpochMetrics> {
        self.epochs.last()
    }
}

/// Fits an [`EegClassifier`] on a [`Dataset`]
pub struct Trainer {
    training: TrainingConfig,
    features: FeatureConfig,
}

impl Trainer {
    pub fn new(training: TrainingConfig, features: FeatureConfig) -> Self {
        Self { training, features }
    }

    /// Number of leading windows used for fitting (`floor(n * (1 - split))`)
    pub fn training_split(&self, windows: usize) -> usize {
        let split = self.training.validation_split.clamp(0.0, 1.0);
        (windows as f64 * (1.0 - split)).floor() as usize
    }

    /// Fit a fresh classifier on `dataset`
    pub fn fit(&self, dataset: &Dataset) -> Result<(EegClassifier, TrainingReport), ModelError> {
        let windows = dataset.len();
        let split_at = self.training_split(windows);
        if split_at == 0 {
            return Err(ModelError::InsufficientWindows {
                required: 1,
                available: split_at,
            });
        }

        let mapping = LabelMapping::from_labels(dataset.labels.iter().map(String::as_str));
        log::info!("[Trainer] Label mapping: {}", mapping);

        let mut targets = Vec::with_capacity(windows);
        for label in &dataset.labels {
            let index = mapping
                .index_of(label)
                .ok_or_else(|| ModelError::InvalidManifest {
                    reason: format!("label {} missing from mapping", label),
                })?;
            targets.push(index as u32);
        }

        let rows: Vec<[f64; FEATURE_COUNT]> =
            dataset.features.iter().map(|f| f.to_array()).collect();
        let normalizer = FeatureNormalizer::fit(&rows);
        let inputs: Vec<[f32; FEATURE_COUNT]> =
            rows.iter().map(|row| normalizer.transform_row(row)).collect();

        let manifest = ModelManifest {
            version: MANIFEST_VERSION,
            labels: mapping,
            normalizer,
            hidden_layers: self.training.hidden_layers,
            window_size: self.features.window_size,
            sample_rate: self.features.sample_rate,
        };
        let classifier = EegClassifier::new(manifest)?;

        let params = ParamsAdamW {
            lr: self.training.learning_rate,
            beta1: 0.9,
            beta2: 0.999,
            eps: 1e-7,
            weight_decay: 0.0,
        };
        let mut optimizer = AdamW::new(classifier.var_map().all_vars(), params)?;

        let validation = if split_at < windows {
            Some((
                classifier.input_tensor(&inputs[split_at..])?,
                Tensor::from_slice(&targets[split_at..], windows - split_at, classifier.device())?,
            ))
        } else {
            None
        };

        let mut rng = StdRng::seed_from_u64(self.training.seed);
        let mut order: Vec<usize> = (0..split_at).collect();
        let batch_size = self.training.batch_size.max(1);
        let mut epochs = Vec::with_capacity(self.training.epochs);

        log::info!(
            "[Trainer] Fitting on {} windows, validating on {}",
            split_at,
            windows - split_at
        );

        for epoch in 1..=self.training.epochs {
            order.shuffle(&mut rng);

            let mut loss_sum = 0.0f32;
            let mut correct = 0.0f32;
            for batch in order.chunks(batch_size) {
                let batch_inputs: Vec<[f32; FEATURE_COUNT]> =
                    batch.iter().map(|&i| inputs[i]).collect();
                let batch_targets: Vec<u32> = batch.iter().map(|&i| targets[i]).collect();

                let xs = classifier.input_tensor(&batch_inputs)?;
                let ys = Tensor::from_vec(batch_targets, batch.len(), classifier.device())?;

                let logits = classifier.net().forward(&xs)?;
                let loss = candle_nn::loss::cross_entropy(&logits, &ys)?;
                optimizer.backward_step(&loss)?;

                loss_sum += loss.to_scalar::<f32>()? * batch.len() as f32;
                correct += count_correct(&logits, &ys)?;
            }

            let mut metrics = EpochMetrics {
                epoch,
                loss: loss_sum / split_at as f32,
                accuracy: correct / split_at as f32,
                val_loss: None,
                val_accuracy: None,
            };

            if let Some((val_xs, val_ys)) = &validation {
                let logits = classifier.net().forward(val_xs)?;
                let loss = candle_nn::loss::cross_entropy(&logits, val_ys)?;
                metrics.val_loss = Some(loss.to_scalar::<f32>()?);
                metrics.val_accuracy =
                    Some(count_correct(&logits, val_ys)? / (windows - split_at) as f32);
            }

            log::info!(
                "[Trainer] Epoch {}/{} - loss: {:.4} - accuracy: {:.4}{}",
                epoch,
                self.training.epochs,
                metrics.loss,
                metrics.accuracy,
                match (metrics.val_loss, metrics.val_accuracy) {
                    (Some(l), Some(a)) => format!(" - val_loss: {:.4} - val_accuracy: {:.4}", l, a),
                    _ => String::new(),
                }
            );
            epochs.push(metrics);
        }

        let report = TrainingReport {
            windows,
            training_windows: split_at,
            validation_windows: windows - split_at,
            labels: classifier.labels().labels().to_vec(),
            epochs,
        };
        Ok((classifier, report))
    }
}

/// Number of rows whose argmax matches the target
fn count_correct(logits: &Tensor, targets: &Tensor) -> candle_core::Result<f32> {
    logits
        .argmax(D::Minus1)?
        .eq(targets)?
        .to_dtype(DType::F32)?
        .sum_all()?
        .to_scalar::<f32>()
}

/// Train on the recording at `data_path` and save the model to `model_path`
pub fn train_from_file(
    data_path: &Path,
    model_path: &Path,
    features: &FeatureConfig,
    training: &TrainingConfig,
) -> Result<TrainingReport, ModelError> {
    let recording = Recording::load(data_path)?;
    let extractor = FeatureExtractor::new(features.sample_rate, features.window_size);
    let dataset = Dataset::from_recording(&recording, &extractor, features.window_size)?;

    let trainer = Trainer::new(training.clone(), features.clone());
    let (classifier, report) = trainer.fit(&dataset)?;
    classifier.save(model_path)?;
    Ok(report)
}

#[cfg(test)]
#[path = "trainer_tests.rs"]
mod tests;
