use std::sync::{Arc, Mutex};
use std::time::Instant;

use rand::rngs::StdRng;

use crate::analysis::features::FeatureExtractor;
use crate::analysis::WindowAnalysis;
use crate::error::DataError;
use crate::model::EegClassifier;
use crate::recording::{Recording, WindowSampler};

/// Shared application state for HTTP handlers.
///
/// Everything except the sampler is read-only after startup; the sampler's
/// RNG sits behind a mutex held only while drawing an offset.
#[derive(Clone)]
pub struct ServiceState {
    recording: Arc<Recording>,
    extractor: Arc<FeatureExtractor>,
    classifier: Arc<EegClassifier>,
    sampler: Arc<Mutex<WindowSampler<StdRng>>>,
    window_size: usize,
    started: Instant,
}

impl ServiceState {
    pub fn new(
        recording: Recording,
        extractor: FeatureExtractor,
        classifier: EegClassifier,
        sampler: WindowSampler<StdRng>,
    ) -> Self {
        Self {
            window_size: sampler.window_size(),
            recording: Arc::new(recording),
            extractor: Arc::new(extractor),
            classifier: Arc::new(classifier),
            sampler: Arc::new(Mutex::new(sampler)),
            started: Instant::now(),
        }
    }

    pub fn recording(&self) -> &Recording {
        &self.recording
    }

    pub fn classifier(&self) -> &EegClassifier {
        &self.classifier
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    pub fn uptime_ms(&self) -> u64 {
        self.started.elapsed().as_millis() as u64
    }

    /// Draw a random full window and analyze it
    pub fn analyze_random_window(&self) -> Result<WindowAnalysis, DataError> {
        let window = {
            let mut sampler = self
                .sampler
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            sampler.sample(&self.recording)?
        };
        WindowAnalysis::analyze(&self.extractor, &window)
    }
}
