// EEG Classifier Core - window features, offline training and inference service
//
// Recording → disjoint 256-sample windows → (mean, std, dominant frequency)
// → dense classifier trained offline; the HTTP service samples random windows
// and answers with threshold feedback or classifier output.

// Module declarations
pub mod analysis;
pub mod config;
pub mod error;
pub mod http;
pub mod model;
pub mod recording;
pub mod training;

pub use analysis::features::{FeatureExtractor, FeatureVector};
pub use analysis::feedback::Feedback;
pub use config::AppConfig;
pub use model::{EegClassifier, Prediction};
pub use recording::Recording;
