//! Configuration management for training and serving
//!
//! This module provides runtime configuration loading from JSON files so the
//! window geometry, training hyper-parameters and service address can be
//! adjusted without recompilation. Missing or invalid files fall back to the
//! defaults below.

use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

/// Environment variable overriding the service bind address
pub const HTTP_ADDR_ENV: &str = "EEG_HTTP_ADDR";

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub paths: PathConfig,
}

/// Window geometry used by feature extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureConfig {
    /// Samples per window
    pub window_size: usize,
    /// Sampling rate of the recording in Hz
    pub sample_rate: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            window_size: 256,
            sample_rate: 128.0,
        }
    }
}

/// Classifier training hyper-parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Passes over the training windows
    pub epochs: usize,
    /// Mini-batch size
    pub batch_size: usize,
    /// Fraction of trailing windows held out for validation
    pub validation_split: f64,
    /// Adam learning rate
    pub learning_rate: f64,
    /// Hidden layer widths, input side first
    pub hidden_layers: [usize; 2],
    /// Seed for the per-epoch shuffle
    pub seed: u64,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            epochs: 10,
            batch_size: 32,
            validation_split: 0.2,
            learning_rate: 0.001,
            hidden_layers: [64, 32],
            seed: 42,
        }
    }
}

/// Inference service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address for the HTTP listener
    pub addr: SocketAddr,
    /// Optional fixed seed for window sampling (entropy when absent)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Bind address with the `EEG_HTTP_ADDR` override applied
    pub fn resolved_addr(&self) -> SocketAddr {
        match std::env::var(HTTP_ADDR_ENV) {
            Ok(raw) => raw.parse().unwrap_or_else(|_| {
                log::warn!(
                    "[Config] Ignoring unparsable {}={}, using {}",
                    HTTP_ADDR_ENV,
                    raw,
                    self.addr
                );
                self.addr
            }),
            Err(_) => self.addr,
        }
    }
}

/// Default locations of the recording and model artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathConfig {
    pub data: PathBuf,
    pub model: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            data: PathBuf::from("EEG.csv"),
            model: PathBuf::from("eeg_multiclass_model.safetensors"),
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// # Arguments
    /// * `path` - Path to JSON config file
    ///
    /// # Returns
    /// The parsed configuration, or the defaults if the file doesn't exist
    /// or its JSON is invalid
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Failed to parse JSON from {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Load configuration from the bundled assets directory
    pub fn load() -> Self {
        Self::load_from_file("assets/eeg_config.json")
    }
}
