use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use eeg_classifier::analysis::features::{FeatureExtractor, FeatureVector};
use eeg_classifier::config::AppConfig;
use eeg_classifier::http::{self, ServiceState};
use eeg_classifier::model::EegClassifier;
use eeg_classifier::recording::synthetic::{self, SyntheticSpec, DEFAULT_PROFILES};
use eeg_classifier::recording::{Recording, WindowSampler};
use eeg_classifier::training;
use serde::Serialize;

#[derive(Parser, Debug)]
#[command(
    name = "eeg_cli",
    about = "Train and serve the EEG window classifier"
)]
struct Cli {
    /// JSON configuration file (defaults to assets/eeg_config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Log level written to stderr
    #[arg(long, global = true, default_value = "info")]
    log_level: tracing::Level,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fit the classifier on a labeled recording and save it
    Train {
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        model: Option<PathBuf>,
        #[arg(long)]
        epochs: Option<usize>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Serve random-window feedback over HTTP
    Serve {
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        model: Option<PathBuf>,
        #[arg(long)]
        addr: Option<SocketAddr>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Print the features of every full window as JSON lines
    Features {
        #[arg(long)]
        data: Option<PathBuf>,
    },
    /// Write a synthetic labeled recording
    Synth {
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 20)]
        windows_per_label: usize,
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.log_level);

    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::load(),
    };

    match cli.command {
        Commands::Train {
            data,
            model,
            epochs,
            seed,
        } => run_train(config, data, model, epochs, seed),
        Commands::Serve {
            data,
            model,
            addr,
            seed,
        } => run_serve(config, data, model, addr, seed),
        Commands::Features { data } => run_features(config, data),
        Commands::Synth {
            output,
            windows_per_label,
            seed,
        } => run_synth(config, output, windows_per_label, seed),
    }
}

fn init_logging(level: tracing::Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .try_init();
}

fn run_train(
    mut config: AppConfig,
    data: Option<PathBuf>,
    model: Option<PathBuf>,
    epochs: Option<usize>,
    seed: Option<u64>,
) -> Result<ExitCode> {
    let data = data.unwrap_or(config.paths.data);
    let model = model.unwrap_or(config.paths.model);
    if let Some(epochs) = epochs {
        config.training.epochs = epochs;
    }
    if let Some(seed) = seed {
        config.training.seed = seed;
    }

    let report = training::train_from_file(&data, &model, &config.features, &config.training)
        .with_context(|| format!("training on {}", data.display()))?;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::from(0))
}

fn run_serve(
    config: AppConfig,
    data: Option<PathBuf>,
    model: Option<PathBuf>,
    addr: Option<SocketAddr>,
    seed: Option<u64>,
) -> Result<ExitCode> {
    let data = data.unwrap_or(config.paths.data);
    let model = model.unwrap_or(config.paths.model);
    let addr = addr.unwrap_or_else(|| config.server.resolved_addr());
    let seed = seed.or(config.server.seed);

    let recording =
        Recording::load(&data).with_context(|| format!("loading recording {}", data.display()))?;
    let classifier = EegClassifier::load(&model)
        .with_context(|| format!("loading model {}", model.display()))?;

    let manifest = classifier.manifest();
    if manifest.window_size != config.features.window_size {
        log::warn!(
            "Model was trained on {}-sample windows, serving with those instead of {}",
            manifest.window_size,
            config.features.window_size
        );
    }
    if recording.len() < manifest.window_size {
        log::warn!(
            "Recording holds {} samples, fewer than one {}-sample window",
            recording.len(),
            manifest.window_size
        );
    }

    let extractor = FeatureExtractor::new(manifest.sample_rate, manifest.window_size);
    let sampler = WindowSampler::seeded(seed, manifest.window_size);
    let state = ServiceState::new(recording, extractor, classifier, sampler);

    http::serve(state, addr)?;
    Ok(ExitCode::from(0))
}

fn run_features(config: AppConfig, data: Option<PathBuf>) -> Result<ExitCode> {
    let data = data.unwrap_or(config.paths.data);
    let recording =
        Recording::load(&data).with_context(|| format!("loading recording {}", data.display()))?;
    let window_size = config.features.window_size;
    let extractor = FeatureExtractor::new(config.features.sample_rate, window_size);

    for window in recording.windows(window_size) {
        let features = extractor
            .extract(window.amplitudes)
            .with_context(|| format!("extracting window {}", window.index))?;
        let row = WindowFeaturesPayload {
            window: window.index,
            start: window.start,
            features,
            label: window.majority_label(),
        };
        println!("{}", serde_json::to_string(&row)?);
    }
    Ok(ExitCode::from(0))
}

fn run_synth(
    config: AppConfig,
    output: PathBuf,
    windows_per_label: usize,
    seed: Option<u64>,
) -> Result<ExitCode> {
    let defaults = SyntheticSpec::default();
    let spec = SyntheticSpec {
        windows_per_label,
        window_size: config.features.window_size,
        sample_rate: config.features.sample_rate,
        seed: seed.unwrap_or(defaults.seed),
        ..defaults
    };

    let recording = synthetic::generate(&spec, &DEFAULT_PROFILES);
    synthetic::write_csv(&recording, spec.sample_rate, &output)
        .with_context(|| format!("writing {}", output.display()))?;

    log::info!(
        "Wrote {} samples ({} windows) to {}",
        recording.len(),
        recording.window_count(spec.window_size),
        output.display()
    );
    Ok(ExitCode::from(0))
}

#[derive(Serialize)]
struct WindowFeaturesPayload<'a> {
    window: usize,
    start: usize,
    #[serde(flatten)]
    features: FeatureVector,
    #[serde(skip_serializing_if = "Option::is_none")]
    label: Option<&'a str>,
}
