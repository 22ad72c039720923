use std::net::SocketAddr;

use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};

use crate::analysis::round_to;
use crate::error::{log_data_error, log_model_error, DataError, ModelError};
use crate::model::LabelProbability;

use super::state::ServiceState;

/// Body of every failed request; the cause only goes to the log.
const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// HTTP error variants mapped to JSON responses.
#[derive(Debug)]
pub enum HttpServerError {
    Data(DataError),
    Model(ModelError),
}

impl From<DataError> for HttpServerError {
    fn from(err: DataError) -> Self {
        Self::Data(err)
    }
}

impl From<ModelError> for HttpServerError {
    fn from(err: ModelError) -> Self {
        Self::Model(err)
    }
}

impl IntoResponse for HttpServerError {
    fn into_response(self) -> Response {
        match &self {
            Self::Data(err) => log_data_error(err, "inference request"),
            Self::Model(err) => log_model_error(err, "inference request"),
        }

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": INTERNAL_ERROR_MESSAGE })),
        )
            .into_response()
    }
}

/// Threshold feedback response payload.
#[derive(Debug, Serialize)]
pub struct SimulateResponse {
    pub amplitude: f64,
    pub feedback: &'static str,
}

/// Classifier response payload.
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub amplitude: f64,
    pub std_amplitude: f64,
    pub dominant_frequency: f64,
    pub label: String,
    pub confidence: f32,
    pub probabilities: Vec<LabelProbability>,
}

/// Health endpoint response payload.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub samples: usize,
    pub windows: usize,
    pub labels: Vec<String>,
    pub uptime_ms: u64,
}

/// Build the Axum router with all handlers.
pub fn build_router(state: ServiceState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any);

    Router::new()
        .route("/simulate_eeg", get(simulate_eeg))
        .route("/classify_eeg", get(classify_eeg))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// Run the HTTP server loop until Ctrl-C.
pub async fn run_http_server(state: ServiceState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding HTTP listener on {}", addr))?;
    tracing::info!(%addr, "EEG service listening");

    let router = build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP router")?;

    tracing::info!("EEG service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::warn!(%err, "failed to install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}

pub async fn simulate_eeg(
    State(state): State<ServiceState>,
) -> Result<Json<SimulateResponse>, HttpServerError> {
    let analysis = state.analyze_random_window()?;
    tracing::debug!(
        start = analysis.start,
        amplitude = analysis.features.mean_amplitude,
        "simulated window"
    );

    Ok(Json(SimulateResponse {
        amplitude: analysis.rounded_amplitude(),
        feedback: analysis.feedback.message(),
    }))
}

pub async fn classify_eeg(
    State(state): State<ServiceState>,
) -> Result<Json<ClassifyResponse>, HttpServerError> {
    let analysis = state.analyze_random_window()?;
    let prediction = state.classifier().predict(&analysis.features)?;
    tracing::debug!(
        start = analysis.start,
        label = %prediction.label,
        confidence = prediction.confidence,
        "classified window"
    );

    Ok(Json(ClassifyResponse {
        amplitude: analysis.rounded_amplitude(),
        std_amplitude: round_to(analysis.features.std_amplitude, 2),
        dominant_frequency: analysis.features.dominant_frequency,
        label: prediction.label,
        confidence: prediction.confidence,
        probabilities: prediction.probabilities,
    }))
}

pub async fn health(State(state): State<ServiceState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        samples: state.recording().len(),
        windows: state.recording().window_count(state.window_size()),
        labels: state.classifier().labels().labels().to_vec(),
        uptime_ms: state.uptime_ms(),
    })
}
