//! Inference HTTP service.
//!
//! Serves random-window feedback from a loaded recording: the fixed
//! threshold table on `/simulate_eeg`, the trained classifier on
//! `/classify_eeg`, and liveness on `/health`. Any origin may call it.

mod routes;
mod state;

pub use routes::{
    build_router, run_http_server, ClassifyResponse, HealthResponse, HttpServerError,
    SimulateResponse,
};
pub use state::ServiceState;

use anyhow::Context;
use std::net::SocketAddr;

/// Block the calling thread serving `state` on a single-threaded runtime.
pub fn serve(state: ServiceState, addr: SocketAddr) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("building tokio runtime for HTTP service")?;

    runtime.block_on(run_http_server(state, addr))
}
