//! Health check endpoint handler.

use axum::{extract::State, response::IntoResponse};
use tracing::{debug, instrument};

use crate::state::SharedState;

/// Handler for the /health endpoint.
#[instrument(skip(state))]
pub async fn health_handler(State(state): State<SharedState>) -> impl IntoResponse {
    debug!(
        "Processing /health request, uptime {:.0}s",
        state.start_time.elapsed().as_secs_f64()
    );
    ([("Content-Type", "text/plain; charset=utf-8")], "ok")
}
