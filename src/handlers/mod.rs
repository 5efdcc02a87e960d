//! HTTP endpoint handlers for the collector.
//!
//! This module provides handlers for all HTTP endpoints:
//! - `/query`: Runs one collection cycle for the given paths
//! - `/metrics`: Prometheus telemetry of the collector itself
//! - `/health`: Liveness check

pub mod health;
pub mod metrics;
pub mod query;

// Re-export handlers
pub use health::health_handler;
pub use metrics::metrics_handler;
pub use query::query_handler;

use axum::{routing::get, Router};

use crate::state::SharedState;

/// Builds the router with every endpoint attached.
pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/query", get(query_handler))
        .route("/metrics", get(metrics_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}
