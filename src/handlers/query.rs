//! Query endpoint handler.
//!
//! `GET /query?path=<p1>&path=<p2>` runs one collection cycle and returns the
//! resolved metrics as a JSON array.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use procfs_processes_collector::{parse_patterns, CollectError, QueryError};
use serde::Serialize;
use tracing::{debug, error, instrument, warn};

use crate::state::{spawn_serialized, SharedState};

/// Query string key carrying a metric path; may repeat.
pub const PATH_PARAM: &str = "path";

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Error type for query endpoint failures.
#[derive(Debug)]
pub enum QueryHandlerError {
    Collect(CollectError),
    /// The blocking cycle task panicked or was cancelled.
    Join(String),
}

impl QueryHandlerError {
    fn status(&self) -> StatusCode {
        match self {
            QueryHandlerError::Collect(CollectError::Query(_)) => StatusCode::BAD_REQUEST,
            QueryHandlerError::Collect(CollectError::NotFound(_)) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for QueryHandlerError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let message = match &self {
            QueryHandlerError::Collect(e) => e.to_string(),
            QueryHandlerError::Join(e) => format!("collection task failed: {}", e),
        };
        (status, Json(ErrorBody { error: message })).into_response()
    }
}

impl From<CollectError> for QueryHandlerError {
    fn from(e: CollectError) -> Self {
        QueryHandlerError::Collect(e)
    }
}

/// Handler for the /query endpoint.
#[instrument(skip(state, params))]
pub async fn query_handler(
    State(state): State<SharedState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<impl IntoResponse, QueryHandlerError> {
    let paths: Vec<String> = params
        .into_iter()
        .filter(|(key, _)| key == PATH_PARAM)
        .map(|(_, value)| value)
        .collect();

    if paths.is_empty() {
        warn!("Rejecting /query request without any path parameter");
        return Err(CollectError::Query(QueryError::Empty).into());
    }

    // Malformed paths are rejected before procfs is touched
    let patterns = parse_patterns(&paths).map_err(CollectError::from)?;
    debug!("Processing /query request for {} paths", patterns.len());

    let cycle_state = state.clone();
    let result = spawn_serialized(state.cycle_lock.clone(), move || {
        cycle_state.run_cycle(&patterns)
    })
    .await
    .await
    .map_err(|e| {
        error!("Collection task failed: {}", e);
        QueryHandlerError::Join(e.to_string())
    })?;

    match result {
        Ok(metrics) => Ok(Json(metrics)),
        Err(e) => {
            match &e {
                CollectError::Query(_) | CollectError::NotFound(_) => debug!("Query rejected: {}", e),
                _ => error!("Collection cycle failed: {}", e),
            }
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::state::AppState;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn state_for(root: &std::path::Path) -> SharedState {
        Arc::new(
            AppState::new(Config {
                proc_path: Some(root.to_path_buf()),
                ..Config::default()
            })
            .unwrap(),
        )
    }

    async fn status_of(state: SharedState, params: &[(&str, &str)]) -> StatusCode {
        let params = params
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        query_handler(State(state), Query(params))
            .await
            .into_response()
            .status()
    }

    #[tokio::test]
    async fn test_status_mapping() {
        let dir = tempdir().unwrap();
        let state = state_for(dir.path());

        assert_eq!(
            status_of(state.clone(), &[("path", "state/sleeping")]).await,
            StatusCode::OK
        );
        assert_eq!(
            status_of(state.clone(), &[("path", "process/zombie")]).await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(state.clone(), &[("other", "state/sleeping")]).await,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(state.clone(), &[("path", "process/ghost/7/ps_vm")]).await,
            StatusCode::NOT_FOUND
        );

        let missing = state_for(&dir.path().join("absent"));
        assert_eq!(
            status_of(missing, &[("path", "state/sleeping")]).await,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_malformed_path_does_not_run_a_cycle() {
        let dir = tempdir().unwrap();
        let state = state_for(dir.path());
        status_of(state.clone(), &[("path", "thread/x/ps_count")]).await;
        assert_eq!(state.cycles_total.get(), 0);
    }
}
