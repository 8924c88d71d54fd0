//! JSON API over the monitoring core.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse as _, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use hostwatch_common::StateSnapshot;
use serde::Serialize;
use tracing::info;

use crate::app::{AppState, RegistryError, SchedulerState, SweepRequest};

pub(crate) fn routes() -> Router<AppState> {
    Router::new()
        .route("/snapshot", get(get_snapshot))
        .route("/probe/{name}", post(probe_host))
        .route("/sweep", post(request_sweep))
}

#[derive(Serialize)]
struct SnapshotResponse<'a> {
    /// When this response was produced.
    timestamp: DateTime<Utc>,
    scheduler: SchedulerState,
    #[serde(flatten)]
    snapshot: &'a StateSnapshot,
}

#[derive(Serialize)]
struct SweepResponse {
    request: SweepRequest,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Returns the current snapshot of every host.
#[axum::debug_handler]
async fn get_snapshot(State(AppState { monitor, .. }): State<AppState>) -> Response {
    let snapshot = monitor.snapshot();
    Json(SnapshotResponse {
        timestamp: Utc::now(),
        scheduler: monitor.state(),
        snapshot: &snapshot,
    })
    .into_response()
}

/// Probes one host immediately. Neither the stored state nor subscribers see the result.
#[axum::debug_handler]
async fn probe_host(
    State(AppState { monitor, .. }): State<AppState>,
    Path(name): Path<String>,
) -> Response {
    match monitor.probe_host(&name).await {
        Ok(result) => {
            info!(host = %name, online = result.online, "Targeted probe finished");
            Json(result).into_response()
        }
        Err(err @ RegistryError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response(),
        Err(err) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: err.to_string(),
            }),
        )
            .into_response(),
    }
}

/// Requests a full sweep outside the regular schedule.
#[axum::debug_handler]
async fn request_sweep(State(AppState { monitor, .. }): State<AppState>) -> Response {
    let request = monitor.request_sweep();
    let status = match request {
        SweepRequest::Queued | SweepRequest::Coalesced => StatusCode::ACCEPTED,
        SweepRequest::Stopped => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status, Json(SweepResponse { request })).into_response()
}
