use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
};

use super::{error::ApiError, models::HealthResponse, state::AppState};
use crate::aggregator::AggregateResponse;

/// Health check endpoint (GET /)
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

/// Count links on every registered target (GET /v1/links)
///
/// Always answers 200 with one entry per target in id order. Targets that
/// could not be fetched carry an `error` object and a zero count.
///
/// The request's cancellation token is cancelled when this future is dropped
/// (client gone) or when the server shuts down, which stops in-flight fetches.
pub async fn get_links(State(state): State<AppState>) -> Json<AggregateResponse> {
    let cancel = state.shutdown.child_token();
    let _guard = cancel.clone().drop_guard();

    let response = state.aggregator.resolve_all(&cancel).await;
    state.metrics.batch_served(&response);

    Json(response)
}

/// Count links on a single target (GET /v1/link/{id})
///
/// Ids outside `0..N` and non-integer ids are rejected with 400 before any
/// network call is made.
pub async fn get_link(
    State(state): State<AppState>,
    id: Result<Path<i64>, PathRejection>,
) -> Result<Json<AggregateResponse>, ApiError> {
    let Path(id) = id.map_err(|rejection| {
        ApiError::InvalidTarget(format!("invalid target id: {}", rejection.body_text()))
    })?;

    let cancel = state.shutdown.child_token();
    let _guard = cancel.clone().drop_guard();

    let response = state.aggregator.resolve_one(id, &cancel).await?;
    state.metrics.lookup_served(&response);

    Ok(Json(response))
}
