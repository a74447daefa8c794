use std::sync::Arc;

use axum::{
    extract::State,
    response::{IntoResponse, Json},
};

use super::error_response;
use crate::state::AppState;

/// Manual trigger for one scoring pass, using the current configuration
/// snapshot. Same code path as the scheduled loop.
pub async fn api_run_scoring(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = match state.store.load_snapshot().await {
        Ok(config) => config,
        Err(e) => return error_response(e),
    };
    match state.scorer.run_cycle(&config).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn api_run_generation(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = match state.store.load_snapshot().await {
        Ok(config) => config,
        Err(e) => return error_response(e),
    };
    match state.orchestrator.run_cycle(&config).await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn api_send_digest(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.digests.send_pending().await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => error_response(e),
    }
}
