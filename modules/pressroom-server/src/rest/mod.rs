pub mod cycles;
pub mod drafts;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Deserialize;
use tracing::{error, warn};
use uuid::Uuid;

use pressroom_common::{
    NewWatchedAccount, PipelineConfig, PressroomError, RawItem, Result, RiskTier, ScoredItem,
};

use crate::state::AppState;

// --- Query structs ---

#[derive(Deserialize)]
pub struct ItemsQuery {
    min_relevance: Option<f64>,
    risk: Option<String>,
    limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct AccountsQuery {
    active: Option<bool>,
}

#[derive(Deserialize)]
pub struct SetConfigRequest {
    value: serde_json::Value,
    description: Option<String>,
    #[serde(default = "default_actor")]
    actor: String,
}

#[derive(Deserialize)]
pub struct DeactivateRequest {
    platform: String,
    handle: String,
}

pub(crate) fn default_actor() -> String {
    "admin".to_string()
}

// --- Helpers ---

/// Maps domain errors onto the status codes the review surface relies on:
/// stale-state actions are 409, malformed payloads 422, misses 404.
pub fn error_response(e: PressroomError) -> Response {
    let status = match &e {
        PressroomError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PressroomError::IneligibleTransition { .. }
        | PressroomError::Conflict(_)
        | PressroomError::DuplicateInput(_) => StatusCode::CONFLICT,
        PressroomError::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %e, "Request failed");
        return (
            status,
            Json(serde_json::json!({"error": "internal error"})),
        )
            .into_response();
    }
    (status, Json(serde_json::json!({"error": e.to_string()}))).into_response()
}

fn not_found(what: &str) -> Response {
    error_response(PressroomError::NotFound(what.to_string()))
}

/// Unknown filter values drop the filter rather than erroring.
fn parse_risk(s: &str) -> Option<RiskTier> {
    match s.to_lowercase().as_str() {
        "safe" => Some(RiskTier::Safe),
        "sensitive" => Some(RiskTier::Sensitive),
        "avoid" => Some(RiskTier::Avoid),
        _ => None,
    }
}

// --- Item handlers ---

pub async fn api_items(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ItemsQuery>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(50).min(200);
    let risk = params.risk.as_deref().and_then(parse_risk);
    match state.store.list_items(params.min_relevance, risk, limit).await {
        Ok(items) => Json(items).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn api_submit_items(
    State(state): State<Arc<AppState>>,
    Json(items): Json<Vec<RawItem>>,
) -> impl IntoResponse {
    let stats = state.gateway.submit_batch(&items).await;
    Json(stats)
}

pub async fn api_item_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    let item = match state.store.item(id).await {
        Ok(Some(item)) => item,
        Ok(None) => return not_found(&format!("item {id}")),
        Err(e) => return error_response(e),
    };
    match state.store.score_for_item(id).await {
        Ok(score) => Json(ScoredItem { item, score }).into_response(),
        Err(e) => error_response(e),
    }
}

// --- Configuration handlers ---

pub async fn api_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let overrides = match state.store.config_entries().await {
        Ok(entries) => entries,
        Err(e) => return error_response(e),
    };
    match state.store.load_snapshot().await {
        Ok(effective) => Json(serde_json::json!({
            "overrides": overrides,
            "effective": effective,
        }))
        .into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn api_set_config(
    State(state): State<Arc<AppState>>,
    Path(key): Path<String>,
    Json(body): Json<SetConfigRequest>,
) -> impl IntoResponse {
    // Probe against the defaults so bad keys and mistyped values bounce
    // before anything is persisted.
    let mut probe = PipelineConfig::default();
    if let Err(e) = probe.apply_override(&key, &body.value) {
        return error_response(PressroomError::Validation(e.to_string()));
    }

    match state
        .store
        .set_config(&key, &body.value, body.description.as_deref(), &body.actor)
        .await
    {
        Ok(entry) => {
            let details = serde_json::json!({ "key": entry.key, "value": entry.value });
            if let Err(e) = state
                .store
                .append_audit("update", "configuration", entry.id, &body.actor, details)
                .await
            {
                warn!(key = %entry.key, error = %e, "Failed to record audit entry");
            }
            Json(entry).into_response()
        }
        Err(e) => error_response(e),
    }
}

// --- Watched account handlers ---

pub async fn api_accounts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AccountsQuery>,
) -> impl IntoResponse {
    match state
        .store
        .watched_accounts(params.active.unwrap_or(true))
        .await
    {
        Ok(accounts) => Json(accounts).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn api_upsert_account(
    State(state): State<Arc<AppState>>,
    Json(new): Json<NewWatchedAccount>,
) -> impl IntoResponse {
    if new.platform.trim().is_empty() || new.handle.trim().is_empty() {
        return error_response(PressroomError::Validation(
            "platform and handle are required".to_string(),
        ));
    }
    match state.store.upsert_account(&new).await {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn api_deactivate_account(
    State(state): State<Arc<AppState>>,
    Json(body): Json<DeactivateRequest>,
) -> impl IntoResponse {
    match state
        .store
        .deactivate_account(&body.platform, &body.handle)
        .await
    {
        Ok(true) => Json(serde_json::json!({"deactivated": true})).into_response(),
        Ok(false) => not_found(&format!("account {}/{}", body.platform, body.handle)),
        Err(e) => error_response(e),
    }
}

// --- Stats ---

pub async fn api_stats(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match stats_payload(&state).await {
        Ok(payload) => Json(payload).into_response(),
        Err(e) => error_response(e),
    }
}

async fn stats_payload(state: &AppState) -> Result<serde_json::Value> {
    let total = state.store.items_total().await?;
    let scored = state.store.items_scored().await?;
    let eligible = state.store.eligible_count().await?;
    let mut drafts = serde_json::Map::new();
    for (status, count) in state.store.draft_status_counts().await? {
        drafts.insert(status, serde_json::json!(count));
    }
    Ok(serde_json::json!({
        "items": {"total": total, "scored": scored},
        "eligible_scores": eligible,
        "drafts": drafts,
    }))
}
