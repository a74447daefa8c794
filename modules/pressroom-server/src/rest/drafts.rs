use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::{IntoResponse, Json},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use pressroom_common::{DraftStatus, Platform};
use pressroom_pipeline::approval::DraftAction;

use super::{default_actor, error_response, not_found};
use crate::state::AppState;

// --- Request structs ---

#[derive(Deserialize)]
pub struct DraftsQuery {
    status: Option<String>,
    platform: Option<String>,
    limit: Option<i64>,
}

#[derive(Deserialize)]
pub struct ApproveRequest {
    #[serde(default)]
    edited_body: Option<String>,
    #[serde(default = "default_actor")]
    actor: String,
}

#[derive(Deserialize)]
pub struct RejectRequest {
    reason: String,
    #[serde(default = "default_actor")]
    actor: String,
}

#[derive(Deserialize)]
pub struct EditRequest {
    body: String,
    #[serde(default = "default_actor")]
    actor: String,
}

#[derive(Deserialize)]
pub struct ScheduleRequest {
    at: DateTime<Utc>,
    #[serde(default = "default_actor")]
    actor: String,
}

#[derive(Deserialize)]
pub struct PublishRequest {
    external_post_id: String,
    #[serde(default = "default_actor")]
    actor: String,
}

fn parse_status(s: &str) -> Option<DraftStatus> {
    match s.to_lowercase().as_str() {
        "pending" => Some(DraftStatus::Pending),
        "approved" => Some(DraftStatus::Approved),
        "rejected" => Some(DraftStatus::Rejected),
        "scheduled" => Some(DraftStatus::Scheduled),
        "published" => Some(DraftStatus::Published),
        _ => None,
    }
}

fn parse_platform(s: &str) -> Option<Platform> {
    match s.to_lowercase().as_str() {
        "twitter" => Some(Platform::Twitter),
        "linkedin" => Some(Platform::Linkedin),
        "instagram" => Some(Platform::Instagram),
        "facebook" => Some(Platform::Facebook),
        _ => None,
    }
}

// --- Handlers ---

pub async fn api_drafts(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DraftsQuery>,
) -> impl IntoResponse {
    let limit = params.limit.unwrap_or(50).min(200);
    let status = params.status.as_deref().and_then(parse_status);
    let platform = params.platform.as_deref().and_then(parse_platform);
    match state.store.list_drafts(status, platform, limit).await {
        Ok(drafts) => Json(drafts).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn api_draft_detail(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.store.draft(id).await {
        Ok(Some(draft)) => Json(draft).into_response(),
        Ok(None) => not_found(&format!("draft {id}")),
        Err(e) => error_response(e),
    }
}

pub async fn api_draft_audit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> impl IntoResponse {
    match state.store.draft(id).await {
        Ok(Some(_)) => {}
        Ok(None) => return not_found(&format!("draft {id}")),
        Err(e) => return error_response(e),
    }
    match state.store.audit_for_entity(id).await {
        Ok(entries) => Json(entries).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn api_approve(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ApproveRequest>,
) -> impl IntoResponse {
    let action = DraftAction::Approve {
        edited_body: body.edited_body,
    };
    match state.approvals.apply(id, action, &body.actor).await {
        Ok(draft) => Json(draft).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn api_reject(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<RejectRequest>,
) -> impl IntoResponse {
    let action = DraftAction::Reject { reason: body.reason };
    match state.approvals.apply(id, action, &body.actor).await {
        Ok(draft) => Json(draft).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn api_edit(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<EditRequest>,
) -> impl IntoResponse {
    let action = DraftAction::Edit { body: body.body };
    match state.approvals.apply(id, action, &body.actor).await {
        Ok(draft) => Json(draft).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn api_schedule(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<ScheduleRequest>,
) -> impl IntoResponse {
    let action = DraftAction::Schedule { at: body.at };
    match state.approvals.apply(id, action, &body.actor).await {
        Ok(draft) => Json(draft).into_response(),
        Err(e) => error_response(e),
    }
}

pub async fn api_publish(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(body): Json<PublishRequest>,
) -> impl IntoResponse {
    let action = DraftAction::MarkPublished {
        external_post_id: body.external_post_id,
    };
    match state.approvals.apply(id, action, &body.actor).await {
        Ok(draft) => Json(draft).into_response(),
        Err(e) => error_response(e),
    }
}
