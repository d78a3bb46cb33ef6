use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::Utc;
use roam_admin::{AdminApproval, ApprovalAction, ApprovalStatus};
use roam_core::identity::AdminUser;
use roam_shared::events::ApprovalDecidedEvent;
use serde::Deserialize;
use uuid::Uuid;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/admin/approvals", post(request_approval).get(list_approvals))
        .route("/v1/admin/approvals/{id}", get(get_approval))
        .route("/v1/admin/approvals/{id}/approve", post(approve))
        .route("/v1/admin/approvals/{id}/reject", post(reject))
}

async fn request_approval(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Json(action): Json<ApprovalAction>,
) -> Result<Json<AdminApproval>, AppError> {
    Ok(Json(state.approvals.request_approval(&admin, action).await?))
}

async fn list_approvals(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
) -> Result<Json<Vec<AdminApproval>>, AppError> {
    Ok(Json(state.approvals.list_for(&admin).await?))
}

async fn get_approval(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminApproval>, AppError> {
    Ok(Json(state.approvals.get(&admin, id).await?))
}

async fn publish_decision(state: &AppState, approval: &AdminApproval) {
    let Some(decided_by) = approval.decided_by else {
        return;
    };
    let event = ApprovalDecidedEvent {
        approval_id: approval.id,
        requested_by: approval.requested_by,
        decided_by,
        approved: approval.status == ApprovalStatus::Approved,
        rejection_reason: approval.rejection_reason.clone(),
        timestamp: Utc::now().timestamp(),
    };
    let _ = state
        .kafka
        .publish(&state.topics.approval, &approval.id.to_string(), &event)
        .await;
}

async fn approve(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<AdminApproval>, AppError> {
    let approval = state.approvals.approve(&admin, id).await?;
    publish_decision(&state, &approval).await;
    Ok(Json(approval))
}

#[derive(Debug, Deserialize)]
struct RejectRequest {
    reason: String,
}

async fn reject(
    State(state): State<AppState>,
    Extension(admin): Extension<AdminUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<RejectRequest>,
) -> Result<Json<AdminApproval>, AppError> {
    let approval = state.approvals.reject(&admin, id, req.reason).await?;
    publish_decision(&state, &approval).await;
    Ok(Json(approval))
}
