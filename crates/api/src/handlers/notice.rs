//! Handlers for the `/notices` resource.
//!
//! Every handler resolves the caller from the bearer token and delegates to
//! [`NoticeService`](scn_core::service::NoticeService), which performs the
//! capability check, the transition and the save.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use scn_core::notice::{CreateNoticeInput, NoticeEdit};
use scn_core::plan::{ActionPlanInput, EvidenceInput};
use scn_core::ports::NoticeFilter;
use scn_core::types::DbId;
use serde::Deserialize;
use validator::Validate;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Validate)]
pub struct BatchCreateRequest {
    #[validate(length(min = 1, max = 100))]
    pub notices: Vec<CreateNoticeInput>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitPlanRequest {
    pub action_plans: Vec<ActionPlanInput>,
}

#[derive(Debug, Deserialize)]
pub struct SubmitEvidenceRequest {
    pub evidence: Vec<EvidenceInput>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReasonRequest {
    #[validate(length(min = 1, max = 5000))]
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReassignRequest {
    pub supplier_id: DbId,
    #[validate(length(min = 1, max = 5000))]
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct ReviewedRequest {
    pub is_reviewed: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkCloseRequest {
    #[validate(length(min = 1, max = 100))]
    pub ids: Vec<DbId>,
}

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// GET /notices -- filtered by `status`, `category`, `supplier_id`.
pub async fn list_notices(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Query(filter): Query<NoticeFilter>,
) -> AppResult<impl IntoResponse> {
    let notices = state.service.list(&actor, filter).await?;
    Ok(Json(DataResponse { data: notices }))
}

/// GET /notices/{id}
pub async fn get_notice(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let notice = state.service.get(&actor, id).await?;
    Ok(Json(DataResponse { data: notice }))
}

// ---------------------------------------------------------------------------
// Creation, editing, deletion
// ---------------------------------------------------------------------------

/// POST /notices
pub async fn create_notice(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateNoticeInput>,
) -> AppResult<impl IntoResponse> {
    let notice = state.service.create(&actor, input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: notice })))
}

/// POST /notices/batch
pub async fn create_notices_batch(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<BatchCreateRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let notices = state.service.create_batch(&actor, input.notices).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: notices })))
}

/// PATCH /notices/{id}
pub async fn edit_notice(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(edit): Json<NoticeEdit>,
) -> AppResult<impl IntoResponse> {
    let notice = state.service.edit(&actor, id, edit).await?;
    Ok(Json(DataResponse { data: notice }))
}

/// DELETE /notices/{id} -- manager only.
pub async fn delete_notice(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    state.service.delete(&actor, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Action plan
// ---------------------------------------------------------------------------

/// POST /notices/{id}/plan
pub async fn submit_plan(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitPlanRequest>,
) -> AppResult<impl IntoResponse> {
    let notice = state
        .service
        .submit_plan(&actor, id, &input.action_plans)
        .await?;
    Ok(Json(DataResponse { data: notice }))
}

/// POST /notices/{id}/plan/approve
pub async fn approve_plan(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let notice = state.service.approve_plan(&actor, id).await?;
    Ok(Json(DataResponse { data: notice }))
}

/// POST /notices/{id}/plan/reject
pub async fn reject_plan(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReasonRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let notice = state.service.reject_plan(&actor, id, &input.reason).await?;
    Ok(Json(DataResponse { data: notice }))
}

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

/// POST /notices/{id}/evidence
pub async fn submit_evidence(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<SubmitEvidenceRequest>,
) -> AppResult<impl IntoResponse> {
    let notice = state
        .service
        .submit_evidence(&actor, id, &input.evidence)
        .await?;
    Ok(Json(DataResponse { data: notice }))
}

/// POST /notices/{id}/evidence/approve
pub async fn approve_evidence(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let notice = state.service.approve_evidence(&actor, id).await?;
    Ok(Json(DataResponse { data: notice }))
}

/// POST /notices/{id}/evidence/reject
pub async fn reject_evidence(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReasonRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let notice = state
        .service
        .reject_evidence(&actor, id, &input.reason)
        .await?;
    Ok(Json(DataResponse { data: notice }))
}

/// POST /notices/{id}/evidence/{index}/approve
pub async fn approve_evidence_item(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path((id, index)): Path<(DbId, usize)>,
) -> AppResult<impl IntoResponse> {
    let notice = state
        .service
        .approve_evidence_item(&actor, id, index)
        .await?;
    Ok(Json(DataResponse { data: notice }))
}

/// POST /notices/{id}/evidence/{index}/reject
pub async fn reject_evidence_item(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path((id, index)): Path<(DbId, usize)>,
    Json(input): Json<ReasonRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let notice = state
        .service
        .reject_evidence_item(&actor, id, index, &input.reason)
        .await?;
    Ok(Json(DataResponse { data: notice }))
}

/// POST /notices/bulk-close
///
/// Always 200; each entry of `data` reports whether that notice closed.
pub async fn bulk_close(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<BulkCloseRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let outcomes = state.service.bulk_close(&actor, &input.ids).await?;
    Ok(Json(DataResponse { data: outcomes }))
}

// ---------------------------------------------------------------------------
// Corrections and flags
// ---------------------------------------------------------------------------

/// POST /notices/{id}/reassign -- manager only.
pub async fn reassign(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReassignRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let notice = state
        .service
        .reassign(&actor, id, input.supplier_id, &input.reason)
        .await?;
    Ok(Json(DataResponse { data: notice }))
}

/// POST /notices/{id}/void -- manager only.
pub async fn void(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReasonRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let notice = state.service.void(&actor, id, &input.reason).await?;
    Ok(Json(DataResponse { data: notice }))
}

/// PUT /notices/{id}/reviewed
pub async fn mark_reviewed(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(input): Json<ReviewedRequest>,
) -> AppResult<impl IntoResponse> {
    let notice = state
        .service
        .mark_reviewed(&actor, id, input.is_reviewed)
        .await?;
    Ok(Json(DataResponse { data: notice }))
}

/// POST /notices/{id}/like -- toggles.
pub async fn toggle_like(
    AuthUser(actor): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let notice = state.service.toggle_like(&actor, id).await?;
    Ok(Json(DataResponse { data: notice }))
}
